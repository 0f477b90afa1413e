//! Conversion between JSON documents and DynamoDB items.

use crate::Item;
use anyhow::{Result, anyhow};
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use base64::{Engine as _, engine::general_purpose};
use serde_json::{Map, Number, Value};

/// Convert a JSON object into an item. Anything other than an object is rejected.
pub fn item_from_json(value: &Value) -> Result<Item> {
    let object = value
        .as_object()
        .ok_or_else(|| anyhow!("Expected a JSON object, got {}", kind(value)))?;
    Ok(object
        .iter()
        .map(|(name, v)| (name.clone(), attribute_from_json(v)))
        .collect())
}

pub fn attribute_from_json(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(attribute_from_json).collect()),
        Value::Object(object) => AttributeValue::M(
            object
                .iter()
                .map(|(name, v)| (name.clone(), attribute_from_json(v)))
                .collect(),
        ),
    }
}

pub fn item_to_json(item: &Item) -> Value {
    let object: Map<String, Value> = item
        .iter()
        .map(|(name, v)| (name.clone(), attribute_to_json(v)))
        .collect();
    Value::Object(object)
}

pub fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::B(blob) => Value::String(encode_blob(blob)),
        AttributeValue::L(values) => Value::Array(values.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => item_to_json(map),
        AttributeValue::Ss(values) | AttributeValue::Ns(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Bs(blobs) => {
            Value::Array(blobs.iter().map(|b| Value::String(encode_blob(b))).collect())
        }
        // Variants added by newer service models
        _ => Value::Null,
    }
}

/// DynamoDB numbers are strings on the wire with 38 digits of precision.
/// Emit a JSON number only when the conversion is exact; otherwise keep the digits as a string.
fn number_to_json(n: &str) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(u) = n.parse::<u64>() {
        return Value::Number(u.into());
    }
    n.parse::<f64>()
        .ok()
        .filter(|f| f.to_string() == n)
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(n.to_string()))
}

fn encode_blob(blob: &Blob) -> String {
    general_purpose::STANDARD.encode(blob.as_ref())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
