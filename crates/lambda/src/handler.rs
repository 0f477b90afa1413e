use api::{ApiError, ErrorResponse, get_item};
use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use store::ItemStore;
use tracing::{debug, error, info};

/// API Gateway / Function URL response shape
#[derive(Debug, Serialize)]
pub struct OutgoingMessage {
    #[serde(rename = "statusCode")]
    pub status_code: i32,
    pub headers: Value,
    pub body: String,
}

impl OutgoingMessage {
    fn json(status_code: i32, body: String) -> Self {
        Self {
            status_code,
            headers: serde_json::json!({
                "Content-Type": "application/json",
            }),
            body,
        }
    }
}

pub fn status_code(err: &ApiError) -> i32 {
    match err {
        ApiError::InvalidInput(_) | ApiError::Json(_) => 400,
        ApiError::NotFound(_) => 404,
        ApiError::Store(_) => 500,
    }
}

pub async fn function_handler(
    store: &dyn ItemStore,
    event: LambdaEvent<Value>,
) -> Result<OutgoingMessage, Error> {
    // Extract path from the event
    let path = event
        .payload
        .get("rawPath")
        .or_else(|| event.payload.get("path"))
        .and_then(|p| p.as_str())
        .unwrap_or("/");

    // Extract HTTP method if available
    let http_method = event
        .payload
        .get("httpMethod")
        .or_else(|| {
            event
                .payload
                .get("requestContext")
                .and_then(|rc| rc.get("http"))
                .and_then(|http| http.get("method"))
        })
        .and_then(|m| m.as_str())
        .unwrap_or("INVOKE");

    info!(
        "Incoming {} request to {} ({})",
        http_method, path, event.context.request_id
    );

    let body_str = request_body(&event.payload)?;
    debug!("Request body: {}", body_str);

    match get_item(store, &body_str).await {
        Ok(response_body) => {
            info!("Successfully processed {} request", path);
            Ok(OutgoingMessage::json(200, response_body))
        }
        Err(err) => {
            let status_code = status_code(&err);
            let error_response: ErrorResponse = err.into();
            error!(
                "Request to {} failed with {}: {}",
                path, status_code, error_response.message
            );
            Ok(OutgoingMessage::json(
                status_code,
                serde_json::to_string(&error_response)?,
            ))
        }
    }
}

/// HTTP invocations carry the body as a (possibly base64) string; direct
/// invocations are the body.
fn request_body(payload: &Value) -> Result<String, Error> {
    let Some(body) = payload.get("body") else {
        return Ok(serde_json::to_string(payload)?);
    };
    let Some(body_str) = body.as_str() else {
        // Some callers send the body as a JSON object rather than a string
        return Ok(serde_json::to_string(body)?);
    };

    let is_base64 = payload
        .get("isBase64Encoded")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if !is_base64 {
        return Ok(body_str.to_string());
    }

    debug!("Body is base64 encoded");
    use base64::{Engine as _, engine::general_purpose};
    let decoded = general_purpose::STANDARD.decode(body_str).map_err(|e| {
        error!("Failed to decode base64: {}", e);
        Error::from(format!("Failed to decode base64: {}", e))
    })?;
    String::from_utf8(decoded).map_err(|e| {
        error!("Failed to convert to UTF-8: {}", e);
        Error::from(format!("Failed to convert to UTF-8: {}", e))
    })
}
