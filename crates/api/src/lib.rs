use serde::{Deserialize, Serialize};
use serde_json::Value;
use store::{ItemStore, attr};
use thiserror::Error;
use tracing::{debug, error, info};

/// Body of a get-item request: `{"key": {"id": "..."}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetItemRequest {
    pub key: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetItemResponse {
    pub table: String,
    pub item: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// API Errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),
}

impl ApiError {
    /// Machine-readable code carried in [`ErrorResponse::error`].
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Json(_) => "JSON_ERROR",
            ApiError::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        let error = err.code().to_string();
        let message = match err {
            ApiError::InvalidInput(msg) | ApiError::NotFound(msg) | ApiError::Store(msg) => msg,
            ApiError::Json(err) => err.to_string(),
        };
        ErrorResponse { error, message }
    }
}

/// Look up one item by key in the store's table.
pub async fn get_item(store: &dyn ItemStore, body: &str) -> Result<String, ApiError> {
    let request: GetItemRequest = serde_json::from_str(body)?;
    debug!("Get item request for key: {}", request.key);

    let key = attr::item_from_json(&request.key)
        .map_err(|e| ApiError::InvalidInput(format!("Invalid key: {}", e)))?;
    if key.is_empty() {
        return Err(ApiError::InvalidInput("Key must name at least one attribute".to_string()));
    }

    let item = store.get_item(key).await.map_err(|e| {
        error!("Failed to read item from {}: {}", store.table_name(), e);
        ApiError::Store(e.to_string())
    })?;

    let item = item.ok_or_else(|| {
        ApiError::NotFound(format!("No item in {} for key {}", store.table_name(), request.key))
    })?;

    info!("Found item in {} with {} attributes", store.table_name(), item.len());
    let response = GetItemResponse {
        table: store.table_name().to_string(),
        item: attr::item_to_json(&item),
    };
    Ok(serde_json::to_string(&response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use store::{AttributeValue, Item};

    #[derive(Default)]
    struct MockStore {
        items: Vec<Item>,
        fail: bool,
        requested: Mutex<Vec<Item>>,
    }

    #[async_trait]
    impl ItemStore for MockStore {
        fn table_name(&self) -> &str {
            "mock-items"
        }

        async fn get_item(&self, key: Item) -> anyhow::Result<Option<Item>> {
            self.requested.lock().unwrap().push(key.clone());
            if self.fail {
                return Err(anyhow!("dispatch failure"));
            }
            Ok(self
                .items
                .iter()
                .find(|item| key.iter().all(|(k, v)| item.get(k) == Some(v)))
                .cloned())
        }

        async fn put_item(&self, _item: Item) -> anyhow::Result<()> {
            Ok(())
        }

        async fn delete_item(&self, _key: Item) -> anyhow::Result<Option<Item>> {
            Ok(None)
        }

        async fn query(&self, _expr: &str, _values: Item) -> anyhow::Result<Vec<Item>> {
            Ok(Vec::new())
        }
    }

    fn user(id: &str, name: &str) -> Item {
        HashMap::from([
            ("id".to_string(), AttributeValue::S(id.to_string())),
            ("name".to_string(), AttributeValue::S(name.to_string())),
        ])
    }

    #[tokio::test]
    async fn test_get_item_found() {
        let store = MockStore {
            items: vec![user("1", "ada"), user("2", "grace")],
            ..Default::default()
        };

        let body = get_item(&store, r#"{"key": {"id": "2"}}"#).await.unwrap();
        let response: GetItemResponse = serde_json::from_str(&body).unwrap();

        assert_eq!(response.table, "mock-items");
        assert_eq!(response.item["name"], "grace");
        assert_eq!(store.requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_item_missing() {
        let store = MockStore::default();
        let err = get_item(&store, r#"{"key": {"id": "9"}}"#).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_key_never_reaches_store() {
        let store = MockStore::default();

        let err = get_item(&store, r#"{"key": "id"}"#).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let err = get_item(&store, r#"{"key": {}}"#).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let err = get_item(&store, "not json").await.unwrap_err();
        assert!(matches!(err, ApiError::Json(_)));

        assert!(store.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_store_error() {
        let store = MockStore {
            fail: true,
            ..Default::default()
        };
        let err = get_item(&store, r#"{"key": {"id": "1"}}"#).await.unwrap_err();
        let response: ErrorResponse = err.into();
        assert_eq!(response.error, "STORE_ERROR");
        assert!(response.message.contains("dispatch failure"));
    }
}
