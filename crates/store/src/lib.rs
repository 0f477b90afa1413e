use std::collections::HashMap;

// Module declarations
pub mod attr;
pub mod config;
pub mod global;
pub mod handle;

// Re-export commonly used types
pub use aws_sdk_dynamodb::types::AttributeValue;
pub use config::StoreConfig;
pub use handle::{ItemStore, StoreHandle};

/// A DynamoDB item (or key): attribute name to value.
pub type Item = HashMap<String, AttributeValue>;
