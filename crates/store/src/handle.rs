use crate::Item;
use crate::config::StoreConfig;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::ReturnValue;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Operations request handlers issue against the item store.
#[async_trait]
pub trait ItemStore: Send + Sync {
    fn table_name(&self) -> &str;

    async fn get_item(&self, key: Item) -> Result<Option<Item>>;

    async fn put_item(&self, item: Item) -> Result<()>;

    /// Returns the item as it was before deletion, if there was one.
    async fn delete_item(&self, key: Item) -> Result<Option<Item>>;

    /// Runs a key-condition query and collects every page.
    async fn query(
        &self,
        key_condition_expression: &str,
        expression_attribute_values: Item,
    ) -> Result<Vec<Item>>;
}

/// Shared DynamoDB client bound to one table.
///
/// Clones share the underlying client; nothing on the handle is mutable.
#[derive(Clone, Debug)]
pub struct StoreHandle {
    client: Arc<Client>,
    table_name: String,
}

impl StoreHandle {
    /// Build a new client from `config` and the ambient AWS configuration.
    ///
    /// No request is sent here: the SDK resolves credentials and opens
    /// connections on first use, so configuration problems such as a missing
    /// region surface on the first operation.
    pub async fn provision(config: &StoreConfig) -> Self {
        let start = Instant::now();
        info!("Initializing DynamoDB client for table: {}", config.table_name);

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint_url) = &config.endpoint_url {
            debug!("Using DynamoDB endpoint override: {}", endpoint_url);
            loader = loader.endpoint_url(endpoint_url);
        }
        if let Some(profile_name) = &config.profile_name {
            loader = loader.profile_name(profile_name);
        }
        if let Some(max_attempts) = config.max_attempts {
            loader = loader.retry_config(RetryConfig::standard().with_max_attempts(max_attempts));
        }
        if let Some((access_key_id, secret_access_key)) = &config.static_credentials {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "store-static",
            ));
        }

        let sdk_config = loader.load().await;
        match sdk_config.region() {
            Some(region) => debug!("DynamoDB region resolved to {}", region),
            None => warn!(
                "No AWS region resolved; DynamoDB requests will fail until one is configured"
            ),
        }

        let handle = Self::from_client(Client::new(&sdk_config), config.table_name.clone());
        info!(
            "DynamoDB client ready for table {} in {}ms",
            handle.table_name,
            start.elapsed().as_millis()
        );
        handle
    }

    /// Wrap a client that was configured elsewhere.
    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client: Arc::new(client),
            table_name: table_name.into(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// True when both handles share one client instance.
    pub fn same_client(&self, other: &StoreHandle) -> bool {
        Arc::ptr_eq(&self.client, &other.client)
    }
}

#[async_trait]
impl ItemStore for StoreHandle {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn get_item(&self, key: Item) -> Result<Option<Item>> {
        debug!("Calling DynamoDB get_item on table: {}", self.table_name);
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| anyhow!("DynamoDB get_item failed: {}", DisplayErrorContext(&e)))?;
        Ok(result.item)
    }

    async fn put_item(&self, item: Item) -> Result<()> {
        debug!("Calling DynamoDB put_item on table: {}", self.table_name);
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| anyhow!("DynamoDB put_item failed: {}", DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn delete_item(&self, key: Item) -> Result<Option<Item>> {
        debug!("Calling DynamoDB delete_item on table: {}", self.table_name);
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| anyhow!("DynamoDB delete_item failed: {}", DisplayErrorContext(&e)))?;
        Ok(result.attributes)
    }

    async fn query(
        &self,
        key_condition_expression: &str,
        expression_attribute_values: Item,
    ) -> Result<Vec<Item>> {
        // DynamoDB rejects an empty value map
        let values: Option<HashMap<_, _>> =
            Some(expression_attribute_values).filter(|v| !v.is_empty());

        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;
        let mut pages = 0usize;
        loop {
            let page = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression(key_condition_expression)
                .set_expression_attribute_values(values.clone())
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| anyhow!("DynamoDB query failed: {}", DisplayErrorContext(&e)))?;
            pages += 1;

            items.extend(page.items.unwrap_or_default());
            match page.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!(
            "Query on {} returned {} items in {} pages",
            self.table_name,
            items.len(),
            pages
        );
        Ok(items)
    }
}
