//! Process-wide store handle for code that cannot take one as a parameter.
//!
//! Prefer passing the [`StoreHandle`] built in `main`; this slot exists for
//! callers with no path to it.

use crate::config::StoreConfig;
use crate::handle::{ItemStore, StoreHandle};
use anyhow::{Result, anyhow};
use std::sync::OnceLock;
use tracing::{debug, info};

static STORE_HANDLE: OnceLock<StoreHandle> = OnceLock::new();

/// Provision and publish the handle on first call; later calls return the published one.
pub async fn init(config: &StoreConfig) -> StoreHandle {
    if let Some(handle) = STORE_HANDLE.get() {
        debug!("Reusing existing DynamoDB client from previous invocation");
        return handle.clone();
    }

    info!("Initializing process-wide DynamoDB client");
    let handle = StoreHandle::provision(config).await;

    // Another task may have published while we were provisioning
    match STORE_HANDLE.set(handle.clone()) {
        Ok(()) => {
            info!("DynamoDB client initialized and cached");
            handle
        }
        Err(_) => {
            debug!("Another task initialized the DynamoDB client, using that");
            STORE_HANDLE.get().cloned().unwrap_or(handle)
        }
    }
}

/// Publish a handle built elsewhere. Fails if one is already published.
pub fn install(handle: StoreHandle) -> Result<StoreHandle> {
    STORE_HANDLE
        .set(handle.clone())
        .map_err(|_| anyhow!("Store handle already initialized"))?;
    info!("DynamoDB client installed for table {}", handle.table_name());
    Ok(handle)
}

pub fn get() -> Option<StoreHandle> {
    STORE_HANDLE.get().cloned()
}

pub fn require() -> Result<StoreHandle> {
    get().ok_or_else(|| anyhow!("Store handle not initialized"))
}
