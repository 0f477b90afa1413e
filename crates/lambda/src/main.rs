use lambda::handler::function_handler;
use lambda::logging::init_logging;
use lambda_runtime::{Error, run, service_fn};
use store::{StoreConfig, StoreHandle};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging().map_err(|e| {
        eprintln!("{}", e);
        Error::from(e.to_string())
    })?;

    let config = StoreConfig::from_env().map_err(|e| {
        error!("Invalid store configuration: {}", e);
        Error::from(format!("Invalid store configuration: {}", e))
    })?;

    // Built once here and handed to every invocation
    let store = StoreHandle::provision(&config).await;
    let store = &store;
    info!("Serving requests against table {}", config.table_name);

    run(service_fn(move |event| async move {
        function_handler(store, event).await
    }))
    .await
}
