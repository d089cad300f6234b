use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pichealth_api::api::{start_server, ApiContext};
use pichealth_api::config::{self, AppConfig};
use pichealth_api::model::GatewayClient;
use pichealth_api::storage::{HttpObjectStore, RestLogStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PICHEALTH_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env();
    let addr: SocketAddr = config.bind_addr.parse()?;

    let ocr_model = Arc::new(GatewayClient::new(
        &config.model_gateway_url,
        &config.model_gateway_key,
        &config.ocr_model,
    ));
    let advice_model = Arc::new(GatewayClient::new(
        &config.model_gateway_url,
        &config.model_gateway_key,
        &config.advice_model,
    ));
    let objects = Arc::new(HttpObjectStore::new(
        &config.storage_endpoint,
        &config.storage_token,
        &config.storage_bucket,
    ));
    let logs = Arc::new(RestLogStore::new(&config.logstore_url, &config.logstore_key));

    let ctx = ApiContext::new(config, ocr_model, advice_model, objects, logs);

    let mut server = start_server(ctx, addr).await?;
    tracing::info!(addr = %server.addr, "ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.shutdown();

    Ok(())
}
