//! Process entrypoint: load configuration, wire the backends, clients, and
//! metrics together, and serve the web surface.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use stager::backend::{identity_sanitizer, BackendConfig, BackendRegistry};
use stager::client::{HttpPlatformClient, HttpSchedulerClient};
use stager::config::StagerConfig;
use stager::logging::init_logging;
use stager::metrics::{StagingMetrics, SystemClock};
use stager::web::routes::app;
use stager::web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = StagerConfig::load()?;
    let client_timeout = Duration::from_millis(config.client_timeout_ms);

    let backends = Arc::new(BackendRegistry::new(BackendConfig {
        lifecycles: config.lifecycles.clone(),
        file_server_url: config.file_server_url.clone(),
        completion_callback_url: config.staging_completion_callback_url.clone(),
        default_staging_timeout_secs: config.default_staging_timeout_secs,
        min_memory_mb: config.min_memory_mb,
        min_disk_mb: config.min_disk_mb,
        min_file_descriptors: config.min_file_descriptors,
        sanitizer: identity_sanitizer(),
    }));

    let scheduler = Arc::new(HttpSchedulerClient::new(&config.scheduler_url, client_timeout)?);
    let platform = Arc::new(HttpPlatformClient::new(
        &config.platform_callback_url,
        config
            .platform_username
            .clone()
            .zip(config.platform_password.clone()),
        client_timeout,
    )?);

    let state = AppState::new(
        backends,
        scheduler,
        platform,
        Arc::new(StagingMetrics::new()),
        Arc::new(SystemClock),
    );

    let listener = tokio::net::TcpListener::bind(&config.listen_address).await?;
    info!(address = %config.listen_address, "stager listening");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
