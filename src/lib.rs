pub mod api;
pub mod charts;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod report;
pub mod stats;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::ServerError;
use crate::config::{ConfigError, StatsConfig};
use crate::core_state::{CoreError, CoreState};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Run the service until Ctrl-C, then stop the server and close the database.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = StatsConfig::from_env()?;
    tracing::info!(
        db = %config.db_path.display(),
        output = %config.output_dir.display(),
        bind = %config.bind_addr,
        "Configuration loaded"
    );

    let core = Arc::new(CoreState::from_config(&config)?);
    let mut server =
        api::start_stats_api_server(Arc::clone(&core), config.bind_addr, &config.cors_origins)
            .await?;

    shutdown_signal().await;

    server.shutdown();
    server.stopped().await;
    core.shutdown();
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C, serving until killed: {e}");
        std::future::pending::<()>().await;
    }
}
