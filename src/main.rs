//! fleetdrop - upload service for fleet trip files
//!
//! A small HTTP service that pushes user-supplied files to a cloud object
//! store (Google Cloud Storage or Amazon S3). Trip CSVs are validated
//! against the fleet schema before anything leaves the machine, and a
//! destination collision triggers an explicit replace-or-cancel round trip
//! instead of a silent overwrite.

mod config;
mod credentials;
mod errors;
mod metrics;
mod routes;
mod server;
mod session;
mod storage;
mod upload;
mod validate;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::server::Server;
use crate::session::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment and optional config file
    let config = Config::from_env()?;

    // Initialize tracing with JSON output for structured logging;
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Initialize Prometheus metrics
    crate::metrics::init_metrics();

    info!("Starting fleetdrop");
    info!(?config, "Configuration loaded");

    // Session state: storage credentials arrive through the API, so the
    // service boots without any sink installed
    let session = Arc::new(Session::new());

    let server = Server::new(config.clone(), session);

    // Handle graceful shutdown
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal");
    };

    info!("Server starting on {}", config.server.bind_address);
    server.start(shutdown_signal).await?;

    info!("Server shutdown complete");
    Ok(())
}
