//! HTTP server implementation
//!
//! Sets up the Axum HTTP server with:
//! - Upload API routes
//! - Middleware (tracing, timeout, CORS, upload size limit)
//! - Graceful shutdown
//! - Health/readiness probes

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::routes;
use crate::session::Session;

/// HTTP server for the upload API
pub struct Server {
    config: Config,
    session: Arc<Session>,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config, session: Arc<Session>) -> Self {
        Self { config, session }
    }

    /// Build the Axum router with all middleware
    fn build_router(&self) -> Router {
        routes::create_router(self.session.clone()).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(std::time::Duration::from_secs(
                    self.config.server.timeout_secs,
                )))
                // The form lives in a browser, not behind this service
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(self.config.server.max_upload_size))
                .into_inner(),
        )
    }

    /// Start the server and run until shutdown signal
    pub async fn start<F>(&self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.build_router();

        let listener = tokio::net::TcpListener::bind(self.config.server.bind_address).await?;
        info!(address = %self.config.server.bind_address, "Server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
