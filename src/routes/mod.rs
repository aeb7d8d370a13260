//! HTTP routes for the upload API
//!
//! - POST /session/credentials - load a GCS key or S3 access-key pair
//! - POST /uploads/csv - validated trip-file upload
//! - POST /uploads/file - unchecked any-file upload
//! - POST /uploads/:id/confirmation - resolve a replace-or-cancel question
//! - GET /healthz, /ready, /metrics - probes and metrics

mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::session::Session;

pub use handlers::{ConfirmChoice, ConfirmRequest, OutcomeResponse};

/// Create the upload API router
pub fn create_router(session: Arc<Session>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/metrics", get(handlers::metrics))
        .route("/session/credentials", post(handlers::load_credentials))
        .route("/uploads/csv", post(handlers::upload_csv))
        .route("/uploads/file", post(handlers::upload_file))
        .route("/uploads/:id/confirmation", post(handlers::confirm_upload))
        .with_state(session)
}
