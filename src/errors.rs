//! Error types for fleetdrop
//!
//! Four user-visible kinds, all terminal and none retried: credential
//! problems, validation rejections, existence-probe failures, and transfer
//! failures. Each maps to a distinct JSON error body and status code; the
//! session survives every one of them and accepts a fresh attempt.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use uuid::Uuid;

use crate::credentials::CredentialError;
use crate::upload::FailReason;
use crate::validate::ValidationError;

/// Main error type for upload operations
#[derive(Debug, Error)]
pub enum FleetdropError {
    /// Credential material could not be loaded
    #[error("credentials failed to load: {0}")]
    Credential(#[from] CredentialError),

    /// The candidate file failed trip-schema validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An upload was attempted before any credentials were loaded
    #[error("credentials not loaded")]
    CredentialsNotLoaded,

    /// The decision flow ended in failure (probe or transfer)
    #[error("upload failed: {0}")]
    Upload(FailReason),

    /// No pending upload matches the confirmation id
    #[error("no pending upload with id {0}")]
    UnknownPending(Uuid),

    /// The request itself was unusable (bad multipart, missing fields)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl FleetdropError {
    fn status(&self) -> StatusCode {
        match self {
            FleetdropError::Credential(_) => StatusCode::BAD_REQUEST,
            FleetdropError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            FleetdropError::CredentialsNotLoaded => StatusCode::PRECONDITION_FAILED,
            FleetdropError::Upload(_) => StatusCode::BAD_GATEWAY,
            FleetdropError::UnknownPending(_) => StatusCode::NOT_FOUND,
            FleetdropError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            FleetdropError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            FleetdropError::Credential(_) => "credential_error",
            FleetdropError::Validation(_) => "validation_error",
            FleetdropError::CredentialsNotLoaded => "credentials_not_loaded",
            FleetdropError::Upload(_) => "upload_failed",
            FleetdropError::UnknownPending(_) => "unknown_pending_upload",
            FleetdropError::InvalidRequest(_) => "invalid_request",
            FleetdropError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for FleetdropError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for handler code
pub type Result<T> = std::result::Result<T, FleetdropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_user_facing_categories() {
        assert_eq!(
            FleetdropError::CredentialsNotLoaded.to_string(),
            "credentials not loaded"
        );
        assert_eq!(
            FleetdropError::Validation(ValidationError::InvalidExtension).to_string(),
            "invalid extension"
        );
        let err = FleetdropError::Credential(CredentialError::EmptyBucket);
        assert_eq!(
            err.to_string(),
            "credentials failed to load: bucket name must not be empty"
        );
        let err = FleetdropError::Upload(FailReason::Transfer("timed out".to_string()));
        assert_eq!(err.to_string(), "upload failed: transfer failed: timed out");
    }

    #[test]
    fn statuses_distinguish_the_kinds() {
        assert_eq!(
            FleetdropError::Validation(ValidationError::TooFewRows(3)).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            FleetdropError::CredentialsNotLoaded.status(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            FleetdropError::Upload(FailReason::ExistenceCheck("x".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
