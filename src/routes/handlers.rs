//! Request handlers for the upload API
//!
//! Handlers stay thin: they translate HTTP into state-machine inputs and
//! machine outcomes back into JSON. All decision logic lives in the
//! validate and upload modules.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::credentials::CredentialRequest;
use crate::errors::{FleetdropError, Result};
use crate::metrics::{UPLOADS_TOTAL, VALIDATION_FAILURES};
use crate::session::Session;
use crate::storage;
use crate::upload::{Confirmation, FailReason, State as FlowState, UploadCandidate, UploadFlow};
use crate::validate::validate_csv;

/// JSON body for every successful (or suspended) operation
#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    pub outcome: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<Uuid>,
}

/// The user's answer to a replace-or-cancel question
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub choice: ConfirmChoice,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmChoice {
    Replace,
    Cancel,
}

impl From<ConfirmChoice> for Confirmation {
    fn from(choice: ConfirmChoice) -> Self {
        match choice {
            ConfirmChoice::Replace => Confirmation::Replace,
            ConfirmChoice::Cancel => Confirmation::Cancel,
        }
    }
}

/// Health check endpoint
#[instrument]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe endpoint; reports whether credentials are loaded
#[instrument(skip(session))]
pub async fn ready(State(session): State<Arc<Session>>) -> impl IntoResponse {
    if session.sink().await.is_some() {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::OK, "Ready (no credentials loaded)")
    }
}

/// Prometheus metrics endpoint
#[instrument]
pub async fn metrics() -> impl IntoResponse {
    use crate::metrics::REGISTRY;
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Load credentials - POST /session/credentials
///
/// The body is parsed here rather than through the Json extractor so every
/// malformed document funnels into the credential error category.
#[instrument(skip(session, body))]
pub async fn load_credentials(
    State(session): State<Arc<Session>>,
    body: Bytes,
) -> Result<Json<OutcomeResponse>> {
    let request = CredentialRequest::from_slice(&body)?;
    let backend = request.backend();
    let sink = storage::create_sink(request)?;
    info!(backend, bucket = %sink.bucket(), "credentials loaded");
    session.install_sink(sink).await;

    Ok(Json(OutcomeResponse {
        outcome: "credentials_loaded",
        message: "credentials loaded".to_string(),
        upload_id: None,
    }))
}

/// Validated trip-file upload - POST /uploads/csv
#[instrument(skip(session, multipart))]
pub async fn upload_csv(
    State(session): State<Arc<Session>>,
    multipart: Multipart,
) -> Result<Response> {
    let candidate = intake(multipart).await?;
    if let Err(e) = validate_csv(&candidate.name, &candidate.content) {
        VALIDATION_FAILURES.with_label_values(&[e.kind()]).inc();
        UPLOADS_TOTAL.with_label_values(&["csv", "rejected"]).inc();
        warn!(file = %candidate.name, error = %e, "validation rejected upload");
        return Err(e.into());
    }
    run_upload(&session, candidate, "csv").await
}

/// Unchecked any-file upload - POST /uploads/file
#[instrument(skip(session, multipart))]
pub async fn upload_file(
    State(session): State<Arc<Session>>,
    multipart: Multipart,
) -> Result<Response> {
    let candidate = intake(multipart).await?;
    run_upload(&session, candidate, "file").await
}

/// Resolve a pending collision - POST /uploads/:id/confirmation
#[instrument(skip(session, request))]
pub async fn confirm_upload(
    State(session): State<Arc<Session>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Response> {
    let (mut flow, mode) = session
        .take_pending(id)
        .await
        .ok_or(FleetdropError::UnknownPending(id))?;
    let sink = session.sink().await;
    let state = flow.confirm(request.choice.into(), sink.as_deref()).await.clone();
    settle(&session, flow, state, mode).await
}

/// Pull the single `file` field out of a multipart body
async fn intake(mut multipart: Multipart) -> Result<UploadCandidate> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FleetdropError::InvalidRequest(format!("unreadable multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                FleetdropError::InvalidRequest("`file` field carries no filename".to_string())
            })?;
        let declared_media_type = field.content_type().map(str::to_string).unwrap_or_else(|| {
            mime_guess::from_path(&name).first_or_octet_stream().to_string()
        });
        let content = field.bytes().await.map_err(|e| {
            FleetdropError::InvalidRequest(format!("failed reading `file` field: {e}"))
        })?;
        return Ok(UploadCandidate {
            name,
            declared_media_type,
            content,
        });
    }
    Err(FleetdropError::InvalidRequest("missing `file` field".to_string()))
}

async fn run_upload(
    session: &Session,
    candidate: UploadCandidate,
    mode: &'static str,
) -> Result<Response> {
    let sink = session.sink().await;
    let bucket = sink
        .as_ref()
        .map(|s| s.bucket().to_string())
        .unwrap_or_default();
    info!(
        mode,
        file = %candidate.name,
        size = candidate.content.len(),
        media_type = %candidate.declared_media_type,
        "upload requested"
    );
    let mut flow = UploadFlow::new(candidate, &bucket);
    let state = flow.start(sink.as_deref()).await.clone();
    settle(session, flow, state, mode).await
}

/// Translate a settled flow into the response the user sees
async fn settle(
    session: &Session,
    flow: UploadFlow,
    state: FlowState,
    mode: &'static str,
) -> Result<Response> {
    match state {
        FlowState::Uploaded => {
            UPLOADS_TOTAL.with_label_values(&[mode, "uploaded"]).inc();
            info!(mode, key = %flow.destination().object_key, "upload succeeded");
            Ok(outcome(StatusCode::OK, "uploaded", "upload succeeded", None))
        }
        FlowState::Canceled => {
            UPLOADS_TOTAL.with_label_values(&[mode, "canceled"]).inc();
            info!(mode, key = %flow.destination().object_key, "upload canceled");
            Ok(outcome(StatusCode::OK, "canceled", "upload canceled", None))
        }
        FlowState::AwaitingConfirmation => {
            let key = flow.destination().object_key.clone();
            let id = session.park(flow, mode).await;
            UPLOADS_TOTAL
                .with_label_values(&[mode, "pending_confirmation"])
                .inc();
            info!(mode, key = %key, upload_id = %id, "destination exists, awaiting confirmation");
            Ok(outcome(
                StatusCode::CONFLICT,
                "confirmation_required",
                "file already exists — replace or cancel",
                Some(id),
            ))
        }
        FlowState::Failed(FailReason::CredentialsNotLoaded) => {
            UPLOADS_TOTAL.with_label_values(&[mode, "failed"]).inc();
            Err(FleetdropError::CredentialsNotLoaded)
        }
        FlowState::Failed(reason) => {
            UPLOADS_TOTAL.with_label_values(&[mode, "failed"]).inc();
            warn!(mode, %reason, "upload failed");
            Err(FleetdropError::Upload(reason))
        }
        // Idle/Checking/DirectWrite never escape the flow driver
        other => Err(FleetdropError::Internal(format!(
            "flow settled in unexpected state {other:?}"
        ))),
    }
}

fn outcome(
    status: StatusCode,
    outcome: &'static str,
    message: &str,
    upload_id: Option<Uuid>,
) -> Response {
    (
        status,
        Json(OutcomeResponse {
            outcome,
            message: message.to_string(),
            upload_id,
        }),
    )
        .into_response()
}
