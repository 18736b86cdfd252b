//! Event ingestion handler.
//!
//! Decodes the form-urlencoded callback body, runs the validation
//! pipeline, and maps its outcome to the response contract. Bodies that
//! carry no fields are rejected with 400 before the pipeline runs;
//! everything the pipeline rejects beyond a signature failure is absorbed
//! to 200 after being reported to the exception sink, so the provider
//! does not retry events that cannot succeed.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use iotgate_core::{GateError, InboundEvent, PipelineOutcome};
use tracing::{info, instrument, warn};

use crate::{pipeline, server::AppState};

/// Ingests one provider callback.
#[instrument(name = "ingest_event", skip(state, body), fields(content_length = body.len()))]
pub async fn ingest_event(State(state): State<AppState>, body: Bytes) -> Response {
    let event: InboundEvent = match serde_urlencoded::from_bytes(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "request body is not valid form data");
            return StatusCode::BAD_REQUEST.into_response();
        },
    };

    let outcome = pipeline::process_event(
        state.config.shared_secret.as_deref(),
        state.collaborators.as_ref(),
        event,
    )
    .await;

    match outcome {
        PipelineOutcome::Forwarded(event) => {
            info!(device = %event.device, event_id = %event.event_id, "event forwarded");
            StatusCode::OK
        },
        PipelineOutcome::Denied { device } => {
            warn!(%device, "access denied, unauthorized device");
            StatusCode::OK
        },
        PipelineOutcome::Rejected(GateError::EmptyBody) => {
            warn!("empty request body");
            StatusCode::BAD_REQUEST
        },
        PipelineOutcome::Rejected(error) => {
            state.collaborators.report_exception(&error);
            StatusCode::from_u16(error.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        },
    }
    .into_response()
}
