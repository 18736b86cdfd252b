//! Request validation and normalization pipeline.
//!
//! One instance runs per inbound request, sequencing the checks strictly
//! in order and short-circuiting on the first failure:
//!
//! ```text
//! Received -> SignatureChecked -> Decoded -> AuthorizationChecked
//!                                               |-> Forwarded
//!                                               `-> Denied
//! ```
//!
//! XML decoding is synchronous; the registry lookup and the forward/log
//! calls are the only await points. The authorization gate is never
//! reached unless the signature passed (or the gateway runs in its
//! explicit unauthenticated mode) and the payload decoded. A normalized
//! event is forwarded at most once per request and only when the device
//! is authorized; forward and log both complete before the outcome is
//! returned, so the HTTP response is written only after delivery.

use iotgate_core::{
    decode_event_xml, Collaborators, GateError, InboundEvent, LogEntry, PipelineOutcome,
};
use serde_json::Value;
use tracing::debug;

use crate::crypto;

/// Element of the decoded payload that carries the device identifier.
const DEVICE_FIELD: &str = "iccid";

/// Runs one inbound event through the full pipeline.
///
/// `shared_secret` is `None` only in explicit unauthenticated mode, in
/// which case signature verification is skipped and the event is treated
/// as valid.
pub async fn process_event(
    shared_secret: Option<&str>,
    collaborators: &dyn Collaborators,
    event: InboundEvent,
) -> PipelineOutcome {
    if event.is_empty() {
        return PipelineOutcome::Rejected(GateError::EmptyBody);
    }

    if let Some(secret) = shared_secret {
        let check = crypto::verify_signature(secret, &event.timestamp, &event.signature);
        if !check.is_valid {
            return PipelineOutcome::Rejected(GateError::InvalidSignature);
        }
        debug!("event signature verified");
    } else {
        debug!("unauthenticated mode, signature check skipped");
    }

    let data = match decode_event_xml(&event.data) {
        Ok(data) => data,
        Err(err) => return PipelineOutcome::Rejected(err),
    };

    let device = extract_device(&data);
    let normalized = event.normalize(device, data);
    debug!(device = %normalized.device, "event payload decoded");

    match collaborators.lookup_device(&normalized.device).await {
        Ok(Some(_record)) => {
            if let Err(err) = collaborators.forward(&normalized).await {
                return PipelineOutcome::Rejected(err);
            }
            if let Err(err) = collaborators.log(&LogEntry::data_received(&normalized)).await {
                return PipelineOutcome::Rejected(err);
            }
            PipelineOutcome::Forwarded(normalized)
        },
        Ok(None) => {
            if let Err(err) = collaborators.log(&LogEntry::access_denied(&normalized.device)).await
            {
                return PipelineOutcome::Rejected(err);
            }
            PipelineOutcome::Denied { device: normalized.device }
        },
        Err(err) => PipelineOutcome::Rejected(err),
    }
}

/// Pulls the device identifier out of the decoded payload. A payload
/// without one yields an empty identifier, which no registry resolves.
fn extract_device(data: &Value) -> String {
    data.get(DEVICE_FIELD).and_then(Value::as_str).unwrap_or_default().to_string()
}
