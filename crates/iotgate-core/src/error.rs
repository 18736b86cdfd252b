//! Error types and result handling for the event pipeline.
//!
//! The taxonomy encodes the response contract of the gateway: a true
//! authentication failure is the only error surfaced as non-2xx, while
//! payload and dependency failures are absorbed to 200 so the webhook
//! provider does not retry them. Absorbed errors must be reported to the
//! exception sink before the response is written.

use thiserror::Error;

/// Result type alias using [`GateError`].
pub type Result<T> = std::result::Result<T, GateError>;

/// Pipeline error taxonomy with HTTP status mapping.
#[derive(Debug, Error)]
pub enum GateError {
    /// Request carried no form fields at all.
    #[error("empty request body")]
    EmptyBody,

    /// Event signature did not match the configured shared secret.
    #[error("invalid event signature")]
    InvalidSignature,

    /// Embedded XML payload could not be decoded.
    #[error("malformed event payload: {0}")]
    MalformedPayload(String),

    /// Device registry lookup failed (transport error, timeout, or an
    /// unexpected response). Distinct from "device not found", which is a
    /// denial, not an error.
    #[error("device lookup failed: {0}")]
    LookupFailed(String),

    /// Forwarding or log delivery toward the sink failed.
    #[error("event forwarding failed: {0}")]
    SinkFailed(String),

    /// Invalid gateway configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Generic error for wrapping other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GateError {
    /// Returns the HTTP status the gateway responds with for this error.
    ///
    /// Only `EmptyBody` (400) and `InvalidSignature` (403) are surfaced to
    /// the caller. Payload and dependency failures map to 200: the provider
    /// retries any non-2xx, and retrying those cannot succeed.
    pub const fn status(&self) -> u16 {
        match self {
            Self::EmptyBody => 400,
            Self::InvalidSignature => 403,
            Self::MalformedPayload(_) | Self::LookupFailed(_) | Self::SinkFailed(_) => 200,
            Self::Config(_) | Self::Other(_) => 500,
        }
    }

    /// Returns whether this error is absorbed (reported as 200 and only
    /// visible through the exception sink).
    pub const fn is_absorbed(&self) -> bool {
        matches!(
            self,
            Self::MalformedPayload(_) | Self::LookupFailed(_) | Self::SinkFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_response_contract() {
        assert_eq!(GateError::EmptyBody.status(), 400);
        assert_eq!(GateError::InvalidSignature.status(), 403);
        assert_eq!(GateError::MalformedPayload("bad xml".into()).status(), 200);
        assert_eq!(GateError::LookupFailed("timeout".into()).status(), 200);
        assert_eq!(GateError::SinkFailed("refused".into()).status(), 200);
        assert_eq!(GateError::Config("port".into()).status(), 500);
    }

    #[test]
    fn absorbed_errors_identified() {
        assert!(!GateError::EmptyBody.is_absorbed());
        assert!(!GateError::InvalidSignature.is_absorbed());
        assert!(GateError::MalformedPayload("x".into()).is_absorbed());
        assert!(GateError::LookupFailed("x".into()).is_absorbed());
        assert!(GateError::SinkFailed("x".into()).is_absorbed());
    }
}
