//! Error categorization for upstream HTTP calls.

use thiserror::Error;

/// Result type alias using [`UpstreamError`].
pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Failures talking to the registry or sink.
///
/// "Device not found" is deliberately not an error: the registry client
/// reports it as an absent record so the pipeline can treat it as a
/// denial rather than a dependency failure.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Request exceeded the configured timeout.
    #[error("{service} request timed out after {timeout_secs}s")]
    Timeout {
        /// Which upstream the request went to.
        service: &'static str,
        /// The timeout that was exceeded, in seconds.
        timeout_secs: u64,
    },

    /// Connection or transport failure.
    #[error("{service} network error: {message}")]
    Network {
        /// Which upstream the request went to.
        service: &'static str,
        /// Underlying transport error.
        message: String,
    },

    /// Upstream answered with a status the client does not accept.
    #[error("{service} returned unexpected status {status}")]
    UnexpectedStatus {
        /// Which upstream the request went to.
        service: &'static str,
        /// The offending HTTP status code.
        status: u16,
    },

    /// Response body could not be interpreted.
    #[error("{service} returned an invalid body: {message}")]
    InvalidBody {
        /// Which upstream the request went to.
        service: &'static str,
        /// What was wrong with the body.
        message: String,
    },

    /// Client could not be constructed from its configuration.
    #[error("client configuration error: {0}")]
    Configuration(String),
}

impl UpstreamError {
    pub(crate) fn from_reqwest(service: &'static str, timeout_secs: u64, e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout { service, timeout_secs }
        } else {
            Self::Network { service, message: e.to_string() }
        }
    }
}
