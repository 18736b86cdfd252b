//! HTTP client for the forwarding sink.
//!
//! The sink receives two kinds of writes on separate paths: serialized
//! normalized events for downstream delivery (`/events`) and structured
//! log entries (`/logs`). The two operations fail independently; either
//! failure surfaces to the pipeline's exception handling.

use iotgate_core::{LogEntry, NormalizedEvent};
use tracing::{debug, instrument};

use crate::error::{Result, UpstreamError};
use crate::ClientConfig;

const SERVICE: &str = "sink";

/// Client for downstream event delivery and structured logging.
#[derive(Debug, Clone)]
pub struct SinkClient {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl SinkClient {
    /// Creates a sink client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Configuration`] if the HTTP client cannot
    /// be built with the provided settings.
    pub fn new(base_url: impl Into<String>, config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| UpstreamError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// Delivers a normalized event downstream.
    ///
    /// # Errors
    ///
    /// Returns a categorized [`UpstreamError`] on timeout, transport
    /// failure, or a non-2xx response.
    #[instrument(name = "sink_forward", skip(self, event), fields(device = %event.device, event_id = %event.event_id))]
    pub async fn forward(&self, event: &NormalizedEvent) -> Result<()> {
        self.post("events", event).await?;
        debug!("event forwarded to sink");
        Ok(())
    }

    /// Writes a structured log entry.
    ///
    /// # Errors
    ///
    /// Returns a categorized [`UpstreamError`] on timeout, transport
    /// failure, or a non-2xx response.
    #[instrument(name = "sink_log", skip(self, entry), fields(device = %entry.device))]
    pub async fn write_log(&self, entry: &LogEntry) -> Result<()> {
        self.post("logs", entry).await?;
        debug!("log entry written to sink");
        Ok(())
    }

    async fn post<T: serde::Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<()> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, self.timeout_secs, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::UnexpectedStatus { service: SERVICE, status: status.as_u16() });
        }
        Ok(())
    }
}
