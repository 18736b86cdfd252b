//! Capability trait through which the pipeline reaches external services.
//!
//! The gateway talks to two collaborators: the device registry (is this
//! device authorized to report?) and the forwarding sink (deliver the
//! normalized event, write structured log entries). Bundling them behind
//! one injected trait keeps the pipeline free of global state and lets
//! tests substitute in-memory fakes.
//!
//! Implementations must be safe to share across concurrent requests: the
//! pipeline holds one `Arc<dyn Collaborators>` for the process lifetime.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{GateError, Result};
use crate::models::NormalizedEvent;

/// Structured log entry written toward the sink.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Human-readable entry title.
    pub title: String,

    /// Device identifier the entry concerns.
    pub device: String,

    /// Optional event payload, present on "data received" entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// When the entry was produced.
    pub logged_at: DateTime<Utc>,
}

impl LogEntry {
    /// Entry for an unauthorized device that was refused.
    pub fn access_denied(device: &str) -> Self {
        Self {
            title: "IoT Events Gateway - Access Denied. Unauthorized Device".to_string(),
            device: device.to_string(),
            data: None,
            logged_at: Utc::now(),
        }
    }

    /// Entry for a successfully forwarded event.
    pub fn data_received(event: &NormalizedEvent) -> Self {
        Self {
            title: "IoT Events Gateway - Data Received".to_string(),
            device: event.device.clone(),
            data: serde_json::to_value(event).ok(),
            logged_at: Utc::now(),
        }
    }
}

/// External capabilities the pipeline depends on.
///
/// One implementation is constructed at startup and passed by reference
/// into every request; no shared mutable state is involved.
#[async_trait]
pub trait Collaborators: Send + Sync + fmt::Debug {
    /// Looks up a device in the registry.
    ///
    /// Returns `Ok(Some(record))` when the registry knows the device,
    /// `Ok(None)` when it does not (a denial, not an error).
    ///
    /// # Errors
    ///
    /// Returns [`GateError::LookupFailed`] when the registry call itself
    /// fails: transport error, timeout, or an unexpected response.
    async fn lookup_device(&self, device: &str) -> Result<Option<Value>>;

    /// Forwards a normalized event toward downstream consumers.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::SinkFailed`] when delivery fails.
    async fn forward(&self, event: &NormalizedEvent) -> Result<()>;

    /// Writes a structured log entry toward the sink.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::SinkFailed`] when the entry cannot be written.
    async fn log(&self, entry: &LogEntry) -> Result<()>;

    /// Reports a pipeline error to the process-wide exception sink.
    ///
    /// Called before the HTTP response is written for every rejected
    /// request, including absorbed errors that the caller never sees.
    fn report_exception(&self, error: &GateError) {
        tracing::error!(error = %error, status = error.status(), "pipeline exception");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn denied_entry_has_no_data() {
        let entry = LogEntry::access_denied("8901311242888845458");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["device"], "8901311242888845458");
        assert!(json["title"].as_str().unwrap().contains("Access Denied"));
        assert!(json.get("data").is_none());
    }

    #[test]
    fn received_entry_carries_the_event() {
        let event = crate::InboundEvent {
            event_id: "e1".into(),
            ..crate::InboundEvent::default()
        }
        .normalize("89".into(), json!({"iccid": "89"}));

        let entry = LogEntry::data_received(&event);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["device"], "89");
        assert!(json["title"].as_str().unwrap().contains("Data Received"));
        assert_eq!(json["data"]["data"]["iccid"], "89");
        assert_eq!(json["data"]["eventId"], "e1");
    }
}
