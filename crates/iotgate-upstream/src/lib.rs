//! HTTP-backed collaborators for the events gateway.
//!
//! Provides the reqwest clients for the two external services the pipeline
//! depends on: the device registry and the forwarding sink. Both clients
//! are created once at startup, hold pooled connections for the process
//! lifetime, and enforce a bounded request timeout so a silent upstream
//! classifies as a lookup or sink failure instead of hanging the request.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod registry;
pub mod sink;

use async_trait::async_trait;
use iotgate_core::{Collaborators, GateError, LogEntry, NormalizedEvent};
use serde_json::Value;

pub use error::{Result, UpstreamError};
pub use registry::RegistryClient;
pub use sink::SinkClient;

/// Shared configuration for the upstream HTTP clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout. A non-responding upstream fails the call after
    /// this long rather than stalling the pipeline.
    pub timeout: std::time::Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: std::time::Duration::from_secs(10),
            user_agent: "IotGate/0.1".to_string(),
        }
    }
}

/// Registry and sink clients bundled behind the pipeline's capability
/// trait. Constructed once in main and shared across all requests.
#[derive(Debug, Clone)]
pub struct HttpCollaborators {
    registry: RegistryClient,
    sink: SinkClient,
}

impl HttpCollaborators {
    /// Bundles the two clients.
    pub fn new(registry: RegistryClient, sink: SinkClient) -> Self {
        Self { registry, sink }
    }
}

#[async_trait]
impl Collaborators for HttpCollaborators {
    async fn lookup_device(&self, device: &str) -> iotgate_core::Result<Option<Value>> {
        self.registry
            .fetch_device(device)
            .await
            .map_err(|e| GateError::LookupFailed(e.to_string()))
    }

    async fn forward(&self, event: &NormalizedEvent) -> iotgate_core::Result<()> {
        self.sink.forward(event).await.map_err(|e| GateError::SinkFailed(e.to_string()))
    }

    async fn log(&self, entry: &LogEntry) -> iotgate_core::Result<()> {
        self.sink.write_log(entry).await.map_err(|e| GateError::SinkFailed(e.to_string()))
    }
}
