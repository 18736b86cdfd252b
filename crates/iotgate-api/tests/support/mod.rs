//! In-memory collaborators for pipeline and router tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use iotgate_core::{Collaborators, GateError, LogEntry, NormalizedEvent, Result};
use serde_json::Value;

/// Fake registry and sink that records every interaction.
#[derive(Debug, Default)]
pub struct RecordingCollaborators {
    /// Devices the fake registry knows about.
    pub registry: Mutex<HashMap<String, Value>>,
    /// When set, lookups fail with `LookupFailed`.
    pub fail_lookup: bool,
    /// When set, lookups panic instead of returning.
    pub panic_on_lookup: bool,
    /// When set, forwards fail with `SinkFailed`.
    pub fail_forward: bool,
    /// Events accepted by the fake sink.
    pub forwarded: Mutex<Vec<NormalizedEvent>>,
    /// Log entries accepted by the fake sink.
    pub logs: Mutex<Vec<LogEntry>>,
    /// Errors reported to the exception sink.
    pub exceptions: Mutex<Vec<String>>,
}

impl RecordingCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(device: &str) -> Self {
        let collaborators = Self::default();
        collaborators
            .registry
            .lock()
            .unwrap()
            .insert(device.to_string(), serde_json::json!({ "_id": device }));
        collaborators
    }

    pub fn forwarded_devices(&self) -> Vec<String> {
        self.forwarded.lock().unwrap().iter().map(|e| e.device.clone()).collect()
    }

    pub fn log_titles(&self) -> Vec<String> {
        self.logs.lock().unwrap().iter().map(|e| e.title.clone()).collect()
    }
}

#[async_trait]
impl Collaborators for RecordingCollaborators {
    async fn lookup_device(&self, device: &str) -> Result<Option<Value>> {
        if self.panic_on_lookup {
            panic!("registry client poisoned");
        }
        if self.fail_lookup {
            return Err(GateError::LookupFailed("registry unreachable".into()));
        }
        Ok(self.registry.lock().unwrap().get(device).cloned())
    }

    async fn forward(&self, event: &NormalizedEvent) -> Result<()> {
        if self.fail_forward {
            return Err(GateError::SinkFailed("sink unreachable".into()));
        }
        self.forwarded.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn log(&self, entry: &LogEntry) -> Result<()> {
        self.logs.lock().unwrap().push(entry.clone());
        Ok(())
    }

    fn report_exception(&self, error: &GateError) {
        self.exceptions.lock().unwrap().push(error.to_string());
    }
}
