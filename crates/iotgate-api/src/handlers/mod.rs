//! HTTP request handlers for the gateway.
//!
//! - `events` - the single ingestion endpoint
//! - `health` - health and readiness probes
//!
//! Handlers own the error-to-status mapping: pipeline outcomes are
//! translated to the response contract here and error details are never
//! exposed in response bodies.

pub mod events;
pub mod health;

pub use events::ingest_event;
pub use health::{health_check, liveness_check, readiness_check};
