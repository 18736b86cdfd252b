//! Core domain types for the events gateway.
//!
//! Provides the inbound/normalized event models, the error taxonomy that
//! drives HTTP status mapping, the XML event decoder, and the
//! `Collaborators` capability trait through which the pipeline reaches the
//! device registry and the forwarding sink. All other crates depend on
//! these foundational types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod collaborators;
pub mod decode;
pub mod error;
pub mod models;

pub use collaborators::{Collaborators, LogEntry};
pub use decode::decode_event_xml;
pub use error::{GateError, Result};
pub use models::{InboundEvent, NormalizedEvent, PipelineOutcome};
