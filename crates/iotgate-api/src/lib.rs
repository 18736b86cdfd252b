//! Gateway HTTP API.
//!
//! Hosts the single ingestion endpoint, the figment-based configuration,
//! the signature verifier, and the validation pipeline that ties them to
//! the external collaborators.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod crypto;
pub mod handlers;
pub mod pipeline;
pub mod server;

pub use config::Config;
pub use server::{create_router, start_server, AppState};
