//! Health and readiness probes.
//!
//! The gateway holds no local state worth probing; readiness and
//! liveness both report the process is up. The endpoints exist so
//! orchestrators have something to point their checks at.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Basic health check.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Readiness probe.
pub async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

/// Liveness probe.
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "alive" })))
}
