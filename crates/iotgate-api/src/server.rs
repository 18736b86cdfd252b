//! HTTP server configuration and request routing.
//!
//! Provides the Axum router with its middleware stack and the server
//! startup with graceful shutdown. Requests flow through middleware in
//! order:
//! 1. Request ID generation
//! 2. Security response headers
//! 3. Request/response logging
//! 4. Panic containment (unhandled panics become 500)
//! 5. Timeout enforcement
//! 6. Handler execution
//!
//! Unknown paths fall through to a plain 404. The ingestion path itself
//! is configurable and read from the shared state at router build time.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use iotgate_core::Collaborators;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{handlers, Config};

/// Immutable state shared by every request: the configuration and the
/// process-wide collaborator handle.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Gateway configuration, fixed at startup.
    pub config: Arc<Config>,
    /// External capabilities used by the pipeline.
    pub collaborators: Arc<dyn Collaborators>,
}

impl AppState {
    /// Bundles configuration and collaborators for the router.
    pub fn new(config: Arc<Config>, collaborators: Arc<dyn Collaborators>) -> Self {
        Self { config, collaborators }
    }
}

/// Creates the Axum router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let endpoint_path = state.config.endpoint_path();
    let request_timeout = Duration::from_secs(state.config.request_timeout);

    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/live", get(handlers::liveness_check));

    Router::new()
        .route(&endpoint_path, post(handlers::ingest_event))
        .merge(health_routes)
        .fallback(unknown_path)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Any path other than the configured endpoint and the probes.
async fn unknown_path() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Middleware to inject a request ID into all responses.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Hardening headers on every response: deny framing, forbid content-type
/// sniffing, enable the legacy XSS filter.
async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        HeaderName::from_static("x-xss-protection"),
        HeaderValue::from_static("1; mode=block"),
    );

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// Binds the listener and serves requests until a shutdown signal is
/// received, then stops accepting connections and drains in-flight
/// requests.
///
/// # Errors
///
/// Returns `std::io::Error` if the port is already in use or the network
/// interface is unavailable.
pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let endpoint = state.config.endpoint_path();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!(addr = %actual_addr, %endpoint, "events gateway listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Draining in-flight requests");
}
