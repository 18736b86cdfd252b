//! IoT events gateway.
//!
//! Main entry point. Loads configuration, builds the process-wide
//! registry and sink clients, and serves the ingestion endpoint until a
//! shutdown signal arrives. A fatal server error is logged and the
//! process force-exits after a bounded grace period.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use iotgate_api::{start_server, AppState, Config};
use iotgate_upstream::{ClientConfig, HttpCollaborators, RegistryClient, SinkClient};
use tracing::{error, info, warn};

/// How long a fatal listener error is given to flush before the process
/// is terminated.
const FATAL_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!(
        endpoint = %config.endpoint_path(),
        port = config.port,
        registry_url = %config.registry_url,
        sink_url = %config.sink_url,
        signature_check = config.shared_secret.is_some(),
        "Starting events gateway"
    );

    if config.allow_unsigned {
        warn!(
            "allow_unsigned is set: signature verification is DISABLED and \
             every callback is trusted"
        );
    }

    let addr = config.parse_server_addr()?;
    let state = build_state(config)?;
    let port = addr.port();

    let server_handle = tokio::spawn(async move { start_server(state, addr).await });

    match server_handle.await {
        Ok(Ok(())) => {
            info!(port, "Events gateway closed");
            Ok(())
        },
        Ok(Err(e)) => {
            // Listener failure: give tracing and in-flight work a moment,
            // then terminate with a failure code.
            error!(error = %e, "Events gateway server error");
            tokio::time::sleep(FATAL_GRACE_PERIOD).await;
            std::process::exit(1);
        },
        Err(e) => Err(e).context("server task panicked"),
    }
}

/// Builds the shared request state: configuration plus the process-wide
/// collaborator clients.
fn build_state(config: Config) -> Result<AppState> {
    let client_config = ClientConfig {
        timeout: config.upstream_timeout(),
        ..ClientConfig::default()
    };

    let registry = RegistryClient::new(&config.registry_url, &client_config)
        .context("failed to build registry client")?;
    let sink =
        SinkClient::new(&config.sink_url, &client_config).context("failed to build sink client")?;

    let collaborators = Arc::new(HttpCollaborators::new(registry, sink));
    Ok(AppState::new(Arc::new(config), collaborators))
}

/// Initializes tracing with environment-based configuration.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
