//! Configuration management for the events gateway.
//!
//! Loaded in priority order: environment variables over `config.toml` over
//! built-in defaults. The port has no usable default and must be set.
//!
//! Signature checking is governed by two options that validation forces to
//! be consistent: either `shared_secret` is set (signatures verified) or
//! `allow_unsigned` is explicitly true (open mode, every event trusted).
//! Open mode is a deliberate trust-boundary relaxation for providers that
//! cannot sign callbacks; it is never the silent default.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Complete gateway configuration with defaults, file, and environment
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Endpoint
    /// Path the ingestion endpoint is served on. A missing leading slash
    /// is tolerated and normalized.
    ///
    /// Environment variable: `GATEWAY_URL`
    #[serde(default = "default_url", alias = "GATEWAY_URL")]
    pub url: String,
    /// Server bind host.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port. Required; there is no default.
    ///
    /// Environment variable: `PORT`
    #[serde(default, alias = "PORT")]
    pub port: u16,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Authentication
    /// Shared secret used to verify event signatures.
    ///
    /// Environment variable: `SHARED_SECRET`
    #[serde(default, alias = "SHARED_SECRET")]
    pub shared_secret: Option<String>,
    /// Explicit opt-in to accepting unsigned events. Required when no
    /// shared secret is configured; rejected when one is.
    ///
    /// Environment variable: `ALLOW_UNSIGNED`
    #[serde(default, alias = "ALLOW_UNSIGNED")]
    pub allow_unsigned: bool,

    // Collaborators
    /// Base URL of the device registry.
    ///
    /// Environment variable: `REGISTRY_URL`
    #[serde(default = "default_registry_url", alias = "REGISTRY_URL")]
    pub registry_url: String,
    /// Base URL of the forwarding sink.
    ///
    /// Environment variable: `SINK_URL`
    #[serde(default = "default_sink_url", alias = "SINK_URL")]
    pub sink_url: String,
    /// Timeout for registry and sink requests in seconds. Bounds the only
    /// blocking step of the pipeline.
    ///
    /// Environment variable: `UPSTREAM_TIMEOUT_SECONDS`
    #[serde(default = "default_upstream_timeout", alias = "UPSTREAM_TIMEOUT_SECONDS")]
    pub upstream_timeout_seconds: u64,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment
    /// variable overrides, then validate it.
    ///
    /// # Errors
    ///
    /// Fails when a source cannot be read or validation rejects the
    /// merged result.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Ingestion path with the leading slash guaranteed.
    pub fn endpoint_path(&self) -> String {
        if self.url.starts_with('/') {
            self.url.clone()
        } else {
            format!("/{}", self.url)
        }
    }

    /// Parse server socket address from host and port configuration.
    ///
    /// # Errors
    ///
    /// Fails when host and port do not form a valid socket address.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Timeout applied to registry and sink requests.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be set");
        }

        if self.url.is_empty() {
            anyhow::bail!("url must not be empty");
        }

        match (&self.shared_secret, self.allow_unsigned) {
            (None, false) => anyhow::bail!(
                "no shared_secret configured: set one, or explicitly opt in to \
                 accepting unsigned events with allow_unsigned = true"
            ),
            (Some(_), true) => anyhow::bail!(
                "allow_unsigned = true conflicts with a configured shared_secret: \
                 remove one of the two"
            ),
            _ => {},
        }

        if let Some(secret) = &self.shared_secret {
            if secret.is_empty() {
                anyhow::bail!("shared_secret must not be empty when set");
            }
        }

        if self.registry_url.is_empty() {
            anyhow::bail!("registry_url must not be empty");
        }

        if self.sink_url.is_empty() {
            anyhow::bail!("sink_url must not be empty");
        }

        if self.upstream_timeout_seconds == 0 {
            anyhow::bail!("upstream_timeout_seconds must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: default_url(),
            host: default_host(),
            port: 0,
            request_timeout: default_request_timeout(),
            shared_secret: None,
            allow_unsigned: false,
            registry_url: default_registry_url(),
            sink_url: default_sink_url(),
            upstream_timeout_seconds: default_upstream_timeout(),
            rust_log: default_log_level(),
        }
    }
}

fn default_url() -> String {
    "/events".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_registry_url() -> String {
    "http://localhost:9010".to_string()
}

fn default_sink_url() -> String {
    "http://localhost:9020".to_string()
}

fn default_upstream_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}
