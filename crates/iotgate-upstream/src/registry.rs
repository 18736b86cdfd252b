//! HTTP client for the device registry.
//!
//! The registry maps a device identifier to its record. The authorization
//! contract is deliberately soft: a missing record (404, empty or null
//! body) means "unauthorized", while transport failures and unexpected
//! statuses are real errors the pipeline must not confuse with a denial.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{Result, UpstreamError};
use crate::ClientConfig;

const SERVICE: &str = "registry";

/// Client for device authorization lookups.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl RegistryClient {
    /// Creates a registry client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Configuration`] if the HTTP client cannot
    /// be built with the provided settings.
    pub fn new(base_url: impl Into<String>, config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| UpstreamError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// Fetches the registry record for a device.
    ///
    /// Returns `Ok(None)` when the registry has no record: a 404, or a
    /// 2xx with an empty, null, scalar, or `{}` body. Any non-empty
    /// record comes back as `Ok(Some(record))`.
    ///
    /// # Errors
    ///
    /// Returns a categorized [`UpstreamError`] on timeout, transport
    /// failure, an unexpected status, or an unreadable body.
    #[instrument(name = "registry_lookup", skip(self), fields(device = %device))]
    pub async fn fetch_device(&self, device: &str) -> Result<Option<Value>> {
        let url = format!("{}/devices/{}", self.base_url, device);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, self.timeout_secs, &e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("device not present in registry");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(UpstreamError::UnexpectedStatus { service: SERVICE, status: status.as_u16() });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, self.timeout_secs, &e))?;

        if body.is_empty() {
            debug!("registry returned an empty record");
            return Ok(None);
        }

        let record: Value = serde_json::from_slice(&body)
            .map_err(|e| UpstreamError::InvalidBody { service: SERVICE, message: e.to_string() })?;

        if record_is_empty(&record) {
            debug!("registry returned an empty record");
            Ok(None)
        } else {
            debug!("device record found");
            Ok(Some(record))
        }
    }
}

/// A record without fields counts as "not registered". Bare scalars
/// (booleans, numbers) carry no device data and count as empty too; only
/// a non-empty object, array, or string authorizes.
fn record_is_empty(record: &Value) -> bool {
    match record {
        Value::Null | Value::Bool(_) | Value::Number(_) => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
    }
}
