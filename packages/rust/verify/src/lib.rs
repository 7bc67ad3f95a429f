//! Verification client for the external email-verification endpoint.
//!
//! One GET per [`AddressVerifier::verify`] call, no caching and no retry;
//! pacing and failure accumulation belong to the runner. Transport and
//! protocol failures come back as typed errors carrying a description, so
//! the caller can still report the address that failed.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

use enrichmail_shared::{EnrichmailError, Result, VerificationRecord};

/// User-Agent string for verification requests.
const USER_AGENT: &str = concat!("enrichmail/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Explicit client configuration: the credential and base URL are passed in
/// at construction, never read from ambient globals.
#[derive(Clone)]
pub struct VerifyConfig {
    /// Verification endpoint URL (query parameters are appended per call).
    pub base_url: Url,
    /// Opaque API credential. Never logged.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for VerifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl VerifyConfig {
    /// Build a config from a base URL string and credential.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            EnrichmailError::config(format!("invalid verification base URL '{base_url}': {e}"))
        })?;
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Override the per-request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

// ---------------------------------------------------------------------------
// Verifier seam
// ---------------------------------------------------------------------------

/// Capability to verify one normalized address. The runner is generic over
/// this trait so tests can substitute a canned client.
pub trait AddressVerifier {
    /// Verify a single address: exactly one outbound call, best effort,
    /// single attempt.
    fn verify(&self, address: &str) -> impl Future<Output = Result<VerificationRecord>>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Provider response body, mapped field-for-field. Everything is optional:
/// a field the provider omitted must surface as "unknown" downstream, not
/// as a default `false` or `0`.
#[derive(Debug, Deserialize)]
struct WireVerifyResponse {
    format: Option<bool>,
    deliverable: Option<bool>,
    mx: Option<bool>,
    smtp: Option<bool>,
    free: Option<bool>,
    disposable: Option<bool>,
    domain: Option<String>,
    score: Option<serde_json::Value>,
    reason: Option<String>,
}

impl WireVerifyResponse {
    fn into_record(self, address: &str) -> VerificationRecord {
        VerificationRecord {
            address: address.to_string(),
            format_valid: self.format,
            deliverable: self.deliverable,
            mx_found: self.mx,
            smtp_check: self.smtp,
            is_free: self.free,
            is_disposable: self.disposable,
            domain: self.domain,
            score: self.score,
            reason: self.reason,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the verification endpoint.
pub struct VerificationClient {
    config: VerifyConfig,
    client: Client,
}

impl VerificationClient {
    /// Create a new client with the given configuration.
    pub fn new(config: VerifyConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                EnrichmailError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { config, client })
    }
}

impl AddressVerifier for VerificationClient {
    async fn verify(&self, address: &str) -> Result<VerificationRecord> {
        trace!(address, "sending verification request");

        let response = self
            .client
            .get(self.config.base_url.clone())
            .query(&[("api_key", self.config.api_key.as_str()), ("email", address)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EnrichmailError::Network(format!("{address}: request timed out"))
                } else {
                    // the query string carries the credential; never echo the URL
                    EnrichmailError::Network(format!("{address}: {}", e.without_url()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmailError::Network(format!(
                "{address}: HTTP {status}"
            )));
        }

        let wire: WireVerifyResponse = response.json().await.map_err(|e| {
            EnrichmailError::Provider(format!(
                "{address}: invalid response body: {}",
                e.without_url()
            ))
        })?;

        debug!(address, "verification response received");
        Ok(wire.into_record(address))
    }
}
