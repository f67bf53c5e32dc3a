//! Per-venue configuration and credentials.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use zeroize::Zeroizing;

/// Connection settings for one venue.
#[derive(Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// API key (absent = adapter runs without a client).
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API secret, zeroized on drop.
    #[serde(default, skip_serializing)]
    pub api_secret: Option<Zeroizing<String>>,
    /// REST base URL override (testnet, proxy). None = venue mainnet.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Signed-request receive window in milliseconds. Default: 5000.
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
    /// HTTP client timeout in milliseconds. Default: 10000.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_recv_window_ms() -> u64 {
    5_000
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            base_url: None,
            recv_window_ms: default_recv_window_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl VenueConfig {
    /// Credentials, if both key and secret are set and non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<VenueCredentials> {
        VenueCredentials::from_parts(
            self.api_key.as_deref(),
            self.api_secret.as_ref().map(|s| s.as_str()),
        )
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl fmt::Debug for VenueConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VenueConfig")
            .field("has_credentials", &self.credentials().is_some())
            .field("base_url", &self.base_url)
            .field("recv_window_ms", &self.recv_window_ms)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// API key pair. The secret is zeroized on drop.
#[derive(Clone)]
pub struct VenueCredentials {
    api_key: String,
    api_secret: Zeroizing<String>,
}

impl VenueCredentials {
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: Zeroizing::new(api_secret.into()),
        }
    }

    /// Build from optional parts; both must be present and non-empty.
    #[must_use]
    pub fn from_parts(api_key: Option<&str>, api_secret: Option<&str>) -> Option<Self> {
        match (api_key, api_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some(Self::new(key, secret))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for VenueCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VenueCredentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
