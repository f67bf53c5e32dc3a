//! Application configuration.
//!
//! Sources, later wins:
//! 1. Built-in defaults
//! 2. TOML file
//! 3. Environment variables (`TV_PASSPHRASE`, `DRY_RUN`, `BINANCE_API_KEY`, ...)

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tvhook_server::ServerConfig;
use tvhook_telemetry::LoggingConfig;
use tvhook_venue::{RoutingConfig, VenueConfig, VenueId};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{AppError, AppResult};

/// Webhook authentication secrets.
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AuthConfig {
    /// Required. Compared against the `passphrase` field of every alert.
    #[serde(default, skip_serializing)]
    pub passphrase: String,
    /// Optional. When set, `X-Signature` must carry the body HMAC.
    #[serde(default, skip_serializing)]
    pub hmac_secret: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("passphrase", &"<redacted>")
            .field("hmac_enabled", &self.hmac_enabled())
            .finish()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn hmac_enabled(&self) -> bool {
        self.hmac_secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Duplicate suppression window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyConfig {
    /// Seconds a key is remembered. Default: 60.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    /// Maximum remembered keys. Default: 512.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_ttl_seconds() -> u64 {
    60
}

fn default_capacity() -> usize {
    512
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            capacity: default_capacity(),
        }
    }
}

impl IdempotencyConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Service name, used in logs.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// When true, the full pipeline runs but no venue call is made. Default: true.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    /// Upper bound on a single venue call (ms). Default: 10,000.
    #[serde(default = "default_venue_timeout_ms")]
    pub venue_timeout_ms: u64,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub idempotency: IdempotencyConfig,
    #[serde(default)]
    pub binance: VenueConfig,
    #[serde(default)]
    pub bybit: VenueConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_app_name() -> String {
    "tv-webhook-backend".to_string()
}

fn default_dry_run() -> bool {
    true
}

fn default_venue_timeout_ms() -> u64 {
    10_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            dry_run: default_dry_run(),
            venue_timeout_ms: default_venue_timeout_ms(),
            auth: AuthConfig::default(),
            routing: RoutingConfig::default(),
            idempotency: IdempotencyConfig::default(),
            binance: VenueConfig::default(),
            bybit: VenueConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load `path` if it exists (defaults otherwise), apply the process
    /// environment, and validate.
    pub fn load(path: &str) -> AppResult<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with an explicit environment lookup.
    pub fn load_with_env(
        path: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Override fields from environment variables. Unset or empty
    /// variables leave the current value alone.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<()> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("APP_NAME") {
            self.app_name = v;
        }
        if let Some(v) = var("TV_PASSPHRASE") {
            self.auth.passphrase = v;
        }
        if let Some(v) = var("TV_WEBHOOK_HMAC_SECRET") {
            self.auth.hmac_secret = Some(v);
        }
        if let Some(v) = var("EXCHANGE_DEFAULT") {
            self.routing.default_venue = v
                .parse()
                .map_err(|e| AppError::Config(format!("EXCHANGE_DEFAULT: {e}")))?;
        }
        if let Some(v) = var("EXCHANGE_SYMBOL_MAP") {
            self.routing.symbol_map = parse_symbol_map(&v)?;
        }
        if let Some(v) = var("DRY_RUN") {
            self.dry_run = parse_bool("DRY_RUN", &v)?;
        }
        if let Some(v) = var("BINANCE_API_KEY") {
            self.binance.api_key = Some(v);
        }
        if let Some(v) = var("BINANCE_API_SECRET") {
            self.binance.api_secret = Some(Zeroizing::new(v));
        }
        if let Some(v) = var("BYBIT_API_KEY") {
            self.bybit.api_key = Some(v);
        }
        if let Some(v) = var("BYBIT_API_SECRET") {
            self.bybit.api_secret = Some(Zeroizing::new(v));
        }
        if let Some(v) = var("IDEMPOTENCY_TTL_SECONDS") {
            self.idempotency.ttl_seconds = parse_number("IDEMPOTENCY_TTL_SECONDS", &v)?;
        }
        if let Some(v) = var("IDEMPOTENCY_CACHE_SIZE") {
            self.idempotency.capacity = parse_number("IDEMPOTENCY_CACHE_SIZE", &v)?;
        }
        if let Some(v) = var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = var("PORT") {
            self.server.port = parse_number("PORT", &v)?;
        }
        Ok(())
    }

    /// Reject configurations the service cannot run with, and normalize
    /// symbol-map keys to upper case.
    pub fn validate(&mut self) -> AppResult<()> {
        if self.auth.passphrase.is_empty() {
            return Err(AppError::Config(
                "passphrase is required (auth.passphrase or TV_PASSPHRASE)".to_string(),
            ));
        }
        if self.idempotency.ttl_seconds == 0 {
            return Err(AppError::Config(
                "idempotency.ttl_seconds must be positive".to_string(),
            ));
        }
        if self.idempotency.capacity == 0 {
            return Err(AppError::Config(
                "idempotency.capacity must be positive".to_string(),
            ));
        }
        if self.venue_timeout_ms == 0 {
            return Err(AppError::Config(
                "venue_timeout_ms must be positive".to_string(),
            ));
        }

        self.routing.symbol_map = std::mem::take(&mut self.routing.symbol_map)
            .into_iter()
            .map(|(symbol, venue)| (symbol.trim().to_uppercase(), venue))
            .collect();
        Ok(())
    }

    #[must_use]
    pub fn venue_timeout(&self) -> Duration {
        Duration::from_millis(self.venue_timeout_ms)
    }
}

/// `EXCHANGE_SYMBOL_MAP`: a JSON object of symbol -> venue name.
fn parse_symbol_map(raw: &str) -> AppResult<HashMap<String, VenueId>> {
    let parsed: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| AppError::Config(format!("Invalid EXCHANGE_SYMBOL_MAP: {e}")))?;
    let object = parsed.as_object().ok_or_else(|| {
        AppError::Config("EXCHANGE_SYMBOL_MAP must be a JSON object".to_string())
    })?;

    object
        .iter()
        .map(|(symbol, venue)| {
            let venue = venue
                .as_str()
                .and_then(|v| v.parse::<VenueId>().ok())
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "Unsupported exchange '{venue}' for symbol '{symbol}'"
                    ))
                })?;
            Ok((symbol.to_uppercase(), venue))
        })
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Config(format!("{key}: invalid boolean '{other}'"))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{key}: invalid number '{raw}'")))
}
