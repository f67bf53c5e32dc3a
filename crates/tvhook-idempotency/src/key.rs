//! Idempotency key derivation.

use std::fmt;

use sha2::{Digest, Sha256};
use tvhook_core::OrderIntent;

/// Width of the timestamp bucket used for fingerprinting (5 s).
pub const FINGERPRINT_BUCKET_MS: i64 = 5_000;

/// Key under which an intent is deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Derive the key for an intent.
    ///
    /// `now_ms` is used only when the intent carries no timestamp.
    #[must_use]
    pub fn derive(intent: &OrderIntent, now_ms: u64) -> Self {
        if let Some(event_id) = intent.event_id() {
            return Self(event_id.to_string());
        }

        let ts_ms = intent
            .timestamp_ms()
            .unwrap_or_else(|| i64::try_from(now_ms).unwrap_or(i64::MAX));
        let bucket = ts_ms.div_euclid(FINGERPRINT_BUCKET_MS);
        let qty = intent.quantity().map(|q| q.to_string()).unwrap_or_default();
        let raw = format!(
            "{}:{}:{}:{}:{}",
            intent.symbol(),
            intent.action(),
            qty,
            bucket,
            intent.strategy().unwrap_or("")
        );

        Self(hex::encode(Sha256::digest(raw.as_bytes())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdempotencyKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvhook_core::PayloadValidator;

    fn intent(json: &str) -> OrderIntent {
        PayloadValidator::parse(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_event_id_used_verbatim() {
        let i = intent(r#"{"passphrase":"p","symbol":"btcusdt","action":"buy","qty":"1","event_id":"abc-1"}"#);
        assert_eq!(IdempotencyKey::derive(&i, 0).as_str(), "abc-1");
    }

    #[test]
    fn test_fingerprint_matches_reference_digest() {
        let i = intent(r#"{"passphrase":"p","symbol":"btcusdt","action":"buy","qty":"0.001","ts":1700000001234}"#);
        let key = IdempotencyKey::derive(&i, 0);
        let expected = hex::encode(Sha256::digest(b"BTCUSDT:BUY:0.001:340000000:"));
        assert_eq!(key.as_str(), expected);
    }

    #[test]
    fn test_same_bucket_collapses() {
        let a = intent(r#"{"passphrase":"p","symbol":"ETHUSDT","action":"buy","qty":"1","ts":1700000000000,"strategy":"s"}"#);
        let b = intent(r#"{"passphrase":"other","symbol":"ethusdt","action":"BUY","qty":"1","ts":1700000004999,"strategy":"s"}"#);
        assert_eq!(IdempotencyKey::derive(&a, 0), IdempotencyKey::derive(&b, 0));
    }

    #[test]
    fn test_next_bucket_differs() {
        let a = intent(r#"{"passphrase":"p","symbol":"ETHUSDT","action":"buy","qty":"1","ts":1700000004999}"#);
        let b = intent(r#"{"passphrase":"p","symbol":"ETHUSDT","action":"buy","qty":"1","ts":1700000005000}"#);
        assert_ne!(IdempotencyKey::derive(&a, 0), IdempotencyKey::derive(&b, 0));
    }

    #[test]
    fn test_strategy_and_action_distinguish() {
        let a = intent(r#"{"passphrase":"p","symbol":"ETHUSDT","action":"buy","qty":"1","ts":1700000000000,"strategy":"a"}"#);
        let b = intent(r#"{"passphrase":"p","symbol":"ETHUSDT","action":"buy","qty":"1","ts":1700000000000,"strategy":"b"}"#);
        let c = intent(r#"{"passphrase":"p","symbol":"ETHUSDT","action":"close","qty":"1","ts":1700000000000,"strategy":"a"}"#);
        let ka = IdempotencyKey::derive(&a, 0);
        assert_ne!(ka, IdempotencyKey::derive(&b, 0));
        assert_ne!(ka, IdempotencyKey::derive(&c, 0));
    }

    #[test]
    fn test_negative_ts_floors_to_bucket() {
        let a = intent(r#"{"passphrase":"p","symbol":"ETHUSDT","action":"buy","qty":"1","ts":-1}"#);
        let b = intent(r#"{"passphrase":"p","symbol":"ETHUSDT","action":"buy","qty":"1","ts":-5000}"#);
        assert_eq!(IdempotencyKey::derive(&a, 0), IdempotencyKey::derive(&b, 0));
        let expected = hex::encode(Sha256::digest(b"ETHUSDT:BUY:1:-1:"));
        assert_eq!(IdempotencyKey::derive(&a, 0).as_str(), expected);
    }

    #[test]
    fn test_missing_ts_uses_now() {
        let i = intent(r#"{"passphrase":"p","symbol":"ETHUSDT","action":"buy","qty":"1"}"#);
        assert_eq!(
            IdempotencyKey::derive(&i, 1_700_000_000_000),
            IdempotencyKey::derive(&i, 1_700_000_004_000)
        );
        assert_ne!(
            IdempotencyKey::derive(&i, 1_700_000_000_000),
            IdempotencyKey::derive(&i, 1_700_000_005_000)
        );
    }
}
