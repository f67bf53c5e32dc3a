//! Signature and passphrase gate.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Verifies inbound webhook requests.
///
/// Secrets are zeroized on drop and never appear in `Debug` output.
#[derive(Clone)]
pub struct AuthGate {
    passphrase: Zeroizing<String>,
    hmac_secret: Option<Zeroizing<String>>,
}

impl AuthGate {
    /// Create a gate. An empty `hmac_secret` disables signature checks.
    #[must_use]
    pub fn new(passphrase: impl Into<String>, hmac_secret: Option<String>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.into()),
            hmac_secret: hmac_secret
                .filter(|s| !s.is_empty())
                .map(Zeroizing::new),
        }
    }

    #[must_use]
    pub fn signature_required(&self) -> bool {
        self.hmac_secret.is_some()
    }

    /// Check the body signature.
    ///
    /// Skipped entirely when no secret is configured. Comparison is
    /// constant time and case-insensitive on the hex digits.
    pub fn verify_signature(&self, raw_body: &[u8], provided: Option<&str>) -> AuthResult<()> {
        let Some(secret) = &self.hmac_secret else {
            return Ok(());
        };

        let provided = provided
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingSignature)?;

        // hex::decode accepts both cases, which gives case-insensitive matching.
        let provided_bytes = hex::decode(provided).map_err(|_| {
            debug!("Signature header is not valid hex");
            AuthError::InvalidSignature
        })?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| AuthError::InvalidSignature)?;
        mac.update(raw_body);
        mac.verify_slice(&provided_bytes)
            .map_err(|_| AuthError::InvalidSignature)
    }

    /// Check the passphrase carried by the payload.
    pub fn verify_passphrase(&self, provided: &str) -> AuthResult<()> {
        if constant_time_eq(provided.as_bytes(), self.passphrase.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::Unauthorized)
        }
    }
}

impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate")
            .field("passphrase", &"<redacted>")
            .field("signature_required", &self.signature_required())
            .finish()
    }
}

/// Hex HMAC-SHA256 of `body` keyed by `secret`, as a sender would compute it.
#[must_use]
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Length leaks; content does not.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
