//! Webhook authentication for tvhook.
//!
//! Two independent checks:
//! - Signature: HMAC-SHA256 of the raw body, hex encoded, sent in the
//!   `X-Signature` header. Only enforced when a secret is configured.
//! - Passphrase: carried inside the JSON payload, compared once parsed.

pub mod error;
pub mod gate;

pub use error::{AuthError, AuthResult};
pub use gate::{sign_body, AuthGate, SIGNATURE_HEADER};
