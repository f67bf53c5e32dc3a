//! Duplicate alert suppression for tvhook.
//!
//! Alert senders retry, and the same alert can be delivered more than once.
//! Every intent is reduced to an [`IdempotencyKey`]; the [`IdempotencyStore`]
//! remembers keys for a bounded time and a bounded count, and answers
//! "seen before?" atomically with recording the key.
//!
//! # Key derivation
//!
//! 1. Explicit `event_id` → used verbatim.
//! 2. Otherwise SHA-256 over `symbol:action:qty:bucket:strategy`, where
//!    `bucket = ts_ms / 5000` (alert timestamp, or now).
//!
//! Fingerprinted alerts for the same symbol/action/qty/strategy inside one
//! 5 s bucket collapse to one key. Two legitimately distinct alerts sent in
//! the same window are therefore also coalesced; senders that need both to
//! execute must set `event_id`.

pub mod clock;
pub mod key;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use key::{IdempotencyKey, FINGERPRINT_BUCKET_MS};
pub use store::IdempotencyStore;
