//! Exact decimal order size.
//!
//! Uses `rust_decimal` so that a quantity such as `0.001` reaches the venue
//! exactly as the alert sent it. Floating point is never involved.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order quantity with exact decimal precision.
///
/// `Display` preserves the scale of the input (`"0.0010"` stays `"0.0010"`),
/// which matters for idempotency fingerprints and for venue payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(pub Decimal);

impl Quantity {
    #[inline]
    #[must_use]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    /// Parse from a JSON value (string or number).
    ///
    /// `serde_json` is built with `arbitrary_precision`, so a number keeps its
    /// original digits and is parsed from that text.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => s.trim().parse().ok(),
            serde_json::Value::Number(n) => n.to_string().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Quantity {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map(Self)
    }
}

impl From<Decimal> for Quantity {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}
