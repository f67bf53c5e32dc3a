//! Canonical order intent and the payload validator that produces it.
//!
//! # Accepted payload
//!
//! ```text
//! {
//!   "passphrase": "…",          required
//!   "symbol":     "btcusdt",    required, upper-cased
//!   "action":     "buy",        required, BUY | CLOSE (case-insensitive)
//!   "qty":        "0.001",      string or number; required for BUY, see below for CLOSE
//!   "type":       "MARKET",     optional, defaults to MARKET
//!   "ts":         1700000000000 optional, ms since epoch (integer, integral float or digit string)
//!   "event_id":   "e1",         optional
//!   "strategy":   "trend"       optional
//! }
//! ```
//!
//! Symbols must be ASCII alphanumeric after normalization, since they are
//! placed verbatim in signed venue requests.
//!
//! Unknown fields are ignored. A CLOSE alert without `qty` parses, and is
//! rejected by [`OrderIntent::validate_order`] so that every schema error
//! surfaces before any order-level rule is applied.

use serde::Deserialize;
use std::fmt;

use crate::decimal::Quantity;
use crate::error::{ValidationError, ValidationResult};
use crate::order::{OrderAction, Symbol, MARKET_ORDER_TYPE};

/// Wire shape of an alert, before normalization.
#[derive(Debug, Deserialize)]
struct RawAlert {
    passphrase: String,
    symbol: String,
    action: String,
    #[serde(default, alias = "quantity")]
    qty: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    order_type: Option<String>,
    #[serde(default)]
    ts: Option<serde_json::Value>,
    #[serde(default)]
    event_id: Option<String>,
    #[serde(default)]
    strategy: Option<String>,
}

/// One alert, normalized. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct OrderIntent {
    symbol: Symbol,
    action: OrderAction,
    quantity: Option<Quantity>,
    order_type: String,
    event_id: Option<String>,
    timestamp_ms: Option<i64>,
    strategy: Option<String>,
    passphrase: String,
}

impl OrderIntent {
    #[must_use]
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    #[must_use]
    pub fn action(&self) -> OrderAction {
        self.action
    }

    #[must_use]
    pub fn quantity(&self) -> Option<Quantity> {
        self.quantity
    }

    /// Order type as sent by the alert (MARKET when absent).
    #[must_use]
    pub fn order_type(&self) -> &str {
        &self.order_type
    }

    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    #[must_use]
    pub fn timestamp_ms(&self) -> Option<i64> {
        self.timestamp_ms
    }

    #[must_use]
    pub fn strategy(&self) -> Option<&str> {
        self.strategy.as_deref()
    }

    #[must_use]
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    #[must_use]
    pub fn is_market(&self) -> bool {
        self.order_type.eq_ignore_ascii_case(MARKET_ORDER_TYPE)
    }

    /// Order-level checks, applied after authentication.
    ///
    /// Returns the quantity to execute.
    pub fn validate_order(&self) -> ValidationResult<Quantity> {
        if !self.is_market() {
            return Err(ValidationError::UnsupportedOrderType(
                self.order_type.clone(),
            ));
        }
        self.quantity.ok_or(ValidationError::MissingQuantity)
    }
}

impl fmt::Debug for OrderIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderIntent")
            .field("symbol", &self.symbol)
            .field("action", &self.action)
            .field("quantity", &self.quantity)
            .field("order_type", &self.order_type)
            .field("event_id", &self.event_id)
            .field("timestamp_ms", &self.timestamp_ms)
            .field("strategy", &self.strategy)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// Parses raw alert bytes into an [`OrderIntent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadValidator;

impl PayloadValidator {
    /// Parse and normalize one alert body.
    ///
    /// # Errors
    /// - `MalformedPayload`: not JSON, or not a JSON object
    /// - `SchemaViolation`: missing/mistyped field, unknown action,
    ///   non-numeric quantity, BUY without quantity
    pub fn parse(raw: &[u8]) -> ValidationResult<OrderIntent> {
        let value: serde_json::Value =
            serde_json::from_slice(raw).map_err(|_| ValidationError::MalformedPayload)?;
        if !value.is_object() {
            return Err(ValidationError::MalformedPayload);
        }

        let alert: RawAlert = serde_json::from_value(value)
            .map_err(|e| ValidationError::SchemaViolation(e.to_string()))?;

        let symbol = Symbol::new(&alert.symbol);
        if symbol.is_empty() {
            return Err(ValidationError::SchemaViolation(
                "symbol must not be empty".to_string(),
            ));
        }

        if !symbol.as_str().chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::SchemaViolation(format!(
                "symbol must be alphanumeric (got {:?})",
                symbol.as_str()
            )));
        }

        let action: OrderAction = alert
            .action
            .parse()
            .map_err(ValidationError::SchemaViolation)?;

        let quantity = match alert.qty {
            None | Some(serde_json::Value::Null) => None,
            Some(raw_qty) => Some(Quantity::from_json(&raw_qty).ok_or_else(|| {
                ValidationError::SchemaViolation(format!(
                    "qty must be a decimal number (got {raw_qty})"
                ))
            })?),
        };
        if quantity.is_none() && action == OrderAction::Buy {
            return Err(ValidationError::SchemaViolation(
                "qty is required".to_string(),
            ));
        }

        let timestamp_ms = match alert.ts {
            None => None,
            Some(raw_ts) => parse_timestamp(&raw_ts)?,
        };

        Ok(OrderIntent {
            symbol,
            action,
            quantity,
            order_type: alert
                .order_type
                .unwrap_or_else(|| MARKET_ORDER_TYPE.to_string()),
            event_id: alert.event_id.filter(|id| !id.is_empty()),
            timestamp_ms,
            strategy: alert.strategy,
            passphrase: alert.passphrase,
        })
    }
}

/// Milliseconds from a JSON `ts`. Zero and null mean "absent".
fn parse_timestamp(value: &serde_json::Value) -> ValidationResult<Option<i64>> {
    let ts = match value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match ts {
        Some(0) => Ok(None),
        Some(ts) => Ok(Some(ts)),
        None => Err(ValidationError::SchemaViolation(format!(
            "ts must be an integer (got {value})"
        ))),
    }
}
