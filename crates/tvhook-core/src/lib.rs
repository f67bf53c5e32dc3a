//! Core domain types for the tvhook webhook service.
//!
//! This crate provides the types every other crate speaks:
//! - `OrderIntent`: Canonical, immutable form of one inbound alert
//! - `Symbol`, `Quantity`: Normalized symbol and exact-decimal size
//! - `OrderAction`: The two supported alert actions (BUY, CLOSE)
//! - `PayloadValidator`: Raw bytes -> `OrderIntent`

pub mod decimal;
pub mod error;
pub mod intent;
pub mod order;

pub use decimal::Quantity;
pub use error::{ValidationError, ValidationResult};
pub use intent::{OrderIntent, PayloadValidator};
pub use order::{OrderAction, OrderSide, Symbol, MARKET_ORDER_TYPE};
