//! Venue capability trait.
//!
//! Provides a trait-based abstraction over "place a market order at a venue".
//! This allows for:
//! - Routing by venue name instead of runtime type inspection
//! - Dependency injection for testing
//! - Adding venues without touching the dispatcher

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tvhook_core::{OrderSide, Quantity, Symbol};

use crate::error::ExchangeResult;
use crate::venue::VenueId;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Venue acknowledgement, passed through to the webhook caller as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderReceipt(serde_json::Value);

impl OrderReceipt {
    #[must_use]
    pub fn new(body: serde_json::Value) -> Self {
        Self(body)
    }

    #[must_use]
    pub fn body(&self) -> &serde_json::Value {
        &self.0
    }

    #[must_use]
    pub fn into_body(self) -> serde_json::Value {
        self.0
    }
}

/// Market order capability of one venue.
pub trait ExchangeAdapter: Send + Sync {
    /// Venue this adapter trades on.
    fn venue(&self) -> VenueId;

    /// Whether a venue client exists. Without one every call fails
    /// with `MissingCredentials`.
    fn has_credentials(&self) -> bool;

    /// Immediate market buy.
    fn create_market_buy(
        &self,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> BoxFuture<'_, ExchangeResult<OrderReceipt>>;

    /// Immediate market sell.
    fn create_market_sell(
        &self,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> BoxFuture<'_, ExchangeResult<OrderReceipt>>;
}

/// Arc wrapper for ExchangeAdapter trait objects.
pub type DynExchangeAdapter = Arc<dyn ExchangeAdapter>;

/// One recorded call on [`MockExchangeAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub side: OrderSide,
    pub symbol: Symbol,
    pub quantity: Quantity,
}

/// Mock adapter for testing.
#[derive(Debug)]
pub struct MockExchangeAdapter {
    venue: VenueId,
    /// Recorded calls for verification.
    calls: Mutex<Vec<MockCall>>,
    /// Result returned by every call.
    next_result: Mutex<ExchangeResult<OrderReceipt>>,
    /// Artificial latency before answering.
    delay: Mutex<Option<Duration>>,
}

impl MockExchangeAdapter {
    /// Create a mock that acknowledges every order.
    #[must_use]
    pub fn new(venue: VenueId) -> Self {
        Self {
            venue,
            calls: Mutex::new(Vec::new()),
            next_result: Mutex::new(Ok(OrderReceipt::new(serde_json::json!({
                "status": "FILLED",
                "venue": venue.as_str(),
            })))),
            delay: Mutex::new(None),
        }
    }

    /// Set the result returned by subsequent calls.
    pub fn set_next_result(&self, result: ExchangeResult<OrderReceipt>) {
        *self.next_result.lock() = result;
    }

    /// Delay every answer (for timeout tests).
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Get recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn respond(
        &self,
        side: OrderSide,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> BoxFuture<'_, ExchangeResult<OrderReceipt>> {
        self.calls.lock().push(MockCall {
            side,
            symbol: symbol.clone(),
            quantity,
        });
        let delay = *self.delay.lock();
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.next_result.lock().clone()
        })
    }
}

impl ExchangeAdapter for MockExchangeAdapter {
    fn venue(&self) -> VenueId {
        self.venue
    }

    fn has_credentials(&self) -> bool {
        true
    }

    fn create_market_buy(
        &self,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> BoxFuture<'_, ExchangeResult<OrderReceipt>> {
        self.respond(OrderSide::Buy, symbol, quantity)
    }

    fn create_market_sell(
        &self,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> BoxFuture<'_, ExchangeResult<OrderReceipt>> {
        self.respond(OrderSide::Sell, symbol, quantity)
    }
}
