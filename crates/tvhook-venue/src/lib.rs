//! Trading venue adapters and routing for tvhook.
//!
//! # Key Components
//!
//! - [`ExchangeAdapter`]: Market buy/sell capability, one implementation per venue
//! - [`BinanceAdapter`], [`BybitAdapter`]: Signed REST clients for spot market orders
//! - [`MockExchangeAdapter`]: Recording adapter for tests and local runs
//! - [`ExchangeRouter`]: Symbol -> venue resolution with a default fallback
//!
//! Every venue failure surfaces as [`ExchangeError`], attributed to the venue.
//! Callers never see HTTP client or venue-specific error types.

pub mod adapter;
pub mod binance;
pub mod bybit;
pub mod config;
pub mod error;
pub mod router;
pub mod venue;

pub use adapter::{
    BoxFuture, DynExchangeAdapter, ExchangeAdapter, MockCall, MockExchangeAdapter, OrderReceipt,
};
pub use binance::BinanceAdapter;
pub use bybit::BybitAdapter;
pub use config::{VenueConfig, VenueCredentials};
pub use error::{ExchangeError, ExchangeResult, RoutingError, RoutingResult};
pub use router::{ExchangeRouter, RoutingConfig, VenueRoute};
pub use venue::VenueId;
