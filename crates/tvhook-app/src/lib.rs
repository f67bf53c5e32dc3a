//! tvhook - TradingView webhook to market order service.
//!
//! Loads [`AppConfig`], wires the dispatcher, venue adapters and HTTP
//! server together in [`Application`], and serves until shutdown.

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, AuthConfig, IdempotencyConfig};
pub use error::{AppError, AppResult};
