//! Prometheus metrics and structured logging for tvhook.
//!
//! - Structured logging with tracing (JSON by default)
//! - Prometheus counters and histograms for webhook outcomes and venue calls
//! - Text exposition for the `/metrics` endpoint

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LoggingConfig};
pub use metrics::Metrics;
