//! Prometheus metrics for tvhook.
//!
//! - Webhook outcomes (placed, dry run, duplicate, and each failure class)
//! - Venue order results by venue, action and status
//! - Venue call latency
//! - Idempotency store occupancy
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, which should crash at first use rather than
//! silently drop data. These panics only occur during static initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge, CounterVec, Encoder,
    HistogramVec, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Webhook requests by final outcome.
/// Labels: outcome (placed/dry_run/duplicate/unauthorized/invalid/routing_failed/exchange_failed)
pub static WEBHOOK_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tvhook_webhook_requests_total",
        "Total webhook requests by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Venue order attempts.
pub static VENUE_ORDERS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tvhook_venue_orders_total",
        "Total venue order attempts",
        &["venue", "action", "status"]
    )
    .unwrap()
});

/// Venue call latency in milliseconds.
pub static VENUE_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "tvhook_venue_latency_ms",
        "Venue order call latency in milliseconds",
        &["venue"],
        vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Live idempotency entries after the last check.
pub static IDEMPOTENCY_ENTRIES: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "tvhook_idempotency_entries",
        "Idempotency keys currently remembered"
    )
    .unwrap()
});

/// Dry-run mode (1 = no venue calls).
pub static DRY_RUN: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("tvhook_dry_run", "Dry-run mode (1=enabled)").unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record the final outcome of one webhook request.
    pub fn webhook_outcome(outcome: &str) {
        WEBHOOK_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record a venue order attempt.
    pub fn venue_order(venue: &str, action: &str, status: &str) {
        VENUE_ORDERS_TOTAL
            .with_label_values(&[venue, action, status])
            .inc();
    }

    /// Record venue call latency.
    pub fn venue_latency(venue: &str, latency_ms: f64) {
        VENUE_LATENCY_MS
            .with_label_values(&[venue])
            .observe(latency_ms);
    }

    pub fn idempotency_entries(count: usize) {
        IDEMPOTENCY_ENTRIES.set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn set_dry_run(enabled: bool) {
        DRY_RUN.set(i64::from(enabled));
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
