//! Main application orchestration.
//!
//! Builds, from one immutable [`AppConfig`]:
//! - Venue adapters (Binance, Bybit) and the routing table
//! - The idempotency store
//! - The order dispatcher
//! - The HTTP server state

use std::sync::Arc;

use tracing::{error, info, warn};
use tvhook_auth::AuthGate;
use tvhook_dispatch::OrderDispatcher;
use tvhook_idempotency::IdempotencyStore;
use tvhook_server::{run_server, AppState};
use tvhook_telemetry::Metrics;
use tvhook_venue::{BinanceAdapter, BybitAdapter, DynExchangeAdapter, ExchangeRouter};

use crate::config::AppConfig;
use crate::error::AppResult;

/// Main application.
pub struct Application {
    config: AppConfig,
    dispatcher: Arc<OrderDispatcher>,
}

impl Application {
    /// Wire every component. Performs no I/O.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let adapters: [DynExchangeAdapter; 2] = [
            Arc::new(BinanceAdapter::new(&config.binance)?),
            Arc::new(BybitAdapter::new(&config.bybit)?),
        ];

        let mut router = ExchangeRouter::new(&config.routing);
        for adapter in adapters {
            if !adapter.has_credentials() && !config.dry_run {
                warn!(
                    exchange = %adapter.venue(),
                    "No API credentials configured; orders routed here will fail"
                );
            }
            router.register(adapter);
        }

        let store = IdempotencyStore::new(config.idempotency.ttl(), config.idempotency.capacity);
        let auth = AuthGate::new(
            config.auth.passphrase.clone(),
            config.auth.hmac_secret.clone(),
        );

        let dispatcher = OrderDispatcher::new(
            auth,
            Arc::new(store),
            Arc::new(router),
            config.dry_run,
            config.venue_timeout(),
        );
        Metrics::set_dry_run(config.dry_run);

        Ok(Self {
            config,
            dispatcher: Arc::new(dispatcher),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// HTTP server state backed by this application's dispatcher.
    #[must_use]
    pub fn state(&self) -> AppState {
        AppState::new(self.dispatcher.clone())
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        info!(
            app_name = %self.config.app_name,
            dry_run = self.config.dry_run,
            default_exchange = %self.config.routing.default_venue,
            symbol_overrides = self.config.routing.symbol_map.len(),
            hmac_enabled = self.config.auth.hmac_enabled(),
            idempotency_ttl_s = self.config.idempotency.ttl_seconds,
            idempotency_capacity = self.config.idempotency.capacity,
            "Application starting"
        );
        if !self.config.dry_run {
            warn!("Live mode: webhook alerts will place real orders");
        }

        run_server(self.state(), self.config.server.clone(), shutdown_signal()).await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
    }
}
