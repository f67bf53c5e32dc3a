//! Webhook order dispatcher.
//!
//! # Check Order (Strict)
//!
//! 1. Signature (when a secret is configured) → Auth(MissingSignature | InvalidSignature)
//! 2. JSON syntax                              → Validation(MalformedPayload)
//! 3. Schema                                   → Validation(SchemaViolation)
//! 4. Passphrase                               → Auth(Unauthorized)
//! 5. Order type is MARKET                     → Validation(UnsupportedOrderType)
//! 6. CLOSE carries a quantity                 → Validation(MissingQuantity)
//! 7. Route symbol to a registered venue       → Routing(UnknownVenue)
//! 8. check_and_mark idempotency key           → Ok(Duplicate)
//! 9. Dry-run                                  → Ok(DryRun)
//! 10. Venue call (bounded by timeout)         → Ok(Placed) | Exchange
//!
//! Routing is resolved before the key is marked so that a routing failure
//! does not consume the key. Once marked, a key stays marked even if the
//! venue call fails: a replay is reported as a duplicate, never re-sent.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use tvhook_auth::AuthGate;
use tvhook_core::{OrderAction, PayloadValidator, Quantity, Symbol};
use tvhook_idempotency::{Clock, IdempotencyKey, IdempotencyStore, SystemClock};
use tvhook_telemetry::Metrics;
use tvhook_venue::{ExchangeError, ExchangeResult, ExchangeRouter, OrderReceipt, VenueRoute};

use crate::context::RequestContext;
use crate::error::{DispatchError, DispatchResult};
use crate::state::{DispatchOutcome, DispatchState};

/// End-to-end webhook decision. Shared across requests behind an `Arc`.
pub struct OrderDispatcher<C: Clock = SystemClock> {
    auth: AuthGate,
    store: Arc<IdempotencyStore<C>>,
    router: Arc<ExchangeRouter>,
    dry_run: bool,
    venue_timeout: Duration,
}

impl<C: Clock> OrderDispatcher<C> {
    pub fn new(
        auth: AuthGate,
        store: Arc<IdempotencyStore<C>>,
        router: Arc<ExchangeRouter>,
        dry_run: bool,
        venue_timeout: Duration,
    ) -> Self {
        Self {
            auth,
            store,
            router,
            dry_run,
            venue_timeout,
        }
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    #[must_use]
    pub fn router(&self) -> &ExchangeRouter {
        &self.router
    }

    #[must_use]
    pub fn store(&self) -> &IdempotencyStore<C> {
        &self.store
    }

    /// Process one webhook delivery.
    ///
    /// `raw_body` must be the exact bytes received; the signature covers them.
    pub async fn handle(
        &self,
        ctx: &RequestContext,
        raw_body: &[u8],
        signature: Option<&str>,
    ) -> DispatchResult<DispatchOutcome> {
        let result = self.run(ctx, raw_body, signature).await;
        match &result {
            Ok(outcome) => {
                debug!(request_id = %ctx.request_id(), state = outcome.state().as_str(), "Dispatch finished");
                Metrics::webhook_outcome(outcome.label());
            }
            Err(e) => {
                debug!(
                    request_id = %ctx.request_id(),
                    failed_after = e.failed_after().as_str(),
                    error = %e,
                    "Dispatch rejected"
                );
                Metrics::webhook_outcome(e.label());
            }
        }
        result
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        raw_body: &[u8],
        signature: Option<&str>,
    ) -> DispatchResult<DispatchOutcome> {
        let request_id = ctx.request_id();

        self.auth.verify_signature(raw_body, signature)?;
        let intent = PayloadValidator::parse(raw_body)?;
        self.auth.verify_passphrase(intent.passphrase())?;
        transition(ctx, DispatchState::Authenticated);

        let quantity = intent.validate_order()?;
        transition(ctx, DispatchState::Validated);

        let route = self.router.resolve(intent.symbol())?;
        let venue = route.venue;

        let key = IdempotencyKey::derive(&intent, self.store.now_ms());
        let duplicate = self.store.check_and_mark(&key);
        Metrics::idempotency_entries(self.store.len());
        if duplicate {
            info!(
                request_id,
                symbol = %intent.symbol(),
                action = %intent.action(),
                exchange = %venue,
                "Duplicate event skipped"
            );
            return Ok(DispatchOutcome::Duplicate { venue });
        }
        transition(ctx, DispatchState::Routed);

        if self.dry_run {
            info!(
                request_id,
                symbol = %intent.symbol(),
                action = %intent.action(),
                exchange = %venue,
                status = "dry_run",
                "DRY_RUN: order not sent"
            );
            return Ok(DispatchOutcome::DryRun { venue });
        }
        transition(ctx, DispatchState::Dispatched);

        match self
            .execute(&route, intent.action(), intent.symbol(), quantity)
            .await
        {
            Ok(receipt) => {
                transition(ctx, DispatchState::Succeeded);
                info!(
                    request_id,
                    symbol = %intent.symbol(),
                    action = %intent.action(),
                    qty = %quantity,
                    exchange = %venue,
                    status = "sent",
                    "Order placed"
                );
                Ok(DispatchOutcome::Placed { venue, receipt })
            }
            Err(source) => {
                transition(ctx, DispatchState::Failed);
                error!(
                    request_id,
                    symbol = %intent.symbol(),
                    action = %intent.action(),
                    exchange = %venue,
                    status = "error",
                    error_code = source.code(),
                    error = %source,
                    "Order failed"
                );
                Err(DispatchError::Exchange { venue, source })
            }
        }
    }

    /// BUY is a market buy; CLOSE exits a long position with a market sell.
    async fn execute(
        &self,
        route: &VenueRoute,
        action: OrderAction,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> ExchangeResult<OrderReceipt> {
        let started = Instant::now();
        let call = match action {
            OrderAction::Buy => route.adapter.create_market_buy(symbol, quantity),
            OrderAction::Close => route.adapter.create_market_sell(symbol, quantity),
        };

        let result = match tokio::time::timeout(self.venue_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ExchangeError::Timeout {
                venue: route.venue,
                timeout_ms: u64::try_from(self.venue_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };

        let status = match &result {
            Ok(_) => "ok",
            Err(e) => e.code(),
        };
        Metrics::venue_latency(route.venue.as_str(), started.elapsed().as_secs_f64() * 1000.0);
        Metrics::venue_order(route.venue.as_str(), action.as_str(), status);

        result
    }
}

fn transition(ctx: &RequestContext, state: DispatchState) {
    debug!(
        request_id = %ctx.request_id(),
        state = state.as_str(),
        terminal = state.is_terminal(),
        "Dispatch state"
    );
}
