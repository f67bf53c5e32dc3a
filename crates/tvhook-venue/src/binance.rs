//! Binance spot REST adapter.
//!
//! `POST /api/v3/order` with the order parameters in a signed query string
//! and the API key in the `X-MBX-APIKEY` header.

use reqwest::Client;
use tracing::{debug, warn};
use tvhook_auth::sign_body;
use tvhook_core::{OrderSide, Quantity, Symbol};

use crate::adapter::{BoxFuture, ExchangeAdapter, OrderReceipt};
use crate::config::{VenueConfig, VenueCredentials};
use crate::error::{ExchangeError, ExchangeResult};
use crate::venue::VenueId;

/// Production REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

const ORDER_PATH: &str = "/api/v3/order";
const API_KEY_HEADER: &str = "X-MBX-APIKEY";

struct BinanceClient {
    http: Client,
    credentials: VenueCredentials,
}

/// Binance spot market order adapter.
pub struct BinanceAdapter {
    /// None when credentials are not configured.
    client: Option<BinanceClient>,
    base_url: String,
    recv_window_ms: u64,
}

impl BinanceAdapter {
    pub fn new(config: &VenueConfig) -> ExchangeResult<Self> {
        let client = match config.credentials() {
            Some(credentials) => {
                let http = Client::builder()
                    .timeout(config.timeout())
                    .build()
                    .map_err(|e| ExchangeError::Transport {
                        venue: VenueId::Binance,
                        message: format!("Failed to create HTTP client: {e}"),
                    })?;
                Some(BinanceClient { http, credentials })
            }
            None => None,
        };

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            recv_window_ms: config.recv_window_ms,
        })
    }

    async fn place_market_order(
        &self,
        side: OrderSide,
        symbol: Symbol,
        quantity: Quantity,
    ) -> ExchangeResult<OrderReceipt> {
        let client = self
            .client
            .as_ref()
            .ok_or(ExchangeError::MissingCredentials {
                venue: VenueId::Binance,
            })?;

        let params = order_params(
            &symbol,
            side,
            quantity,
            self.recv_window_ms,
            chrono::Utc::now().timestamp_millis(),
        );
        let query = signed_query(client.credentials.api_secret(), &params);
        let url = format!("{}{ORDER_PATH}?{query}", self.base_url.trim_end_matches('/'));

        debug!(symbol = %symbol, side = %side, qty = %quantity, "Sending Binance market order");

        let response = client
            .http
            .post(&url)
            .header(API_KEY_HEADER, client.credentials.api_key())
            .send()
            .await
            .map_err(|e| ExchangeError::Transport {
                venue: VenueId::Binance,
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ExchangeError::Transport {
            venue: VenueId::Binance,
            message: format!("Failed to read response: {e}"),
        })?;

        interpret_response(status, &body)
    }
}

impl ExchangeAdapter for BinanceAdapter {
    fn venue(&self) -> VenueId {
        VenueId::Binance
    }

    fn has_credentials(&self) -> bool {
        self.client.is_some()
    }

    fn create_market_buy(
        &self,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> BoxFuture<'_, ExchangeResult<OrderReceipt>> {
        Box::pin(self.place_market_order(OrderSide::Buy, symbol.clone(), quantity))
    }

    fn create_market_sell(
        &self,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> BoxFuture<'_, ExchangeResult<OrderReceipt>> {
        Box::pin(self.place_market_order(OrderSide::Sell, symbol.clone(), quantity))
    }
}

fn side_param(side: OrderSide) -> &'static str {
    match side {
        OrderSide::Buy => "BUY",
        OrderSide::Sell => "SELL",
    }
}

/// Unsigned order parameters in the order Binance documents them.
pub(crate) fn order_params(
    symbol: &Symbol,
    side: OrderSide,
    quantity: Quantity,
    recv_window_ms: u64,
    timestamp_ms: i64,
) -> Vec<(&'static str, String)> {
    vec![
        ("symbol", symbol.as_str().to_string()),
        ("side", side_param(side).to_string()),
        ("type", "MARKET".to_string()),
        ("quantity", quantity.to_string()),
        ("recvWindow", recv_window_ms.to_string()),
        ("timestamp", timestamp_ms.to_string()),
    ]
}

/// Join parameters and append `signature` (hex HMAC-SHA256 of the query).
///
/// Values are not percent-encoded. Symbols reaching here are ASCII
/// alphanumeric (enforced by `PayloadValidator`); the rest are digits,
/// decimals and fixed enum strings.
pub(crate) fn signed_query(secret: &str, params: &[(&str, String)]) -> String {
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let signature = sign_body(secret, query.as_bytes());
    format!("{query}&signature={signature}")
}

/// Map an HTTP status and body to a receipt or a venue rejection.
pub(crate) fn interpret_response(status: u16, body: &str) -> ExchangeResult<OrderReceipt> {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .as_ref()
            .and_then(|v| v.get("msg"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}: {body}"));
        warn!(status, message = %message, "Binance rejected order");
        return Err(ExchangeError::Rejected {
            venue: VenueId::Binance,
            message,
        });
    }

    parsed
        .map(OrderReceipt::new)
        .ok_or_else(|| ExchangeError::Transport {
            venue: VenueId::Binance,
            message: format!("Failed to parse response: {body}"),
        })
}
