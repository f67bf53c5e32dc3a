//! Bybit v5 spot REST adapter.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};
use tvhook_auth::sign_body;
use tvhook_core::{OrderSide, Quantity, Symbol};

use crate::adapter::{BoxFuture, ExchangeAdapter, OrderReceipt};
use crate::config::{VenueConfig, VenueCredentials};
use crate::error::{ExchangeError, ExchangeResult};
use crate::venue::VenueId;

/// Production REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.bybit.com";

const ORDER_PATH: &str = "/v5/order/create";

/// Request body for `/v5/order/create`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest<'a> {
    category: &'static str,
    symbol: &'a str,
    side: &'static str,
    order_type: &'static str,
    qty: String,
}

struct BybitClient {
    http: Client,
    credentials: VenueCredentials,
}

/// Bybit spot market order adapter.
pub struct BybitAdapter {
    client: Option<BybitClient>,
    base_url: String,
    recv_window_ms: u64,
}

impl BybitAdapter {
    pub fn new(config: &VenueConfig) -> ExchangeResult<Self> {
        let client = match config.credentials() {
            Some(credentials) => {
                let http = Client::builder()
                    .timeout(config.timeout())
                    .build()
                    .map_err(|e| ExchangeError::Transport {
                        venue: VenueId::Bybit,
                        message: format!("Failed to create HTTP client: {e}"),
                    })?;
                Some(BybitClient { http, credentials })
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
                venue: VenueId::Bybit,
            })?;

        let body = order_body(&symbol, side, quantity)?;
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        let recv_window = self.recv_window_ms.to_string();
        let signature = request_signature(
            client.credentials.api_secret(),
            &timestamp,
            client.credentials.api_key(),
            &recv_window,
            &body,
        );
        let url = format!("{}{ORDER_PATH}", self.base_url.trim_end_matches('/'));

        debug!(symbol = %symbol, side = %side, qty = %quantity, "Sending Bybit market order");

        let response = client
            .http
            .post(&url)
            .header("X-BAPI-API-KEY", client.credentials.api_key())
            .header("X-BAPI-TIMESTAMP", &timestamp)
            .header("X-BAPI-RECV-WINDOW", &recv_window)
            .header("X-BAPI-SIGN", signature)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport {
                venue: VenueId::Bybit,
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ExchangeError::Transport {
            venue: VenueId::Bybit,
            message: format!("Failed to read response: {e}"),
        })?;

        interpret_response(status, &body)
    }
}

impl ExchangeAdapter for BybitAdapter {
    fn venue(&self) -> VenueId {
        VenueId::Bybit
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

/// Serialized JSON body. The exact bytes are signed, so the body is built once.
pub(crate) fn order_body(
    symbol: &Symbol,
    side: OrderSide,
    quantity: Quantity,
) -> ExchangeResult<String> {
    let request = CreateOrderRequest {
        category: "spot",
        symbol: symbol.as_str(),
        side: match side {
            OrderSide::Buy => "Buy",
            OrderSide::Sell => "Sell",
        },
        order_type: "Market",
        qty: quantity.to_string(),
    };
    serde_json::to_string(&request).map_err(|e| ExchangeError::Transport {
        venue: VenueId::Bybit,
        message: format!("Failed to encode request: {e}"),
    })
}

/// `X-BAPI-SIGN`: hex HMAC-SHA256 of `timestamp + api_key + recv_window + body`.
pub(crate) fn request_signature(
    secret: &str,
    timestamp: &str,
    api_key: &str,
    recv_window: &str,
    body: &str,
) -> String {
    let payload = format!("{timestamp}{api_key}{recv_window}{body}");
    sign_body(secret, payload.as_bytes())
}

/// Bybit answers HTTP 200 for most business errors; `retCode` decides.
pub(crate) fn interpret_response(status: u16, body: &str) -> ExchangeResult<OrderReceipt> {
    let parsed: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !(200..300).contains(&status) => {
            return Err(ExchangeError::Rejected {
                venue: VenueId::Bybit,
                message: format!("HTTP {status}: {body}"),
            });
        }
        Err(e) => {
            return Err(ExchangeError::Transport {
                venue: VenueId::Bybit,
                message: format!("Failed to parse response: {e}"),
            });
        }
    };

    let ret_code = parsed.get("retCode").and_then(|c| c.as_i64());
    if !(200..300).contains(&status) || ret_code != Some(0) {
        let message = parsed
            .get("retMsg")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}: {body}"));
        warn!(status, ret_code, message = %message, "Bybit rejected order");
        return Err(ExchangeError::Rejected {
            venue: VenueId::Bybit,
            message,
        });
    }

    Ok(OrderReceipt::new(parsed))
}
