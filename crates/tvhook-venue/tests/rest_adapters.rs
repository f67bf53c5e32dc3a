//! Adapters against an in-process mock venue.

use std::net::SocketAddr;

use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::post;
use axum::{Json, Router};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tvhook_auth::sign_body;
use tvhook_core::{Quantity, Symbol};
use tvhook_venue::{
    BinanceAdapter, BybitAdapter, ExchangeAdapter, ExchangeError, VenueConfig, VenueId,
};
use zeroize::Zeroizing;

const API_KEY: &str = "test-key";
const API_SECRET: &str = "test-secret";

async fn spawn_venue(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn venue_config(base_url: String) -> VenueConfig {
    VenueConfig {
        api_key: Some(API_KEY.to_string()),
        api_secret: Some(Zeroizing::new(API_SECRET.to_string())),
        base_url: Some(base_url),
        ..Default::default()
    }
}

/// Accepts orders only when the query signature verifies.
async fn binance_order(headers: HeaderMap, uri: Uri) -> (StatusCode, Json<Value>) {
    let query = uri.query().unwrap_or_default();
    let Some((unsigned, signature)) = query.rsplit_once("&signature=") else {
        return (StatusCode::BAD_REQUEST, Json(json!({"code": -1102, "msg": "no signature"})));
    };
    if headers.get("X-MBX-APIKEY").and_then(|v| v.to_str().ok()) != Some(API_KEY)
        || sign_body(API_SECRET, unsigned.as_bytes()) != signature
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"code": -1022, "msg": "Signature for this request is not valid."})),
        );
    }
    if unsigned.contains("symbol=DOGEUSDT") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": -2010, "msg": "Account has insufficient balance"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"orderId": 7, "status": "FILLED", "query": unsigned})),
    )
}

async fn bybit_order(headers: HeaderMap, body: String) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let payload = format!(
        "{}{}{}{}",
        header("X-BAPI-TIMESTAMP"),
        header("X-BAPI-API-KEY"),
        header("X-BAPI-RECV-WINDOW"),
        body
    );
    if sign_body(API_SECRET, payload.as_bytes()) != header("X-BAPI-SIGN") {
        return Json(json!({"retCode": 10004, "retMsg": "error sign!"}));
    }
    let order: Value = serde_json::from_str(&body).unwrap_or_default();
    Json(json!({"retCode": 0, "retMsg": "OK", "result": {"orderId": "b-1", "echo": order}}))
}

#[tokio::test]
async fn binance_signed_market_order_roundtrip() {
    let base = spawn_venue(Router::new().route("/api/v3/order", post(binance_order))).await;
    let adapter = BinanceAdapter::new(&venue_config(base)).unwrap();

    let receipt = adapter
        .create_market_buy(&Symbol::new("btcusdt"), Quantity::new(dec!(0.001)))
        .await
        .unwrap();

    let query = receipt.body()["query"].as_str().unwrap();
    assert!(query.starts_with("symbol=BTCUSDT&side=BUY&type=MARKET&quantity=0.001&recvWindow=5000"));
    assert_eq!(receipt.body()["status"], "FILLED");
}

#[tokio::test]
async fn binance_rejection_carries_venue_message() {
    let base = spawn_venue(Router::new().route("/api/v3/order", post(binance_order))).await;
    let adapter = BinanceAdapter::new(&venue_config(base)).unwrap();

    let err = adapter
        .create_market_sell(&Symbol::new("DOGEUSDT"), Quantity::new(dec!(10)))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ExchangeError::Rejected {
            venue: VenueId::Binance,
            message: "Account has insufficient balance".to_string(),
        }
    );
}

#[tokio::test]
async fn bybit_signed_market_order_roundtrip() {
    let base = spawn_venue(Router::new().route("/v5/order/create", post(bybit_order))).await;
    let adapter = BybitAdapter::new(&venue_config(base)).unwrap();

    let receipt = adapter
        .create_market_sell(&Symbol::new("ETHUSDT"), Quantity::new(dec!(0.25)))
        .await
        .unwrap();

    let echo = &receipt.body()["result"]["echo"];
    assert_eq!(echo["side"], "Sell");
    assert_eq!(echo["orderType"], "Market");
    assert_eq!(echo["qty"], "0.25");
}

#[tokio::test]
async fn bybit_bad_secret_is_rejected() {
    let base = spawn_venue(Router::new().route("/v5/order/create", post(bybit_order))).await;
    let config = VenueConfig {
        api_secret: Some(Zeroizing::new("wrong-secret".to_string())),
        ..venue_config(base)
    };
    let adapter = BybitAdapter::new(&config).unwrap();

    let err = adapter
        .create_market_buy(&Symbol::new("ETHUSDT"), Quantity::new(dec!(1)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "rejected");
    assert!(err.to_string().contains("error sign!"));
}

#[tokio::test]
async fn unreachable_venue_is_transport_error() {
    // Port 9 (discard) on localhost is closed in test environments.
    let adapter = BinanceAdapter::new(&venue_config("http://127.0.0.1:9".to_string())).unwrap();

    let err = adapter
        .create_market_buy(&Symbol::new("BTCUSDT"), Quantity::new(dec!(1)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "transport");
    assert_eq!(err.venue(), VenueId::Binance);
}
