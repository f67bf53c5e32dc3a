//! End-to-end tests of the HTTP surface, driven in-process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tvhook_auth::{sign_body, AuthGate};
use tvhook_dispatch::OrderDispatcher;
use tvhook_idempotency::IdempotencyStore;
use tvhook_server::{create_router, AppState};
use tvhook_venue::{
    ExchangeError, ExchangeRouter, MockExchangeAdapter, OrderReceipt, RoutingConfig, VenueId,
};

const PASSPHRASE: &str = "tv-pass";
const SECRET: &str = "whsec";

struct TestApp {
    router: Router,
    binance: Arc<MockExchangeAdapter>,
    bybit: Arc<MockExchangeAdapter>,
}

fn test_app(dry_run: bool, hmac_secret: Option<&str>) -> TestApp {
    let binance = Arc::new(MockExchangeAdapter::new(VenueId::Binance));
    let bybit = Arc::new(MockExchangeAdapter::new(VenueId::Bybit));
    let routing = RoutingConfig {
        default_venue: VenueId::Binance,
        symbol_map: HashMap::from([("ETHUSDT".to_string(), VenueId::Bybit)]),
    };
    let exchange_router = ExchangeRouter::new(&routing)
        .with_adapter(binance.clone())
        .with_adapter(bybit.clone());
    let dispatcher = OrderDispatcher::new(
        AuthGate::new(PASSPHRASE, hmac_secret.map(str::to_string)),
        Arc::new(IdempotencyStore::new(Duration::from_secs(60), 512)),
        Arc::new(exchange_router),
        dry_run,
        Duration::from_secs(2),
    );

    TestApp {
        router: create_router(AppState::new(Arc::new(dispatcher))),
        binance,
        bybit,
    }
}

fn alert(extra: Value) -> Vec<u8> {
    let mut body = json!({
        "passphrase": PASSPHRASE,
        "symbol": "BTCUSDT",
        "action": "BUY",
        "qty": "0.001",
        "type": "MARKET",
    });
    if let (Some(base), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    serde_json::to_vec(&body).unwrap()
}

async fn post_webhook(app: &TestApp, body: Vec<u8>, signature: Option<String>) -> Response {
    let mut request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        request = request.header("X-Signature", signature);
    }
    app.router
        .clone()
        .oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_and_version() {
    let app = test_app(true, None);

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-Request-ID"));
    assert!(response.headers().contains_key("X-Response-Time-ms"));
    assert_eq!(json_body(response).await, json!({"ok": true}));

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(json_body(response).await["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = test_app(true, None);
    let request = Request::post("/webhook")
        .header("X-Request-ID", "corr-42")
        .body(Body::from(alert(json!({"event_id": "rid-1"}))))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.headers()["X-Request-ID"], "corr-42");
    assert_eq!(json_body(response).await["request_id"], "corr-42");
}

#[tokio::test]
async fn dry_run_makes_no_venue_call() {
    let app = test_app(true, None);

    let response = post_webhook(&app, alert(json!({"event_id": "dry-1"})), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["dry_run"], true);
    assert_eq!(body["exchange"], "binance");
    assert_eq!(app.binance.call_count(), 0);
    assert_eq!(app.bybit.call_count(), 0);
}

#[tokio::test]
async fn live_order_returns_receipt() {
    let app = test_app(false, None);
    app.binance
        .set_next_result(Ok(OrderReceipt::new(json!({"orderId": 99}))));

    let response = post_webhook(&app, alert(json!({"event_id": "live-1"})), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["result"], json!({"orderId": 99}));
    assert!(body.get("duplicate").is_none());
    assert_eq!(app.binance.call_count(), 1);
}

#[tokio::test]
async fn replay_after_failure_is_duplicate() {
    let app = test_app(false, None);
    app.binance.set_next_result(Err(ExchangeError::Rejected {
        venue: VenueId::Binance,
        message: "secret account detail".to_string(),
    }));
    let body = alert(json!({"event_id": "evt-dup"}));

    let first = post_webhook(&app, body.clone(), None).await;
    assert_eq!(first.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let first = json_body(first).await;
    assert_eq!(first["ok"], false);
    assert_eq!(first["detail"], "Exchange order failed");
    assert!(!first.to_string().contains("secret account detail"));

    let second = post_webhook(&app, body, None).await;
    assert_eq!(second.status(), StatusCode::OK);
    let second = json_body(second).await;
    assert_eq!(second["duplicate"], true);
    assert_eq!(second["exchange"], "binance");
    assert_eq!(app.binance.call_count(), 1);
}

#[tokio::test]
async fn signature_is_enforced_when_configured() {
    let app = test_app(true, Some(SECRET));
    let body = alert(json!({"event_id": "sig-1"}));

    let missing = post_webhook(&app, body.clone(), None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(missing).await["detail"], "Missing signature");

    let mut tampered = body.clone();
    tampered.push(b' ');
    let invalid = post_webhook(&app, tampered, Some(sign_body(SECRET, &body))).await;
    assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(invalid).await["detail"], "Invalid signature");

    let valid = post_webhook(&app, body.clone(), Some(sign_body(SECRET, &body))).await;
    assert_eq!(valid.status(), StatusCode::OK);
}

#[tokio::test]
async fn status_codes_follow_check_order() {
    let app = test_app(true, None);

    let malformed = post_webhook(&app, b"{not json".to_vec(), None).await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(malformed).await["detail"], "Invalid JSON payload");

    let schema = post_webhook(&app, alert(json!({"action": "SHORT"})), None).await;
    assert_eq!(schema.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let wrong_pass = post_webhook(&app, alert(json!({"passphrase": "nope"})), None).await;
    assert_eq!(wrong_pass.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(wrong_pass).await["detail"], "Unauthorized");

    let limit = post_webhook(&app, alert(json!({"type": "LIMIT"})), None).await;
    assert_eq!(limit.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(limit).await["detail"], "Only MARKET orders supported");

    let close = post_webhook(
        &app,
        alert(json!({"action": "CLOSE", "qty": null})),
        None,
    )
    .await;
    assert_eq!(close.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(close).await["detail"],
        "qty is required for CLOSE action"
    );
}

#[tokio::test]
async fn symbol_override_routes_to_bybit() {
    let app = test_app(false, None);

    let response = post_webhook(
        &app,
        alert(json!({"symbol": "ethusdt", "action": "close", "event_id": "route-1"})),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["exchange"], "bybit");
    assert_eq!(app.bybit.call_count(), 1);
    assert_eq!(app.binance.call_count(), 0);
}

#[tokio::test]
async fn metrics_endpoint_renders_text() {
    let app = test_app(true, None);
    post_webhook(&app, alert(json!({"event_id": "m-1"})), None).await;

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("tvhook_webhook_requests_total"));
}
