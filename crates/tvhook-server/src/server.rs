//! HTTP server implementation using axum.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::{middleware, Extension, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use tvhook_auth::SIGNATURE_HEADER;
use tvhook_dispatch::{OrderDispatcher, RequestContext};
use tvhook_telemetry::Metrics;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::middleware::request_context;
use crate::response::{ApiError, WebhookResponse};

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<OrderDispatcher>,
}

impl AppState {
    #[must_use]
    pub fn new(dispatcher: Arc<OrderDispatcher>) -> Self {
        Self { dispatcher }
    }
}

/// Create the axum router.
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_context))
}

/// Handle one alert delivery.
async fn webhook(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    match state.dispatcher.handle(&ctx, &body, signature).await {
        Ok(outcome) => Ok(Json(WebhookResponse::from_outcome(
            outcome,
            ctx.request_id(),
        ))),
        Err(e) => Err(ApiError::new(e, ctx.request_id())),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn version() -> Json<serde_json::Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

/// Prometheus text exposition.
async fn metrics() -> Response {
    match Metrics::render() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Run the HTTP server until `shutdown` resolves.
pub async fn run_server(
    state: AppState,
    config: ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> ServerResult<()> {
    let addr = config.socket_addr()?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Starting webhook server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Webhook server stopped");
    Ok(())
}
