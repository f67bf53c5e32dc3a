//! tvhook-server - HTTP surface for the webhook order service.
//!
//! # Routes
//!
//! ```text
//! POST /webhook  → OrderDispatcher::handle, JSON result
//! GET  /health   → {"ok": true}
//! GET  /version  → {"version": "<crate version>"}
//! GET  /metrics  → Prometheus text exposition
//! ```
//!
//! Every response carries `X-Request-ID` and `X-Response-Time-ms`.
//!
//! # Usage
//!
//! ```ignore
//! use tvhook_server::{run_server, AppState, ServerConfig};
//!
//! let state = AppState::new(Arc::new(dispatcher));
//! run_server(state, ServerConfig::default(), shutdown_signal()).await?;
//! ```

mod config;
mod error;
mod middleware;
mod response;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use middleware::{REQUEST_ID_HEADER, RESPONSE_TIME_HEADER};
pub use response::{ApiError, WebhookResponse};
pub use server::{create_router, run_server, AppState};
