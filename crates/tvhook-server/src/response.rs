//! Webhook response bodies and error → status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tvhook_core::ValidationError;
use tvhook_dispatch::{DispatchError, DispatchOutcome};
use tvhook_venue::VenueId;

/// Successful webhook body. Exactly one of `duplicate`, `dry_run` or
/// `result` is present.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    pub exchange: VenueId,
    pub request_id: String,
}

impl WebhookResponse {
    #[must_use]
    pub fn from_outcome(outcome: DispatchOutcome, request_id: &str) -> Self {
        let mut response = Self {
            ok: true,
            duplicate: None,
            dry_run: None,
            result: None,
            exchange: outcome.venue(),
            request_id: request_id.to_string(),
        };
        match outcome {
            DispatchOutcome::Duplicate { .. } => response.duplicate = Some(true),
            DispatchOutcome::DryRun { .. } => response.dry_run = Some(true),
            DispatchOutcome::Placed { receipt, .. } => response.result = Some(receipt.into_body()),
        }
        response
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    ok: bool,
    detail: &'a str,
    request_id: &'a str,
}

/// Dispatch failure rendered as a terse JSON error.
#[derive(Debug)]
pub struct ApiError {
    pub error: DispatchError,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: DispatchError, request_id: &str) -> Self {
        Self {
            error,
            request_id: request_id.to_string(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.error {
            DispatchError::Auth(_) => StatusCode::UNAUTHORIZED,
            DispatchError::Validation(ValidationError::SchemaViolation(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
            DispatchError::Routing(_) | DispatchError::Exchange { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // DispatchError's Display never includes venue error text.
        let detail = self.error.to_string();
        let body = ErrorBody {
            ok: false,
            detail: &detail,
            request_id: &self.request_id,
        };
        (self.status(), Json(body)).into_response()
    }
}
