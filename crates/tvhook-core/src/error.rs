//! Error types for tvhook-core.

use thiserror::Error;

/// Alert payload validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Body is not well-formed JSON, or not a JSON object.
    #[error("Invalid JSON payload")]
    MalformedPayload,

    /// Body is JSON but a field is missing, mistyped or out of range.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// `type` is present and is not MARKET.
    #[error("Only MARKET orders supported")]
    UnsupportedOrderType(String),

    /// CLOSE alert without a quantity.
    #[error("qty is required for CLOSE action")]
    MissingQuantity,
}

/// Result type alias for validation.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
