//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exchange error: {0}")]
    Exchange(#[from] tvhook_venue::ExchangeError),

    #[error("Server error: {0}")]
    Server(#[from] tvhook_server::ServerError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] tvhook_telemetry::TelemetryError),
}

pub type AppResult<T> = Result<T, AppError>;
