//! Dispatch error types.

use thiserror::Error;
use tvhook_auth::AuthError;
use tvhook_core::ValidationError;
use tvhook_venue::{ExchangeError, RoutingError, VenueId};

use crate::state::DispatchState;

/// Terminal failure of one webhook delivery.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Venue call failed. `source` carries the venue's own message and is
    /// for logs only.
    #[error("Exchange order failed")]
    Exchange {
        venue: VenueId,
        #[source]
        source: ExchangeError,
    },
}

impl DispatchError {
    /// Last state reached before failing.
    #[must_use]
    pub fn failed_after(&self) -> DispatchState {
        match self {
            Self::Auth(_) => DispatchState::Received,
            Self::Validation(ValidationError::UnsupportedOrderType(_))
            | Self::Validation(ValidationError::MissingQuantity) => DispatchState::Authenticated,
            Self::Validation(_) => DispatchState::Received,
            Self::Routing(_) => DispatchState::Validated,
            Self::Exchange { .. } => DispatchState::Dispatched,
        }
    }

    /// Metrics label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auth(_) => "unauthorized",
            Self::Validation(_) => "invalid",
            Self::Routing(_) => "routing_failed",
            Self::Exchange { .. } => "exchange_failed",
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
