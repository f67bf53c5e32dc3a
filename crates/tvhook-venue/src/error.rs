//! Venue and routing error types.

use thiserror::Error;

use crate::venue::VenueId;

/// Uniform venue failure. The message is diagnostic detail for logs; it may
/// contain account information and is not meant for webhook callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("{venue} credentials are missing")]
    MissingCredentials { venue: VenueId },

    #[error("{venue} request failed: {message}")]
    Transport { venue: VenueId, message: String },

    #[error("{venue} rejected order: {message}")]
    Rejected { venue: VenueId, message: String },

    #[error("{venue} order timed out after {timeout_ms}ms")]
    Timeout { venue: VenueId, timeout_ms: u64 },
}

impl ExchangeError {
    #[must_use]
    pub fn venue(&self) -> VenueId {
        match self {
            Self::MissingCredentials { venue }
            | Self::Transport { venue, .. }
            | Self::Rejected { venue, .. }
            | Self::Timeout { venue, .. } => *venue,
        }
    }

    /// Short stable label for logs and metrics.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials { .. } => "missing_credentials",
            Self::Transport { .. } => "transport",
            Self::Rejected { .. } => "rejected",
            Self::Timeout { .. } => "timeout",
        }
    }
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("Exchange adapter '{0}' not available")]
    UnknownVenue(VenueId),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
