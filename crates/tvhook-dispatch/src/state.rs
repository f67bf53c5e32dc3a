//! Dispatch states and outcomes.

use tvhook_venue::{OrderReceipt, VenueId};

/// Position of a request in the dispatch state machine.
///
/// ```text
/// Received -> Authenticated -> Validated -> Duplicate
///                                        -> Routed -> DryRunSkipped
///                                                  -> Dispatched -> Succeeded | Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchState {
    Received,
    Authenticated,
    Validated,
    Duplicate,
    Routed,
    DryRunSkipped,
    Dispatched,
    Succeeded,
    Failed,
}

impl DispatchState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Authenticated => "authenticated",
            Self::Validated => "validated",
            Self::Duplicate => "duplicate",
            Self::Routed => "routed",
            Self::DryRunSkipped => "dry_run_skipped",
            Self::Dispatched => "dispatched",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Duplicate | Self::DryRunSkipped | Self::Succeeded | Self::Failed
        )
    }
}

/// Successful end of the pipeline. Duplicates and dry runs are not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Key already seen within the TTL; nothing sent.
    Duplicate { venue: VenueId },
    /// Dry-run mode; nothing sent.
    DryRun { venue: VenueId },
    /// Venue accepted the order.
    Placed { venue: VenueId, receipt: OrderReceipt },
}

impl DispatchOutcome {
    #[must_use]
    pub fn venue(&self) -> VenueId {
        match self {
            Self::Duplicate { venue } | Self::DryRun { venue } | Self::Placed { venue, .. } => {
                *venue
            }
        }
    }

    /// Terminal state this outcome corresponds to.
    #[must_use]
    pub fn state(&self) -> DispatchState {
        match self {
            Self::Duplicate { .. } => DispatchState::Duplicate,
            Self::DryRun { .. } => DispatchState::DryRunSkipped,
            Self::Placed { .. } => DispatchState::Succeeded,
        }
    }

    /// Metrics label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Duplicate { .. } => "duplicate",
            Self::DryRun { .. } => "dry_run",
            Self::Placed { .. } => "placed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes_are_terminal() {
        let outcomes = [
            DispatchOutcome::Duplicate {
                venue: VenueId::Binance,
            },
            DispatchOutcome::DryRun {
                venue: VenueId::Bybit,
            },
            DispatchOutcome::Placed {
                venue: VenueId::Binance,
                receipt: OrderReceipt::new(serde_json::json!({})),
            },
        ];
        for outcome in &outcomes {
            assert!(outcome.state().is_terminal());
        }
        assert_eq!(outcomes[1].venue(), VenueId::Bybit);
        assert!(!DispatchState::Routed.is_terminal());
    }
}
