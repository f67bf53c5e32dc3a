//! Symbol -> venue routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use tvhook_core::Symbol;

use crate::adapter::DynExchangeAdapter;
use crate::error::{RoutingError, RoutingResult};
use crate::venue::VenueId;

/// Routing table configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Venue for symbols without an override. Default: binance.
    #[serde(default)]
    pub default_venue: VenueId,
    /// Per-symbol overrides. Keys are normalized to upper-case on load.
    #[serde(default)]
    pub symbol_map: HashMap<String, VenueId>,
}

/// Resolved venue for one request.
#[derive(Clone)]
pub struct VenueRoute {
    pub venue: VenueId,
    pub adapter: DynExchangeAdapter,
}

impl fmt::Debug for VenueRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VenueRoute")
            .field("venue", &self.venue)
            .finish_non_exhaustive()
    }
}

/// Read-only routing table plus the registered adapters.
///
/// Built once at startup and shared across requests without locking.
pub struct ExchangeRouter {
    default_venue: VenueId,
    symbol_map: HashMap<String, VenueId>,
    adapters: HashMap<VenueId, DynExchangeAdapter>,
}

impl ExchangeRouter {
    /// Create a router with no adapters registered.
    #[must_use]
    pub fn new(config: &RoutingConfig) -> Self {
        let symbol_map = config
            .symbol_map
            .iter()
            .map(|(symbol, venue)| (symbol.trim().to_uppercase(), *venue))
            .collect();

        Self {
            default_venue: config.default_venue,
            symbol_map,
            adapters: HashMap::new(),
        }
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with_adapter(mut self, adapter: DynExchangeAdapter) -> Self {
        self.register(adapter);
        self
    }

    /// Register an adapter under its own venue, replacing any previous one.
    pub fn register(&mut self, adapter: DynExchangeAdapter) {
        self.adapters.insert(adapter.venue(), adapter);
    }

    #[must_use]
    pub fn default_venue(&self) -> VenueId {
        self.default_venue
    }

    /// Venue for a symbol: its override if present, else the default.
    #[must_use]
    pub fn resolve_venue(&self, symbol: &str) -> VenueId {
        self.symbol_map
            .get(&symbol.trim().to_uppercase())
            .copied()
            .unwrap_or(self.default_venue)
    }

    /// Resolve the venue and its adapter.
    pub fn resolve(&self, symbol: &Symbol) -> RoutingResult<VenueRoute> {
        let venue = self.resolve_venue(symbol.as_str());
        let adapter = self
            .adapters
            .get(&venue)
            .cloned()
            .ok_or(RoutingError::UnknownVenue(venue))?;
        Ok(VenueRoute { venue, adapter })
    }

    #[must_use]
    pub fn registered_venues(&self) -> Vec<VenueId> {
        VenueId::ALL
            .into_iter()
            .filter(|venue| self.adapters.contains_key(venue))
            .collect()
    }
}

impl fmt::Debug for ExchangeRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeRouter")
            .field("default_venue", &self.default_venue)
            .field("symbol_map", &self.symbol_map)
            .field("adapters", &self.registered_venues())
            .finish()
    }
}
