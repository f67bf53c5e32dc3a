//! Venue identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported trading venues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueId {
    #[default]
    Binance,
    Bybit,
}

impl VenueId {
    pub const ALL: [VenueId; 2] = [VenueId::Binance, VenueId::Bybit];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binance => "binance",
            Self::Bybit => "bybit",
        }
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VenueId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binance" => Ok(Self::Binance),
            "bybit" => Ok(Self::Bybit),
            other => Err(format!("Unsupported exchange '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("Binance".parse::<VenueId>(), Ok(VenueId::Binance));
        assert_eq!(" BYBIT ".parse::<VenueId>(), Ok(VenueId::Bybit));
        assert!("kraken".parse::<VenueId>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&VenueId::Bybit).unwrap(), "\"bybit\"");
        let parsed: VenueId = serde_json::from_str("\"binance\"").unwrap();
        assert_eq!(parsed, VenueId::Binance);
    }
}
