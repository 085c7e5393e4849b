use serde::{Deserialize, Serialize};

use crate::values::Asset;

/// A spot trading pair (e.g., BTC/BRL)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpotPair {
    /// Base currency (the one being bought/sold)
    pub base: Asset,
    /// Quote currency (the one used to price the base)
    pub quote: Asset,
}

impl SpotPair {
    pub fn new(base: impl Into<Asset>, quote: impl Into<Asset>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Bitcoin priced in Brazilian reais
    pub fn btc_brl() -> Self {
        Self::new("BTC", "BRL")
    }

    pub fn btc_usd() -> Self {
        Self::new("BTC", "USD")
    }

    /// Both legs must name a non-blank asset
    pub fn is_valid(&self) -> bool {
        !self.base.trim().is_empty() && !self.quote.trim().is_empty() && self.base != self.quote
    }
}

impl Default for SpotPair {
    fn default() -> Self {
        Self::btc_brl()
    }
}

impl std::fmt::Display for SpotPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_pair_creation() {
        let pair = SpotPair::btc_brl();
        assert_eq!(pair.base, "BTC");
        assert_eq!(pair.quote, "BRL");
    }

    #[test]
    fn test_spot_display() {
        let pair = SpotPair::new("ETH", "USD");
        assert_eq!(format!("{}", pair), "ETH/USD");
    }

    #[test]
    fn test_spot_validity() {
        assert!(SpotPair::btc_usd().is_valid());
        assert!(!SpotPair::new("BTC", " ").is_valid());
        assert!(!SpotPair::new("BTC", "BTC").is_valid());
    }
}
