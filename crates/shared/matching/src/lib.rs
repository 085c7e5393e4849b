//! Bourse Matching
//!
//! The price-time ordered order book and the matching algorithm that decides
//! how a crossed bid/ask pair trades.

mod book;
mod price_time;

pub use book::{BookSnapshot, OrderBook, PriceLevel};
pub use price_time::PriceTimeMatchingEngine;

// Re-export the trait from ports for convenience
pub use bourse_ports::{MatchingAlgorithm, MatchingError, MatchingResult};
