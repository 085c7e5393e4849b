//! Bourse Core Domain
//!
//! Pure domain types for the Bourse spot venue.
//! This crate contains no I/O and no locking, and is 100% unit testable.

pub mod entities;
pub mod instruments;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    Account, AccountError, AccountId, Order, OrderError, OrderId, OrderRequest, OrderResult, Side,
    Trade, TradeId,
};
pub use instruments::{MAX_SCALE, Precision, SpotPair};
pub use values::{Asset, Price, Quantity, Timestamp, exact_add, exact_mul, exact_sub};
