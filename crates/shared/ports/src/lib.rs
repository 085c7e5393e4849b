//! Bourse Ports
//!
//! Port definitions (traits) for the Bourse spot venue.
//! These define the boundaries between domain logic and infrastructure.

mod error;
mod ledger;
mod matching;

pub use error::{LedgerError, LedgerResult, MatchingError, MatchingResult};
pub use ledger::Ledger;
pub use matching::MatchingAlgorithm;
