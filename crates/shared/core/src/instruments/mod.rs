//! Instrument definitions
//!
//! The venue trades a single spot pair; the pair names the base asset
//! (the one being bought/sold) and the quote asset (the one used to price it).

mod precision;
mod spot;

pub use precision::{MAX_SCALE, Precision};
pub use spot::SpotPair;
