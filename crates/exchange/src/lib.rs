//! Bourse Exchange
//!
//! A single-instrument spot venue. Orders reserve their funds at placement
//! (escrow), rest in a price-time priority book, and trades settle by
//! delivering the opposite asset to each side.
//!
//! # Architecture
//!
//! - **Application**: the `Exchange` facade (placement, matching loop,
//!   cancellation, direct credit/debit)
//! - **Infrastructure**: the in-memory ledger and configuration loading
//!
//! # Example
//!
//! ```
//! use bourse_exchange::{Exchange, OrderRequest, SpotPair};
//! use rust_decimal_macros::dec;
//!
//! let exchange = Exchange::new(SpotPair::btc_brl());
//! exchange.register_account("buyer").unwrap();
//! exchange.credit("buyer", "BRL", dec!(1000000)).unwrap();
//!
//! let request = OrderRequest::buy("buyer", SpotPair::btc_brl(), dec!(50000), dec!(0.5));
//! exchange.place_order(request).unwrap();
//!
//! assert_eq!(exchange.balance("buyer", "BRL"), dec!(975000));
//! ```

// Application layer
pub mod application;

// Infrastructure layer
pub mod infrastructure;

// Cross-cutting concerns
pub mod error;

// Re-export main types for convenience
pub use application::Exchange;
pub use error::{ExchangeError, Result, ValidationError};
pub use infrastructure::{AccountConfig, ConfigError, ExchangeConfig, InMemoryLedger, SeedOrderConfig};

pub use bourse_core::{
    AccountId, Asset, Order, OrderId, OrderRequest, Precision, Side, SpotPair, Trade,
};
pub use bourse_matching::{BookSnapshot, PriceLevel};
