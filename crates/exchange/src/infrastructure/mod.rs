pub mod config;
pub mod ledger;

pub use config::{AccountConfig, ConfigError, ExchangeConfig, SeedOrderConfig};
pub use ledger::InMemoryLedger;
