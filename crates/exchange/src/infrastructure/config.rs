//! Configuration loading for the exchange
//!
//! Supports JSON configuration files for:
//! - The traded instrument
//! - Accounts with initial balances
//! - Seed orders for initial liquidity

use std::collections::BTreeMap;
use std::path::Path;

use bourse_core::{AccountId, Asset, Precision, Price, Quantity, Side, SpotPair};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Root configuration for the exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Exchange name/identifier
    #[serde(default = "default_exchange_name")]
    pub name: String,

    /// The single instrument traded here
    #[serde(default)]
    pub instrument: SpotPair,

    /// Decimal places accepted for prices and quantities
    #[serde(default)]
    pub precision: Precision,

    /// Number of executed trades kept in memory
    #[serde(default = "default_trade_history")]
    pub trade_history: usize,

    /// Accounts to create
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    /// Initial seed orders for liquidity
    #[serde(default)]
    pub seed_orders: Vec<SeedOrderConfig>,
}

fn default_exchange_name() -> String {
    "Bourse".to_string()
}

fn default_trade_history() -> usize {
    10_000
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            name: default_exchange_name(),
            instrument: SpotPair::default(),
            precision: Precision::default(),
            trade_history: default_trade_history(),
            accounts: Vec::new(),
            seed_orders: Vec::new(),
        }
    }
}

impl ExchangeConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the exchange could not start from
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.instrument.is_valid() {
            return Err(ConfigError::InvalidInstrument(self.instrument.to_string()));
        }
        if !self.precision.is_valid() {
            return Err(ConfigError::InvalidPrecision(format!(
                "price_scale {} + quantity_scale {} exceeds {}",
                self.precision.price_scale,
                self.precision.quantity_scale,
                bourse_core::MAX_SCALE
            )));
        }

        for account in &self.accounts {
            if account.id.is_blank() {
                return Err(ConfigError::InvalidAccount(
                    "account id must not be blank".to_string(),
                ));
            }
            if let Some((asset, amount)) = account
                .balances
                .iter()
                .find(|(_, amount)| **amount < Decimal::ZERO)
            {
                return Err(ConfigError::InvalidAccount(format!(
                    "{}: negative {} balance {}",
                    account.id, asset, amount
                )));
            }
        }

        for seed in &self.seed_orders {
            if !self.accounts.iter().any(|a| a.id == seed.account) {
                return Err(ConfigError::InvalidSeedOrder(format!(
                    "account {} is not configured",
                    seed.account
                )));
            }
        }

        Ok(())
    }
}

/// Account with its opening balances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub id: AccountId,
    /// Asset -> initial balance (JSON number or string)
    #[serde(default)]
    pub balances: BTreeMap<Asset, Decimal>,
}

/// Seed order configuration for initial liquidity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedOrderConfig {
    /// Owner of the order
    pub account: AccountId,
    pub side: Side,
    /// Limit price
    pub price: Price,
    pub quantity: Quantity,
}

/// Configuration loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid instrument: {0}")]
    InvalidInstrument(String),

    #[error("Invalid precision: {0}")]
    InvalidPrecision(String),

    #[error("Invalid account config: {0}")]
    InvalidAccount(String),

    #[error("Invalid seed order: {0}")]
    InvalidSeedOrder(String),
}
