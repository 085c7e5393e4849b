//! Trading account entity holding per-asset balances.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::values::{Asset, Timestamp, exact_add, exact_sub};

/// Caller-chosen account identifier
///
/// Accounts are registered under an external name (e.g. "buyer"), so the
/// identifier is a string rather than a generated UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace-only identifiers are never registered
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Account operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient {asset} balance: requested {requested}, available {available}")]
    InsufficientFunds {
        asset: Asset,
        requested: Decimal,
        available: Decimal,
    },
}

/// A spot account: asset symbol -> balance, every balance >= 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    /// Asset balances. Assets never credited are absent and read as zero.
    balances: BTreeMap<Asset, Decimal>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Account {
    /// Create an account with empty balances
    pub fn new(id: impl Into<AccountId>) -> Result<Self, AccountError> {
        let id = id.into();
        if id.is_blank() {
            return Err(AccountError::InvalidArgument(
                "account id must not be blank".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            balances: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        })
    }

    // ========== Balance Operations ==========

    /// Increase the balance of `asset` by `amount`
    pub fn credit(&mut self, asset: &str, amount: Decimal) -> Result<(), AccountError> {
        Self::validate(asset, amount)?;

        let current = self.balance(asset);
        let updated = exact_add(current, amount).ok_or_else(|| {
            AccountError::InvalidArgument(format!(
                "crediting {} {} to {} is not representable",
                amount, asset, current
            ))
        })?;
        self.balances.insert(asset.to_string(), updated);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Decrease the balance of `asset` by `amount` if it is covered.
    ///
    /// Returns `Ok(false)` and leaves the balance untouched when the
    /// account holds less than `amount`.
    pub fn try_debit(&mut self, asset: &str, amount: Decimal) -> Result<bool, AccountError> {
        Self::validate(asset, amount)?;

        let current = self.balance(asset);
        if current < amount {
            return Ok(false);
        }

        let updated = exact_sub(current, amount).ok_or_else(|| {
            AccountError::InvalidArgument(format!(
                "debiting {} {} from {} is not representable",
                amount, asset, current
            ))
        })?;
        self.balances.insert(asset.to_string(), updated);
        self.updated_at = Utc::now();
        Ok(true)
    }

    /// Strict debit: insufficient funds is an error
    pub fn debit(&mut self, asset: &str, amount: Decimal) -> Result<(), AccountError> {
        if self.try_debit(asset, amount)? {
            Ok(())
        } else {
            Err(AccountError::InsufficientFunds {
                asset: asset.to_string(),
                requested: amount,
                available: self.balance(asset),
            })
        }
    }

    /// Balance for an asset (zero if never credited)
    pub fn balance(&self, asset: &str) -> Decimal {
        self.balances.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Snapshot of all balances
    pub fn balances(&self) -> BTreeMap<Asset, Decimal> {
        self.balances.clone()
    }

    fn validate(asset: &str, amount: Decimal) -> Result<(), AccountError> {
        if asset.trim().is_empty() {
            return Err(AccountError::InvalidArgument(
                "asset must not be blank".to_string(),
            ));
        }
        if amount <= Decimal::ZERO {
            return Err(AccountError::InvalidArgument(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        Ok(())
    }
}
