use std::collections::BTreeMap;

use bourse_core::{AccountId, Asset};
use rust_decimal::Decimal;

use crate::error::LedgerResult;

/// Port for account balance storage
///
/// Implementations must serialize mutations of a single account; operations
/// on different accounts may run concurrently. Every balance stays >= 0.
pub trait Ledger: Send + Sync {
    /// Create an account with empty balances. Registering twice is a no-op.
    fn register(&self, account_id: &AccountId) -> LedgerResult<()>;

    /// Check if an account exists
    fn is_registered(&self, account_id: &AccountId) -> bool;

    /// Increase a balance
    fn credit(&self, account_id: &AccountId, asset: &str, amount: Decimal) -> LedgerResult<()>;

    /// Decrease a balance if covered; `Ok(false)` means insufficient funds
    fn try_debit(&self, account_id: &AccountId, asset: &str, amount: Decimal)
    -> LedgerResult<bool>;

    /// Decrease a balance; insufficient funds is an error
    fn debit(&self, account_id: &AccountId, asset: &str, amount: Decimal) -> LedgerResult<()>;

    /// Current balance, zero when the asset was never credited
    fn balance_of(&self, account_id: &AccountId, asset: &str) -> Decimal;

    /// Snapshot of every balance held by the account
    fn all_balances(&self, account_id: &AccountId) -> LedgerResult<BTreeMap<Asset, Decimal>>;

    /// Identifiers of all registered accounts
    fn accounts(&self) -> Vec<AccountId>;
}
