use std::collections::BTreeMap;
use std::sync::Arc;

use bourse_core::{Account, AccountId, Asset};
use bourse_ports::{Ledger, LedgerError, LedgerResult};
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;

/// In-memory account ledger
///
/// Each account sits behind its own shard lock, so mutations of one account
/// are serialized while different accounts proceed in parallel.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    accounts: Arc<DashMap<AccountId, Account>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of one asset across every account
    pub fn total_balance(&self, asset: &str) -> Decimal {
        self.accounts
            .iter()
            .map(|entry| entry.value().balance(asset))
            .sum()
    }

    fn with_account<T>(
        &self,
        account_id: &AccountId,
        f: impl FnOnce(&mut Account) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let mut account = self
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.clone()))?;
        f(account.value_mut())
    }
}

impl Ledger for InMemoryLedger {
    fn register(&self, account_id: &AccountId) -> LedgerResult<()> {
        if self.accounts.contains_key(account_id) {
            return Ok(());
        }

        let account = Account::new(account_id.clone())
            .map_err(|err| LedgerError::from_account(account_id, err))?;
        self.accounts.entry(account_id.clone()).or_insert(account);
        debug!("Registered account {}", account_id);
        Ok(())
    }

    fn is_registered(&self, account_id: &AccountId) -> bool {
        self.accounts.contains_key(account_id)
    }

    fn credit(&self, account_id: &AccountId, asset: &str, amount: Decimal) -> LedgerResult<()> {
        self.with_account(account_id, |account| {
            account
                .credit(asset, amount)
                .map_err(|err| LedgerError::from_account(account_id, err))
        })
    }

    fn try_debit(
        &self,
        account_id: &AccountId,
        asset: &str,
        amount: Decimal,
    ) -> LedgerResult<bool> {
        self.with_account(account_id, |account| {
            account
                .try_debit(asset, amount)
                .map_err(|err| LedgerError::from_account(account_id, err))
        })
    }

    fn debit(&self, account_id: &AccountId, asset: &str, amount: Decimal) -> LedgerResult<()> {
        self.with_account(account_id, |account| {
            account
                .debit(asset, amount)
                .map_err(|err| LedgerError::from_account(account_id, err))
        })
    }

    fn balance_of(&self, account_id: &AccountId, asset: &str) -> Decimal {
        self.accounts
            .get(account_id)
            .map(|account| account.balance(asset))
            .unwrap_or(Decimal::ZERO)
    }

    fn all_balances(&self, account_id: &AccountId) -> LedgerResult<BTreeMap<Asset, Decimal>> {
        self.accounts
            .get(account_id)
            .map(|account| account.balances())
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.clone()))
    }

    fn accounts(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self
            .accounts
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }
}
