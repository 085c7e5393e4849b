use bourse_core::{AccountError, AccountId, Asset, OrderError, OrderId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Domain-level errors for matching operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchingError {
    #[error("Orders cannot match: {0}")]
    CannotMatch(String),

    #[error("No quantity to match")]
    NoQuantity,

    #[error("Trade amount not representable: {0}")]
    Unrepresentable(String),

    #[error("Order not in book: {0}")]
    UnknownOrder(OrderId),

    #[error(transparent)]
    Order(#[from] OrderError),
}

pub type MatchingResult<T> = std::result::Result<T, MatchingError>;

/// Errors raised by ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error(
        "Insufficient funds in {account}: requested {requested} {asset}, available {available}"
    )]
    InsufficientFunds {
        account: AccountId,
        asset: Asset,
        requested: Decimal,
        available: Decimal,
    },
}

impl LedgerError {
    /// Attach the owning account to an entity-level error
    pub fn from_account(account: &AccountId, err: AccountError) -> Self {
        match err {
            AccountError::InvalidArgument(msg) => LedgerError::InvalidArgument(msg),
            AccountError::InsufficientFunds {
                asset,
                requested,
                available,
            } => LedgerError::InsufficientFunds {
                account: account.clone(),
                asset,
                requested,
                available,
            },
        }
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
