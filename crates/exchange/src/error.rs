use bourse_core::{AccountId, Asset, OrderError, SpotPair};
use bourse_ports::{LedgerError, MatchingError};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::infrastructure::ConfigError;

/// Business-rule violations detected when an order is placed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("instrument {got} is not traded here (expected {expected})")]
    UnknownInstrument { expected: SpotPair, got: SpotPair },

    #[error("price must be positive")]
    NonPositivePrice,

    #[error("quantity must be positive")]
    NonPositiveQuantity,

    #[error("price {price} has more than {max_scale} decimal places")]
    PriceTooPrecise { price: Decimal, max_scale: u32 },

    #[error("quantity {quantity} has more than {max_scale} decimal places")]
    QuantityTooPrecise { quantity: Decimal, max_scale: u32 },

    #[error("order value exceeds {max}")]
    NotionalTooLarge { max: Decimal },

    #[error("account not registered: {0}")]
    AccountNotRegistered(AccountId),
}

impl ValidationError {
    /// Stable reason code for outer layers
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownInstrument { .. } => "UNKNOWN_INSTRUMENT",
            Self::NonPositivePrice => "NON_POSITIVE_PRICE",
            Self::NonPositiveQuantity => "NON_POSITIVE_QUANTITY",
            Self::PriceTooPrecise { .. } => "PRICE_TOO_PRECISE",
            Self::QuantityTooPrecise { .. } => "QUANTITY_TOO_PRECISE",
            Self::NotionalTooLarge { .. } => "NOTIONAL_TOO_LARGE",
            Self::AccountNotRegistered(_) => "ACCOUNT_NOT_REGISTERED",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Insufficient funds in {account}: requested {requested} {asset}, available {available}")]
    InsufficientFunds {
        account: AccountId,
        asset: Asset,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Matching error: {0}")]
    Matching(#[from] MatchingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ExchangeError>;

impl From<LedgerError> for ExchangeError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidArgument(msg) => ExchangeError::InvalidArgument(msg),
            LedgerError::AccountNotFound(account) => ExchangeError::AccountNotFound(account),
            LedgerError::InsufficientFunds {
                account,
                asset,
                requested,
                available,
            } => ExchangeError::InsufficientFunds {
                account,
                asset,
                requested,
                available,
            },
        }
    }
}

impl From<OrderError> for ExchangeError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::MissingField(field) => ExchangeError::MissingField(field),
            OrderError::InvalidArgument(msg) => ExchangeError::InvalidArgument(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validation_messages_are_distinct() {
        assert_eq!(
            ValidationError::NonPositivePrice.to_string(),
            "price must be positive"
        );
        assert_eq!(
            ValidationError::NonPositiveQuantity.to_string(),
            "quantity must be positive"
        );
        assert_eq!(
            ValidationError::AccountNotRegistered(AccountId::new("ghost")).to_string(),
            "account not registered: ghost"
        );
        assert_eq!(ValidationError::NonPositivePrice.code(), "NON_POSITIVE_PRICE");
    }

    #[test]
    fn test_ledger_errors_keep_their_kind() {
        let err: ExchangeError = LedgerError::InsufficientFunds {
            account: AccountId::new("alice"),
            asset: "BTC".to_string(),
            requested: dec!(2),
            available: dec!(1),
        }
        .into();
        assert!(matches!(err, ExchangeError::InsufficientFunds { .. }));

        let err: ExchangeError = LedgerError::AccountNotFound(AccountId::new("bob")).into();
        assert_eq!(err, ExchangeError::AccountNotFound(AccountId::new("bob")));
    }

    #[test]
    fn test_order_errors_map_to_missing_field() {
        let err: ExchangeError = OrderError::MissingField("price").into();
        assert_eq!(err.to_string(), "Missing required field: price");
    }
}
