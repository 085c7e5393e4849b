use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{AccountId, Side};
use crate::instruments::SpotPair;
use crate::values::{Price, Quantity, Timestamp, exact_mul};

/// Unique identifier for an order
pub type OrderId = Uuid;

/// Errors raised by the order entity itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Missing required order field: {0}")]
    MissingField(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type OrderResult<T> = std::result::Result<T, OrderError>;

/// Limit order placement request
///
/// Fields are optional so that an incomplete request coming from an outer
/// layer can be rejected with the name of the missing field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderRequest {
    pub account_id: Option<AccountId>,
    pub instrument: Option<SpotPair>,
    pub side: Option<Side>,
    pub price: Option<Price>,
    pub quantity: Option<Quantity>,
}

impl OrderRequest {
    /// Fully specified limit order request
    pub fn limit(
        account_id: impl Into<AccountId>,
        instrument: SpotPair,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            account_id: Some(account_id.into()),
            instrument: Some(instrument),
            side: Some(side),
            price: Some(price),
            quantity: Some(quantity),
        }
    }

    pub fn buy(
        account_id: impl Into<AccountId>,
        instrument: SpotPair,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self::limit(account_id, instrument, Side::Buy, price, quantity)
    }

    pub fn sell(
        account_id: impl Into<AccountId>,
        instrument: SpotPair,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self::limit(account_id, instrument, Side::Sell, price, quantity)
    }
}

/// A resting or incoming limit order
///
/// Everything except the remaining quantity is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub account_id: AccountId,
    pub instrument: SpotPair,
    pub side: Side,
    pub price: Price,
    /// Quantity at placement
    pub quantity: Quantity,
    remaining_quantity: Quantity,
    /// Arrival sequence assigned by the book, breaks price ties (FIFO)
    pub sequence: u64,
    pub created_at: Timestamp,
}

impl Order {
    /// Create a new order using current system time.
    ///
    /// Price and quantity are stored without trailing zeros.
    pub fn new(
        account_id: impl Into<AccountId>,
        instrument: SpotPair,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        let price = price.normalize();
        let quantity = quantity.normalize();
        Self {
            id: Uuid::new_v4(),
            account_id: account_id.into(),
            instrument,
            side,
            price,
            quantity,
            remaining_quantity: quantity,
            sequence: 0,
            created_at: Utc::now(),
        }
    }

    /// Quantity still open
    pub fn remaining_quantity(&self) -> Quantity {
        self.remaining_quantity
    }

    /// Quantity already traded
    pub fn filled_quantity(&self) -> Quantity {
        self.quantity - self.remaining_quantity
    }

    /// Returns true once nothing is left to trade
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    /// Consume `amount` of the remaining quantity
    pub fn reduce_quantity(&mut self, amount: Quantity) -> OrderResult<()> {
        if amount <= Decimal::ZERO {
            return Err(OrderError::InvalidArgument(format!(
                "reduction must be positive, got {}",
                amount
            )));
        }
        if amount > self.remaining_quantity {
            return Err(OrderError::InvalidArgument(format!(
                "reduction {} exceeds remaining quantity {}",
                amount, self.remaining_quantity
            )));
        }

        self.remaining_quantity -= amount;
        Ok(())
    }

    /// Asset reserved while this order is open
    pub fn escrow_asset(&self) -> &str {
        match self.side {
            Side::Buy => &self.instrument.quote,
            Side::Sell => &self.instrument.base,
        }
    }

    /// Amount of `escrow_asset` still reserved for the remaining quantity
    pub fn escrow_amount(&self) -> OrderResult<Decimal> {
        match self.side {
            Side::Buy => Self::checked_notional(self.price, self.remaining_quantity),
            Side::Sell => Ok(self.remaining_quantity),
        }
    }

    /// Quote value of the full order (price x quantity)
    pub fn notional(&self) -> OrderResult<Decimal> {
        Self::checked_notional(self.price, self.quantity)
    }

    fn checked_notional(price: Price, quantity: Quantity) -> OrderResult<Decimal> {
        exact_mul(price, quantity).ok_or_else(|| {
            OrderError::InvalidArgument(format!(
                "{} x {} is not representable",
                price, quantity
            ))
        })
    }
}

impl TryFrom<OrderRequest> for Order {
    type Error = OrderError;

    fn try_from(request: OrderRequest) -> OrderResult<Self> {
        let account_id = request
            .account_id
            .filter(|id| !id.is_blank())
            .ok_or(OrderError::MissingField("account_id"))?;
        let instrument = request
            .instrument
            .ok_or(OrderError::MissingField("instrument"))?;
        let side = request.side.ok_or(OrderError::MissingField("side"))?;
        let price = request.price.ok_or(OrderError::MissingField("price"))?;
        let quantity = request
            .quantity
            .ok_or(OrderError::MissingField("quantity"))?;

        Ok(Order::new(account_id, instrument, side, price, quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn buy(price: Decimal, quantity: Decimal) -> Order {
        Order::new("buyer", SpotPair::btc_brl(), Side::Buy, price, quantity)
    }

    #[test]
    fn test_order_creation() {
        let order = buy(dec!(50000), dec!(0.5));

        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.quantity, dec!(0.5));
        assert_eq!(order.remaining_quantity(), dec!(0.5));
        assert_eq!(order.filled_quantity(), Decimal::ZERO);
        assert!(!order.is_filled());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = buy(dec!(1), dec!(1));
        let b = buy(dec!(1), dec!(1));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_reduce_quantity() {
        let mut order = buy(dec!(100), dec!(1));

        order.reduce_quantity(dec!(0.3)).unwrap();
        assert_eq!(order.remaining_quantity(), dec!(0.7));
        assert_eq!(order.filled_quantity(), dec!(0.3));

        order.reduce_quantity(dec!(0.7)).unwrap();
        assert!(order.is_filled());
    }

    #[test]
    fn test_reduce_quantity_rejects_bad_amounts() {
        let mut order = buy(dec!(100), dec!(1));

        assert!(order.reduce_quantity(Decimal::ZERO).is_err());
        assert!(order.reduce_quantity(dec!(-0.1)).is_err());
        assert!(order.reduce_quantity(dec!(1.1)).is_err());
        assert_eq!(order.remaining_quantity(), dec!(1));
    }

    #[test]
    fn test_escrow_follows_remaining_quantity() {
        let mut order = buy(dec!(50000), dec!(0.5));
        assert_eq!(order.escrow_asset(), "BRL");
        assert_eq!(order.escrow_amount(), Ok(dec!(25000)));

        order.reduce_quantity(dec!(0.2)).unwrap();
        assert_eq!(order.escrow_amount(), Ok(dec!(15000)));
        assert_eq!(order.notional(), Ok(dec!(25000)));

        let sell = Order::new("seller", SpotPair::btc_brl(), Side::Sell, dec!(1), dec!(2));
        assert_eq!(sell.escrow_asset(), "BTC");
        assert_eq!(sell.escrow_amount(), Ok(dec!(2)));
    }

    #[test]
    fn test_unrepresentable_escrow_is_an_error() {
        let huge = buy(dec!(10000000000000000000), dec!(10000000000000));
        assert!(matches!(huge.escrow_amount(), Err(OrderError::InvalidArgument(_))));

        let tiny = buy(dec!(0.0000000000000001), dec!(0.0000000000000001));
        assert!(tiny.notional().is_err());
    }

    #[test]
    fn test_trailing_zeros_are_dropped() {
        let order = buy(dec!(50000.000), dec!(0.50));
        assert_eq!(order.price.scale(), 0);
        assert_eq!(order.quantity.scale(), 1);
        assert_eq!(order.remaining_quantity().scale(), 1);
    }

    #[test]
    fn test_from_complete_request() {
        let request = OrderRequest::sell("seller", SpotPair::btc_brl(), dec!(50000), dec!(1));
        let order = Order::try_from(request).unwrap();

        assert_eq!(order.account_id.as_str(), "seller");
        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.price, dec!(50000));
    }

    #[test]
    fn test_missing_fields_are_named() {
        let complete = OrderRequest::buy("buyer", SpotPair::btc_brl(), dec!(1), dec!(1));

        let cases = [
            (
                OrderRequest {
                    account_id: None,
                    ..complete.clone()
                },
                "account_id",
            ),
            (
                OrderRequest {
                    account_id: Some(AccountId::new(" ")),
                    ..complete.clone()
                },
                "account_id",
            ),
            (
                OrderRequest {
                    instrument: None,
                    ..complete.clone()
                },
                "instrument",
            ),
            (
                OrderRequest {
                    side: None,
                    ..complete.clone()
                },
                "side",
            ),
            (
                OrderRequest {
                    price: None,
                    ..complete.clone()
                },
                "price",
            ),
            (
                OrderRequest {
                    quantity: None,
                    ..complete.clone()
                },
                "quantity",
            ),
        ];

        for (request, field) in cases {
            assert_eq!(Order::try_from(request), Err(OrderError::MissingField(field)));
        }
    }

    #[test]
    fn test_non_positive_values_are_not_checked_here() {
        let request = OrderRequest::buy("buyer", SpotPair::btc_brl(), Decimal::ZERO, dec!(-1));
        assert!(Order::try_from(request).is_ok());
    }
}
