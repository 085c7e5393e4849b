use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, OrderId};
use crate::instruments::SpotPair;
use crate::values::{Price, Quantity, Timestamp, exact_mul};

/// Unique identifier for a trade
pub type TradeId = Uuid;

/// Trade resulting from matching a bid against an ask
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    /// The instrument that was traded
    pub instrument: SpotPair,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub price: Price,
    pub quantity: Quantity,
    pub timestamp: Timestamp,
}

impl Trade {
    /// Create a new trade using current system time
    pub fn new(
        instrument: SpotPair,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        buyer: AccountId,
        seller: AccountId,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument,
            buy_order_id,
            sell_order_id,
            buyer,
            seller,
            price,
            quantity,
            timestamp: Utc::now(),
        }
    }

    /// Notional value of the trade (price * quantity), `None` if it does
    /// not fit a `Decimal` exactly
    pub fn notional(&self) -> Option<Decimal> {
        exact_mul(self.price, self.quantity)
    }
}
