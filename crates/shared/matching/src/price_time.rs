use bourse_core::{Order, Price, Quantity, Side, Trade};
use bourse_ports::{MatchingAlgorithm, MatchingError, MatchingResult};
use rust_decimal::Decimal;

/// Standard price-time priority matching engine (FIFO)
///
/// Orders are matched based on:
/// 1. Best price (highest bid, lowest ask)
/// 2. Time priority (first in, first out at same price)
///
/// Crossed pairs always execute at the ask price.
pub struct PriceTimeMatchingEngine {
    last_price: Option<Decimal>,
}

impl PriceTimeMatchingEngine {
    pub fn new() -> Self {
        Self { last_price: None }
    }
}

impl Default for PriceTimeMatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingAlgorithm for PriceTimeMatchingEngine {
    fn name(&self) -> &str {
        "Price-Time Priority"
    }

    fn last_price(&self) -> Option<Price> {
        self.last_price
    }

    fn can_match(&self, bid: &Order, ask: &Order) -> bool {
        // Must be same instrument
        if bid.instrument != ask.instrument {
            return false;
        }

        // Must be opposite sides
        if bid.side != Side::Buy || ask.side != Side::Sell {
            return false;
        }

        // Price must cross
        bid.price >= ask.price
    }

    fn match_orders(&self, bid: &Order, ask: &Order) -> MatchingResult<(Trade, Quantity, Quantity)> {
        if !self.can_match(bid, ask) {
            return Err(MatchingError::CannotMatch(format!(
                "bid {} @ {} does not cross ask {} @ {}",
                bid.id, bid.price, ask.id, ask.price
            )));
        }

        let bid_remaining = bid.remaining_quantity();
        let ask_remaining = ask.remaining_quantity();
        let match_qty = bid_remaining.min(ask_remaining);

        if match_qty <= Decimal::ZERO {
            return Err(MatchingError::NoQuantity);
        }

        let match_price = ask.price;

        let trade = Trade::new(
            bid.instrument.clone(),
            bid.id,
            ask.id,
            bid.account_id.clone(),
            ask.account_id.clone(),
            match_price,
            match_qty,
        );

        match trade.notional() {
            Some(notional) if notional > Decimal::ZERO => {}
            _ => {
                return Err(MatchingError::Unrepresentable(format!(
                    "{} x {}",
                    match_price, match_qty
                )));
            }
        }

        Ok((
            trade,
            bid_remaining - match_qty,
            ask_remaining - match_qty,
        ))
    }

    fn record_trade(&mut self, trade: &Trade) {
        self.last_price = Some(trade.price);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bourse_core::SpotPair;
    use rust_decimal_macros::dec;

    fn order(side: Side, price: Decimal, quantity: Decimal) -> Order {
        Order::new("trader", SpotPair::btc_brl(), side, price, quantity)
    }

    #[test]
    fn test_can_match_requires_crossing_prices() {
        let engine = PriceTimeMatchingEngine::new();

        let bid = order(Side::Buy, dec!(100), dec!(1));
        assert!(engine.can_match(&bid, &order(Side::Sell, dec!(100), dec!(1))));
        assert!(engine.can_match(&bid, &order(Side::Sell, dec!(99.99), dec!(1))));
        assert!(!engine.can_match(&bid, &order(Side::Sell, dec!(100.01), dec!(1))));
    }

    #[test]
    fn test_can_match_rejects_wrong_sides_and_instruments() {
        let engine = PriceTimeMatchingEngine::new();

        let bid = order(Side::Buy, dec!(100), dec!(1));
        let other_bid = order(Side::Buy, dec!(90), dec!(1));
        assert!(!engine.can_match(&bid, &other_bid));

        let foreign_ask = Order::new(
            "trader",
            SpotPair::btc_usd(),
            Side::Sell,
            dec!(90),
            dec!(1),
        );
        assert!(!engine.can_match(&bid, &foreign_ask));
    }

    #[test]
    fn test_trade_executes_at_ask_price() {
        let mut engine = PriceTimeMatchingEngine::new();

        let ask = order(Side::Sell, dec!(49000), dec!(1));
        let bid = order(Side::Buy, dec!(50000), dec!(1));

        let (trade, bid_left, ask_left) = engine.match_orders(&bid, &ask).unwrap();

        assert_eq!(trade.price, dec!(49000));
        assert_eq!(trade.quantity, dec!(1));
        assert_eq!(trade.buy_order_id, bid.id);
        assert_eq!(trade.sell_order_id, ask.id);
        assert_eq!(bid_left, Decimal::ZERO);
        assert_eq!(ask_left, Decimal::ZERO);

        // Nothing moves until the trade is committed
        assert_eq!(engine.last_price(), None);
        engine.record_trade(&trade);
        assert_eq!(engine.last_price(), Some(dec!(49000)));
    }

    #[test]
    fn test_unrepresentable_notional_is_refused() {
        let engine = PriceTimeMatchingEngine::new();

        let tiny = dec!(0.0000000000000001);
        let ask = order(Side::Sell, tiny, tiny);
        let bid = order(Side::Buy, dec!(1), tiny);

        assert!(matches!(
            engine.match_orders(&bid, &ask),
            Err(MatchingError::Unrepresentable(_))
        ));
        assert_eq!(engine.last_price(), None);
    }

    #[test]
    fn test_partial_match_leaves_residual() {
        let engine = PriceTimeMatchingEngine::new();

        let bid = order(Side::Buy, dec!(100), dec!(0.3));
        let ask = order(Side::Sell, dec!(100), dec!(1.25));

        let (trade, bid_left, ask_left) = engine.match_orders(&bid, &ask).unwrap();

        assert_eq!(trade.quantity, dec!(0.3));
        assert_eq!(bid_left, Decimal::ZERO);
        assert_eq!(ask_left, dec!(0.95));
    }

    #[test]
    fn test_non_crossing_match_is_an_error() {
        let engine = PriceTimeMatchingEngine::new();

        let bid = order(Side::Buy, dec!(99), dec!(1));
        let ask = order(Side::Sell, dec!(100), dec!(1));

        assert!(matches!(
            engine.match_orders(&bid, &ask),
            Err(MatchingError::CannotMatch(_))
        ));
        assert_eq!(engine.last_price(), None);
    }

    #[test]
    fn test_exhausted_order_has_no_quantity() {
        let engine = PriceTimeMatchingEngine::new();

        let mut bid = order(Side::Buy, dec!(100), dec!(1));
        bid.reduce_quantity(dec!(1)).unwrap();
        let ask = order(Side::Sell, dec!(100), dec!(1));

        assert_eq!(
            engine.match_orders(&bid, &ask).unwrap_err(),
            MatchingError::NoQuantity
        );
    }
}
