use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use bourse_core::{Order, OrderId, Price, Quantity, Side, SpotPair, Timestamp};
use bourse_ports::{MatchingError, MatchingResult};
use priority_queue::PriorityQueue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Queue priority for a resting order
///
/// `PriorityQueue` pops the greatest key first, so "greater" means "better":
/// for bids a higher price, for asks a lower price, and at equal prices the
/// earlier arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueKey {
    price: Price,
    sequence: u64,
    is_bid: bool,
}

impl QueueKey {
    fn for_order(order: &Order) -> Self {
        QueueKey {
            price: order.price,
            sequence: order.sequence,
            is_bid: order.side == Side::Buy,
        }
    }
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_price = if self.is_bid {
            // Bids: higher price first
            self.price.cmp(&other.price)
        } else {
            // Asks: lower price first
            other.price.cmp(&self.price)
        };
        // Earlier arrival wins ties
        by_price.then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Aggregated quantity resting at one price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub quantity: Quantity,
    pub order_count: usize,
}

/// Immutable snapshot of order book depth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub instrument: SpotPair,
    /// Best bid first
    pub bids: Vec<PriceLevel>,
    /// Best ask first
    pub asks: Vec<PriceLevel>,
    pub sequence: u64,
    pub timestamp: Timestamp,
}

/// Price-time ordered book for a single instrument
///
/// Bids and asks are priority queues of order ids; the orders themselves
/// live in `orders`, which is the only place their quantity can change.
/// An id is queued if and only if it is indexed.
#[derive(Debug, Clone)]
pub struct OrderBook {
    instrument: SpotPair,
    bids: PriorityQueue<OrderId, QueueKey>,
    asks: PriorityQueue<OrderId, QueueKey>,
    orders: HashMap<OrderId, Order>,
    /// Last arrival sequence handed out
    sequence: u64,
}

impl OrderBook {
    pub fn new(instrument: SpotPair) -> Self {
        OrderBook {
            instrument,
            bids: PriorityQueue::new(),
            asks: PriorityQueue::new(),
            orders: HashMap::new(),
            sequence: 0,
        }
    }

    pub fn instrument(&self) -> &SpotPair {
        &self.instrument
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Queue an order behind everything already resting at its price
    pub fn insert(&mut self, mut order: Order) -> OrderId {
        self.sequence += 1;
        order.sequence = self.sequence;

        let id = order.id;
        let key = QueueKey::for_order(&order);
        match order.side {
            Side::Buy => self.bids.push(id, key),
            Side::Sell => self.asks.push(id, key),
        };
        self.orders.insert(id, order);
        id
    }

    /// Remove an order from its queue and the index
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Order> {
        let order = self.orders.remove(order_id)?;
        match order.side {
            Side::Buy => self.bids.remove(order_id),
            Side::Sell => self.asks.remove(order_id),
        };
        Some(order)
    }

    /// Consume `quantity` of a resting order.
    ///
    /// A fully consumed order leaves the book and is returned; a residual
    /// keeps its queue position.
    pub fn fill(&mut self, order_id: &OrderId, quantity: Quantity) -> MatchingResult<Option<Order>> {
        let order = self
            .orders
            .get_mut(order_id)
            .ok_or(MatchingError::UnknownOrder(*order_id))?;
        order.reduce_quantity(quantity)?;

        if order.is_filled() {
            Ok(self.remove(order_id))
        } else {
            Ok(None)
        }
    }

    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.orders.contains_key(order_id)
    }

    /// Highest bid, earliest among equals
    pub fn best_bid(&self) -> Option<&Order> {
        self.bids.peek().and_then(|(id, _)| self.orders.get(id))
    }

    /// Lowest ask, earliest among equals
    pub fn best_ask(&self) -> Option<&Order> {
        self.asks.peek().and_then(|(id, _)| self.orders.get(id))
    }

    pub fn best_bid_price(&self) -> Option<Price> {
        self.best_bid().map(|o| o.price)
    }

    pub fn best_ask_price(&self) -> Option<Price> {
        self.best_ask().map(|o| o.price)
    }

    /// Best ask minus best bid, when both sides are present
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid_price(), self.best_ask_price()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Both heads, when both sides are present
    pub fn best_pair(&self) -> Option<(&Order, &Order)> {
        Some((self.best_bid()?, self.best_ask()?))
    }

    /// True if the best bid reaches the best ask
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid_price(), self.best_ask_price()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    /// Snapshot of one side in priority order
    pub fn orders(&self, side: Side) -> Vec<Order> {
        let queue = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };

        let mut entries: Vec<(QueueKey, &Order)> = queue
            .iter()
            .filter_map(|(id, key)| self.orders.get(id).map(|o| (*key, o)))
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        entries.into_iter().map(|(_, o)| o.clone()).collect()
    }

    /// Aggregated price levels for one side, best first
    pub fn depth(&self, side: Side, levels: usize) -> Vec<PriceLevel> {
        let mut by_price: BTreeMap<Price, (Quantity, usize)> = BTreeMap::new();
        for order in self.orders.values().filter(|o| o.side == side) {
            let entry = by_price.entry(order.price).or_insert((Decimal::ZERO, 0));
            entry.0 += order.remaining_quantity();
            entry.1 += 1;
        }

        let to_level = |(price, (quantity, order_count)): (Price, (Quantity, usize))| PriceLevel {
            price,
            quantity,
            order_count,
        };

        match side {
            Side::Buy => by_price.into_iter().rev().take(levels).map(to_level).collect(),
            Side::Sell => by_price.into_iter().take(levels).map(to_level).collect(),
        }
    }

    /// Get full depth snapshot
    pub fn snapshot(&self, levels: Option<usize>) -> BookSnapshot {
        let levels = levels.unwrap_or(usize::MAX);
        BookSnapshot {
            instrument: self.instrument.clone(),
            bids: self.depth(Side::Buy, levels),
            asks: self.depth(Side::Sell, levels),
            sequence: self.sequence,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Number of orders in the book
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}
