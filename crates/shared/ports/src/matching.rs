use bourse_core::{Order, Price, Quantity, Trade};

use crate::error::MatchingResult;

/// Port for order matching algorithms
///
/// The algorithm decides whether a bid/ask pair crosses and at which price
/// and quantity it trades. It never touches balances or the book, and its
/// own state changes only when the caller commits a trade.
pub trait MatchingAlgorithm: Send {
    /// Check if two orders can match
    fn can_match(&self, bid: &Order, ask: &Order) -> bool;

    /// Match two orders and return the resulting trade and remaining quantities
    ///
    /// Returns: (trade, bid_remaining_qty, ask_remaining_qty)
    fn match_orders(&self, bid: &Order, ask: &Order) -> MatchingResult<(Trade, Quantity, Quantity)>;

    /// Commit a trade produced by `match_orders` once it has been settled
    fn record_trade(&mut self, trade: &Trade);

    /// Get the last traded price
    fn last_price(&self) -> Option<Price>;

    /// Get the name of the algorithm
    fn name(&self) -> &str;
}
