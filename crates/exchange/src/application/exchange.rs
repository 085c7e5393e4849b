use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use bourse_core::{
    exact_add, exact_mul, exact_sub, AccountId, Asset, Order, OrderId, OrderRequest, Precision,
    Side, SpotPair, Trade,
};
use bourse_matching::{BookSnapshot, OrderBook, PriceTimeMatchingEngine};
use bourse_ports::{Ledger, MatchingAlgorithm, MatchingError};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::error::{ExchangeError, Result, ValidationError};
use crate::infrastructure::{ExchangeConfig, InMemoryLedger};

/// One ledger movement of a settlement
type Credit = (AccountId, Asset, Decimal);

/// Book, matcher, trade tape and asset supply, mutated together under one lock
struct MatchingState {
    book: OrderBook,
    matcher: Box<dyn MatchingAlgorithm>,
    trades: VecDeque<Trade>,
    trade_history: usize,
    /// Total of each asset held by the venue, balances plus escrow
    supply: HashMap<Asset, Decimal>,
}

impl MatchingState {
    fn record(&mut self, trade: Trade) {
        if self.trade_history == 0 {
            return;
        }
        if self.trades.len() == self.trade_history {
            self.trades.pop_front();
        }
        self.trades.push_back(trade);
    }

    fn supply_of(&self, asset: &str) -> Decimal {
        self.supply.get(asset).copied().unwrap_or_default()
    }
}

/// Single-instrument spot exchange
///
/// Placement, matching, cancellation and direct credits or debits run
/// inside one critical section, so the book is never observed crossed.
/// Balance reads go straight to the ledger.
///
/// Prices and quantities are limited to the configured [`Precision`], and
/// the supply of every asset stays under `Precision::max_notional`. Every
/// amount a trade moves is then an exact `Decimal`, so settlement cannot
/// fail once the book has been touched.
pub struct Exchange<L: Ledger = InMemoryLedger> {
    name: String,
    instrument: SpotPair,
    precision: Precision,
    ledger: Arc<L>,
    state: Mutex<MatchingState>,
}

impl Exchange<InMemoryLedger> {
    /// Create an exchange backed by a fresh in-memory ledger
    pub fn new(instrument: SpotPair) -> Self {
        Self::build(
            instrument,
            Precision::default(),
            Arc::new(InMemoryLedger::new()),
            HashMap::new(),
        )
    }

    /// Build an exchange from configuration: register accounts, fund them,
    /// then place the seed orders in file order
    pub fn from_config(config: &ExchangeConfig) -> Result<Self> {
        config.validate()?;

        let mut exchange = Self::build(
            config.instrument.clone(),
            config.precision,
            Arc::new(InMemoryLedger::new()),
            HashMap::new(),
        );
        exchange.name = config.name.clone();
        exchange.state.get_mut().trade_history = config.trade_history;

        for account in &config.accounts {
            exchange.register_account(account.id.clone())?;
            for (asset, amount) in &account.balances {
                if *amount > Decimal::ZERO {
                    exchange.credit(account.id.clone(), asset, *amount)?;
                }
            }
        }

        for seed in &config.seed_orders {
            let request = OrderRequest::limit(
                seed.account.clone(),
                config.instrument.clone(),
                seed.side,
                seed.price,
                seed.quantity,
            );
            exchange.place_order(request)?;
        }

        info!(
            "Exchange '{}' ready: {} accounts, {} resting orders",
            exchange.name,
            config.accounts.len(),
            exchange.state.lock().book.order_count()
        );
        Ok(exchange)
    }
}

impl<L: Ledger> Exchange<L> {
    /// Create an exchange on top of an existing ledger.
    ///
    /// Balances already in the ledger count towards the asset supply and
    /// must fit the default precision.
    pub fn with_ledger(instrument: SpotPair, ledger: Arc<L>) -> Result<Self> {
        let precision = Precision::default();
        let mut supply: HashMap<Asset, Decimal> = HashMap::new();

        for account_id in ledger.accounts() {
            for (asset, amount) in ledger.all_balances(&account_id)? {
                let total = supply.entry(asset.clone()).or_default();
                *total = exact_add(*total, amount)
                    .filter(|sum| precision.fits_amount(amount) && *sum <= precision.max_notional())
                    .ok_or_else(|| {
                        ExchangeError::InvalidArgument(format!(
                            "{} balance {} of {} does not fit {}",
                            asset, amount, account_id, instrument
                        ))
                    })?;
            }
        }

        Ok(Self::build(instrument, precision, ledger, supply))
    }

    fn build(
        instrument: SpotPair,
        precision: Precision,
        ledger: Arc<L>,
        supply: HashMap<Asset, Decimal>,
    ) -> Self {
        let book = OrderBook::new(instrument.clone());
        let matcher: Box<dyn MatchingAlgorithm> = Box::new(PriceTimeMatchingEngine::new());
        info!(
            "Exchange for {} using {} ({} price / {} quantity decimals)",
            book.instrument(),
            matcher.name(),
            precision.price_scale,
            precision.quantity_scale
        );

        Self {
            name: "Bourse".to_string(),
            instrument,
            precision,
            ledger,
            state: Mutex::new(MatchingState {
                book,
                matcher,
                trades: VecDeque::new(),
                trade_history: 10_000,
                supply,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instrument(&self) -> &SpotPair {
        &self.instrument
    }

    pub fn precision(&self) -> &Precision {
        &self.precision
    }

    /// Read access to balances. Writes must go through the exchange so the
    /// asset supply stays in step.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    // ========== Accounts ==========

    /// Register an account with empty balances. Registering twice is a no-op.
    pub fn register_account(&self, account_id: impl Into<AccountId>) -> Result<()> {
        let account_id = account_id.into();
        self.ledger.register(&account_id)?;
        info!("Account registered: {}", account_id);
        Ok(())
    }

    /// Deposit into an account
    pub fn credit(
        &self,
        account_id: impl Into<AccountId>,
        asset: &str,
        amount: Decimal,
    ) -> Result<()> {
        let account_id = account_id.into();
        self.check_amount(asset, amount)?;

        let mut state = self.state.lock();
        let supply = exact_add(state.supply_of(asset), amount)
            .filter(|total| *total <= self.precision.max_notional())
            .ok_or_else(|| {
                ExchangeError::InvalidArgument(format!(
                    "crediting {} {} would take the {} supply above {}",
                    amount,
                    asset,
                    asset,
                    self.precision.max_notional()
                ))
            })?;

        self.ledger.credit(&account_id, asset, amount)?;
        state.supply.insert(asset.to_string(), supply);
        debug!("Credited {} {} to {}", amount, asset, account_id);
        Ok(())
    }

    /// Withdraw from an account; fails without mutation when not covered
    pub fn debit(
        &self,
        account_id: impl Into<AccountId>,
        asset: &str,
        amount: Decimal,
    ) -> Result<()> {
        let account_id = account_id.into();
        self.check_amount(asset, amount)?;

        let mut state = self.state.lock();
        let supply = exact_sub(state.supply_of(asset), amount).ok_or_else(|| {
            ExchangeError::InvalidArgument(format!("debiting {} {} is not representable", amount, asset))
        })?;

        if let Err(e) = self.ledger.debit(&account_id, asset, amount) {
            warn!("Debit of {} {} from {} refused: {}", amount, asset, account_id, e);
            return Err(e.into());
        }
        state.supply.insert(asset.to_string(), supply);
        debug!("Debited {} {} from {}", amount, asset, account_id);
        Ok(())
    }

    fn check_amount(&self, asset: &str, amount: Decimal) -> Result<()> {
        if self.precision.fits_amount(amount) {
            Ok(())
        } else {
            Err(ExchangeError::InvalidArgument(format!(
                "{} {} needs more than {} decimals or exceeds {}",
                amount,
                asset,
                self.precision.amount_scale(),
                self.precision.max_notional()
            )))
        }
    }

    /// All balances of an account
    pub fn balances(&self, account_id: impl Into<AccountId>) -> Result<BTreeMap<Asset, Decimal>> {
        Ok(self.ledger.all_balances(&account_id.into())?)
    }

    /// Available balance of one asset, zero for unknown accounts or assets
    pub fn balance(&self, account_id: impl Into<AccountId>, asset: &str) -> Decimal {
        self.ledger.balance_of(&account_id.into(), asset)
    }

    // ========== Orders ==========

    /// Validate, escrow and book a limit order, then match it.
    ///
    /// Any rejection happens before funds move or the book changes.
    pub fn place_order(&self, request: OrderRequest) -> Result<OrderId> {
        let order = Order::try_from(request)?;
        if let Err(err) = self.validate(&order) {
            warn!("Order rejected ({}): {}", err.code(), err);
            return Err(err.into());
        }

        let asset = order.escrow_asset().to_string();
        let amount = order.escrow_amount()?;

        let mut state = self.state.lock();
        if !self.ledger.try_debit(&order.account_id, &asset, amount)? {
            let available = self.ledger.balance_of(&order.account_id, &asset);
            warn!(
                "Order rejected: {} needs {} {} but has {}",
                order.account_id, amount, asset, available
            );
            return Err(ExchangeError::InsufficientFunds {
                account: order.account_id,
                asset,
                requested: amount,
                available,
            });
        }

        let order_id = state.book.insert(order);
        if let Some(order) = state.book.get(&order_id) {
            info!(
                "Order accepted: #{} {} {} {} @ {} by {}, escrowed {} {}",
                state.book.sequence(),
                order.side,
                order.quantity,
                order.instrument,
                order.price,
                order.account_id,
                amount,
                asset
            );
        }

        self.run_matching(&mut state)?;
        Ok(order_id)
    }

    /// Withdraw a resting order and refund the escrow of its remaining quantity.
    ///
    /// Returns false when the order is unknown, already filled or already
    /// cancelled. The refund is credited before the order leaves the book,
    /// so a failed refund leaves both the order and its escrow in place.
    pub fn cancel_order(&self, order_id: &OrderId) -> bool {
        let mut state = self.state.lock();

        let Some(order) = state.book.get(order_id).cloned() else {
            debug!("Cancel ignored, order {} is not open", order_id);
            return false;
        };

        let asset = order.escrow_asset();
        let refund = match order.escrow_amount() {
            Ok(refund) => refund,
            Err(e) => {
                error!("Cannot compute refund for order {}: {}", order_id, e);
                return false;
            }
        };
        // resting orders always have a remaining quantity
        debug_assert!(refund > Decimal::ZERO);

        if let Err(e) = self.ledger.credit(&order.account_id, asset, refund) {
            error!(
                "Failed to refund {} {} to {} for order {}: {}",
                refund, asset, order.account_id, order_id, e
            );
            return false;
        }
        state.book.remove(order_id);

        info!(
            "Order cancelled: {} by {} after {} filled, refunded {} {}",
            order_id,
            order.account_id,
            order.filled_quantity(),
            refund,
            asset
        );
        true
    }

    fn validate(&self, order: &Order) -> std::result::Result<(), ValidationError> {
        if order.instrument != self.instrument {
            return Err(ValidationError::UnknownInstrument {
                expected: self.instrument.clone(),
                got: order.instrument.clone(),
            });
        }
        if order.price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice);
        }
        if order.quantity <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveQuantity);
        }
        if !self.precision.fits_price(order.price) {
            return Err(ValidationError::PriceTooPrecise {
                price: order.price,
                max_scale: self.precision.price_scale,
            });
        }
        if !self.precision.fits_quantity(order.quantity) {
            return Err(ValidationError::QuantityTooPrecise {
                quantity: order.quantity,
                max_scale: self.precision.quantity_scale,
            });
        }
        let max = self.precision.max_notional();
        if !matches!(order.notional(), Ok(notional) if notional <= max) {
            return Err(ValidationError::NotionalTooLarge { max });
        }
        if !self.ledger.is_registered(&order.account_id) {
            return Err(ValidationError::AccountNotRegistered(
                order.account_id.clone(),
            ));
        }
        Ok(())
    }

    /// Execute best bid against best ask until the book no longer crosses.
    ///
    /// Each round computes the trade and every ledger movement first, then
    /// applies them.
    fn run_matching(&self, state: &mut MatchingState) -> Result<()> {
        loop {
            let (bid, ask) = match state.book.best_pair() {
                Some((bid, ask)) if state.matcher.can_match(bid, ask) => (bid.clone(), ask.clone()),
                _ => break,
            };

            let (trade, bid_left, ask_left) = state.matcher.match_orders(&bid, &ask)?;
            let credits = self.settlement(&bid, &trade)?;

            let bid_done = state.book.fill(&bid.id, trade.quantity)?.is_some();
            let ask_done = state.book.fill(&ask.id, trade.quantity)?.is_some();
            debug_assert_eq!(bid_done, bid_left.is_zero());
            debug_assert_eq!(ask_done, ask_left.is_zero());

            for (account_id, asset, amount) in &credits {
                if let Err(e) = self.ledger.credit(account_id, asset, *amount) {
                    error!(
                        "Settlement of trade {} failed crediting {} {} to {}: {}",
                        trade.id, amount, asset, account_id, e
                    );
                    return Err(e.into());
                }
            }

            info!(
                "Trade {}: {} {} @ {} ({} buys from {})",
                trade.id, trade.quantity, self.instrument, trade.price, trade.buyer, trade.seller
            );
            state.matcher.record_trade(&trade);
            state.record(trade);
        }

        debug_assert!(!state.book.is_crossed());
        Ok(())
    }

    /// Ledger credits delivering both legs of a trade out of escrow. A buyer
    /// whose limit was above the execution price gets the difference back.
    fn settlement(&self, bid: &Order, trade: &Trade) -> Result<Vec<Credit>> {
        let base = &self.instrument.base;
        let quote = &self.instrument.quote;

        let unrepresentable = || {
            ExchangeError::Matching(MatchingError::Unrepresentable(format!(
                "settlement of {} @ {}",
                trade.quantity, trade.price
            )))
        };
        let notional = trade.notional().ok_or_else(unrepresentable)?;
        let improvement = exact_sub(bid.price, trade.price)
            .and_then(|difference| exact_mul(difference, trade.quantity))
            .ok_or_else(unrepresentable)?;

        let mut credits = vec![
            (trade.buyer.clone(), base.clone(), trade.quantity),
            (trade.seller.clone(), quote.clone(), notional),
        ];
        if improvement > Decimal::ZERO {
            debug!(
                "Refunding price improvement {} {} to {}",
                improvement, quote, trade.buyer
            );
            credits.push((trade.buyer.clone(), quote.clone(), improvement));
        }
        Ok(credits)
    }

    // ========== Queries ==========

    /// Open orders of one side, best first
    pub fn open_orders(&self, side: Side) -> Vec<Order> {
        self.state.lock().book.orders(side)
    }

    pub fn open_buy_orders(&self) -> Vec<Order> {
        self.open_orders(Side::Buy)
    }

    pub fn open_sell_orders(&self) -> Vec<Order> {
        self.open_orders(Side::Sell)
    }

    /// An order while it rests in the book
    pub fn order(&self, order_id: &OrderId) -> Option<Order> {
        self.state.lock().book.get(order_id).cloned()
    }

    pub fn best_bid(&self) -> Option<Order> {
        self.state.lock().book.best_bid().cloned()
    }

    pub fn best_ask(&self) -> Option<Order> {
        self.state.lock().book.best_ask().cloned()
    }

    pub fn spread(&self) -> Option<Decimal> {
        self.state.lock().book.spread()
    }

    /// Price of the most recent trade
    pub fn last_price(&self) -> Option<Decimal> {
        self.state.lock().matcher.last_price()
    }

    /// Executed trades, oldest first
    pub fn trades(&self) -> Vec<Trade> {
        self.state.lock().trades.iter().cloned().collect()
    }

    /// Aggregated depth, optionally limited to the best `levels` prices
    pub fn snapshot(&self, levels: Option<usize>) -> BookSnapshot {
        self.state.lock().book.snapshot(levels)
    }

    /// Amount of `asset` currently held in escrow by resting orders
    pub fn escrowed(&self, asset: &str) -> Decimal {
        let state = self.state.lock();
        [Side::Buy, Side::Sell]
            .into_iter()
            .flat_map(|side| state.book.orders(side))
            .filter(|order| order.escrow_asset() == asset)
            .filter_map(|order| order.escrow_amount().ok())
            .sum()
    }
}
