mod account;
mod order;
mod side;
mod trade;

pub use account::{Account, AccountError, AccountId};
pub use order::{Order, OrderError, OrderId, OrderRequest, OrderResult};
pub use side::Side;
pub use trade::{Trade, TradeId};
