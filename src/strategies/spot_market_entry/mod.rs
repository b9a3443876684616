//! Spot Market Entry Strategy Module
//!
//! Sizes a spot market order as a share of the quote balance, places it,
//! and optionally attaches take-profit / stop-loss conditional orders.

mod balance_reader;
mod order_placer;
mod order_sizer;
pub mod trader;


pub use balance_reader::BalanceReader;
pub use order_placer::{trigger_price, OrderPlacer, Protection};
pub use order_sizer::OrderSizer;
pub use trader::SpotTrader;
