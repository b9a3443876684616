use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::enums::OrderSide;
use crate::domain::model::order::{MarketFill, PlacedOrder};

/// Outcome of one trade invocation: the filled entry and any protective orders
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TradeReport {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub entry: MarketFill,
    pub take_profit: Option<PlacedOrder>,
    pub stop_loss: Option<PlacedOrder>,
}

impl TradeReport {
    pub fn new(symbol: String, side: OrderSide, quantity: Decimal, entry: MarketFill) -> Self {
        Self {
            symbol,
            side,
            quantity,
            entry,
            take_profit: None,
            stop_loss: None,
        }
    }
}
