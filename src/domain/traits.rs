use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::errors::TradeError;
use crate::domain::model::exchange::InstrumentRules;
use crate::domain::model::order::{ConditionalOrder, MarketFill, PlacedOrder, SizedOrder};

/// Everything the trading core needs from an exchange.
/// Implementations own transport, authentication and signing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Available balance of a single coin
    async fn get_balance(&self, coin: &str) -> Result<Decimal, TradeError>;

    /// Last traded price of a symbol
    async fn get_price(&self, symbol: &str) -> Result<Decimal, TradeError>;

    async fn get_instrument_rules(&self, symbol: &str) -> Result<InstrumentRules, TradeError>;

    /// Submit a market order and report how it filled
    async fn place_market_order(&self, order: &SizedOrder) -> Result<MarketFill, TradeError>;

    async fn place_conditional_order(&self, order: &ConditionalOrder) -> Result<PlacedOrder, TradeError>;
}
