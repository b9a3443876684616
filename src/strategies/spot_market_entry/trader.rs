use log::info;
use std::sync::Arc;

use crate::domain::errors::TradeError;
use crate::domain::model::order::OrderRequest;
use crate::domain::model::report::TradeReport;
use crate::domain::traits::ExchangeApi;

use super::balance_reader::BalanceReader;
use super::order_placer::{OrderPlacer, Protection};
use super::order_sizer::OrderSizer;

/// Entry point for one percentage-of-balance spot trade.
///
/// Every call to [`SpotTrader::execute`] sends a new entry order. There is no
/// deduplication, so calling it twice with the same request trades twice.
pub struct SpotTrader {
    exchange: Arc<dyn ExchangeApi>,
    quote_currency: String,
    balances: BalanceReader,
    placer: OrderPlacer,
}

impl SpotTrader {
    pub fn new(exchange: Arc<dyn ExchangeApi>, quote_currency: impl Into<String>) -> Self {
        Self {
            balances: BalanceReader::new(exchange.clone()),
            placer: OrderPlacer::new(exchange.clone()),
            quote_currency: quote_currency.into(),
            exchange,
        }
    }

    pub async fn execute(&self, request: &OrderRequest) -> Result<TradeReport, TradeError> {
        request.validate()?;

        let symbol = request.symbol(&self.quote_currency);
        info!(
            "Executing {} {} with {}% of {} balance (tp {:?}, sl {:?})",
            request.side, symbol, request.percent_of_balance, self.quote_currency,
            request.tp_percentage, request.sl_percentage
        );

        let balance = self.balances.available(&self.quote_currency).await?;
        let price = self.exchange.get_price(&symbol).await?;
        let rules = self.exchange.get_instrument_rules(&symbol).await?;

        let sized = OrderSizer::size(&rules, request.side, balance, price, request.percent_of_balance)?;

        let protection = Protection {
            take_profit: request.tp_percentage,
            stop_loss: request.sl_percentage,
        };
        self.placer.place(&sized, &rules, &request.coin, protection).await
    }
}
