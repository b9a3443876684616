use log::{debug, error};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::errors::TradeError;
use crate::domain::traits::ExchangeApi;

/// Reads available balances through the exchange capability
pub struct BalanceReader {
    exchange: Arc<dyn ExchangeApi>,
}

impl BalanceReader {
    pub fn new(exchange: Arc<dyn ExchangeApi>) -> Self {
        Self { exchange }
    }

    /// Available balance of `coin`; a negative figure from the exchange is an error
    pub async fn available(&self, coin: &str) -> Result<Decimal, TradeError> {
        debug!("Fetching balance for {}", coin);
        let balance = self.exchange.get_balance(coin).await.map_err(|e| {
            error!("Failed to fetch balance for {}: {}", coin, e);
            e
        })?;

        if balance < Decimal::ZERO {
            return Err(TradeError::InvalidResponse(format!(
                "negative balance {} reported for {}",
                balance, coin
            )));
        }
        Ok(balance)
    }
}
