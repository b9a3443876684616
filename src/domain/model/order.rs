// Domain model for orders
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::constants::PERCENT_SCALE;
use crate::domain::enums::{OrderSide, ProtectionLeg};
use crate::domain::errors::TradeError;

/// Caller's instruction for one trade. Nothing here is persisted.
#[derive(Clone, Debug)]
pub struct OrderRequest {
    /// Base coin, e.g. "BTC"
    pub coin: String,
    pub side: OrderSide,
    /// Share of the quote balance to spend, in (0, 100]
    pub percent_of_balance: Decimal,
    pub tp_percentage: Option<Decimal>,
    pub sl_percentage: Option<Decimal>,
}

impl OrderRequest {
    pub fn new(coin: impl Into<String>, side: OrderSide, percent_of_balance: Decimal) -> Self {
        Self {
            coin: coin.into().to_ascii_uppercase(),
            side,
            percent_of_balance,
            tp_percentage: None,
            sl_percentage: None,
        }
    }

    pub fn with_take_profit(mut self, percentage: Decimal) -> Self {
        self.tp_percentage = Some(percentage);
        self
    }

    pub fn with_stop_loss(mut self, percentage: Decimal) -> Self {
        self.sl_percentage = Some(percentage);
        self
    }

    /// Trading pair against the quote currency, e.g. BTC + USDT -> "BTCUSDT"
    pub fn symbol(&self, quote_currency: &str) -> String {
        format!("{}{}", self.coin, quote_currency)
    }

    /// Reject anything that cannot produce a valid entry plus protection,
    /// before a single request is sent.
    pub fn validate(&self) -> Result<(), TradeError> {
        if self.coin.trim().is_empty() {
            return Err(TradeError::InvalidRequest("coin must not be empty".to_string()));
        }
        check_percent_of_balance(self.percent_of_balance)?;

        if let Some(tp) = self.tp_percentage {
            check_protection_percentage(ProtectionLeg::TakeProfit, self.side, tp)?;
        }
        if let Some(sl) = self.sl_percentage {
            check_protection_percentage(ProtectionLeg::StopLoss, self.side, sl)?;
        }
        Ok(())
    }
}

/// Percent of balance must lie in (0, 100]
pub fn check_percent_of_balance(percent: Decimal) -> Result<(), TradeError> {
    if percent <= Decimal::ZERO || percent > Decimal::from(PERCENT_SCALE) {
        return Err(TradeError::invalid_percentage(
            percent,
            "percent of balance must be in (0, 100]",
        ));
    }
    Ok(())
}

/// TP/SL percentages must be positive, and must not push the trigger price
/// to zero or below (a stop-loss on a long, a take-profit on a short).
pub fn check_protection_percentage(
    leg: ProtectionLeg,
    entry_side: OrderSide,
    percent: Decimal,
) -> Result<(), TradeError> {
    if percent <= Decimal::ZERO {
        return Err(TradeError::invalid_percentage(
            percent,
            format!("{} percentage must be positive", leg),
        ));
    }

    let moves_price_down = matches!(
        (leg, entry_side),
        (ProtectionLeg::StopLoss, OrderSide::Buy) | (ProtectionLeg::TakeProfit, OrderSide::Sell)
    );
    if moves_price_down && percent >= Decimal::from(PERCENT_SCALE) {
        return Err(TradeError::invalid_percentage(
            percent,
            format!("{} percentage must be below 100 for a {} entry", leg, entry_side),
        ));
    }
    Ok(())
}

/// A percentage-of-balance request turned into a concrete quantity.
/// Built once per request and dropped after submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SizedOrder {
    pub symbol: String,
    pub side: OrderSide,
    /// Base-coin quantity, already a multiple of the step size
    pub quantity: Decimal,
    /// Pre-trade quote the quantity was derived from
    pub reference_price: Decimal,
}

impl SizedOrder {
    pub fn notional(&self) -> Decimal {
        self.quantity * self.reference_price
    }
}

/// TP or SL order attached after the entry fills
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConditionalOrder {
    pub symbol: String,
    pub leg: ProtectionLeg,
    /// Always the opposite of the entry side
    pub side: OrderSide,
    pub trigger_price: Decimal,
    pub quantity: Decimal,
}

/// Result of a filled market order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarketFill {
    pub order_id: String,
    /// Average execution price, may differ from the pre-trade quote
    pub fill_price: Decimal,
    pub filled_quantity: Option<Decimal>,
}

/// Acknowledgement of an accepted (not necessarily triggered) order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedOrder {
    pub order_id: String,
}
