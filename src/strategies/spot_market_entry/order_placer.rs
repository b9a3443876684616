use log::{error, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::constants::PERCENT_SCALE;
use crate::domain::enums::{OrderSide, ProtectionLeg};
use crate::domain::errors::{LegFailure, ProtectionFailure, TradeError};
use crate::domain::model::exchange::InstrumentRules;
use crate::domain::model::order::{ConditionalOrder, MarketFill, PlacedOrder, SizedOrder};
use crate::domain::model::report::TradeReport;
use crate::domain::traits::ExchangeApi;

use super::balance_reader::BalanceReader;

/// Optional TP/SL percentages attached to an entry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Protection {
    pub take_profit: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
}

impl Protection {
    pub fn is_empty(&self) -> bool {
        self.take_profit.is_none() && self.stop_loss.is_none()
    }

    /// Requested legs in submission order: take-profit first, then stop-loss
    pub fn legs(&self) -> Vec<(ProtectionLeg, Decimal)> {
        let mut legs = Vec::with_capacity(2);
        if let Some(tp) = self.take_profit {
            legs.push((ProtectionLeg::TakeProfit, tp));
        }
        if let Some(sl) = self.stop_loss {
            legs.push((ProtectionLeg::StopLoss, sl));
        }
        legs
    }
}

/// Trigger price of a protective leg, before tick rounding.
///
/// A take-profit sits above the fill for a long and below it for a short;
/// a stop-loss is the mirror image.
pub fn trigger_price(
    leg: ProtectionLeg,
    entry_side: OrderSide,
    fill_price: Decimal,
    percent: Decimal,
) -> Result<Decimal, TradeError> {
    let offset = percent / Decimal::from(PERCENT_SCALE);
    let price_rises = matches!(
        (leg, entry_side),
        (ProtectionLeg::TakeProfit, OrderSide::Buy) | (ProtectionLeg::StopLoss, OrderSide::Sell)
    );
    let factor = if price_rises {
        Decimal::ONE.checked_add(offset)
    } else {
        Decimal::ONE.checked_sub(offset)
    };
    factor
        .and_then(|f| fill_price.checked_mul(f))
        .ok_or_else(|| {
            TradeError::invalid_percentage(percent, format!("{} trigger from fill {} overflows", leg, fill_price))
        })
}

/// Submits the entry market order and, when asked, its TP/SL orders.
/// One-shot: nothing is retried and nothing is watched after submission.
pub struct OrderPlacer {
    exchange: Arc<dyn ExchangeApi>,
    balances: BalanceReader,
}

impl OrderPlacer {
    pub fn new(exchange: Arc<dyn ExchangeApi>) -> Self {
        Self {
            balances: BalanceReader::new(exchange.clone()),
            exchange,
        }
    }

    /// Place `order`, then each requested protective leg.
    ///
    /// An entry failure is returned as is. Once the entry has filled, a failed
    /// leg never undoes it: the result is `PartialProtectionFailure` with the
    /// entry fill and every leg that did go through.
    pub async fn place(
        &self,
        order: &SizedOrder,
        rules: &InstrumentRules,
        base_coin: &str,
        protection: Protection,
    ) -> Result<TradeReport, TradeError> {
        info!(
            "Submitting entry {} {} {} (about {} notional)",
            order.side, order.quantity, order.symbol, order.notional()
        );
        let fill = self.exchange.place_market_order(order).await.map_err(|e| {
            error!("Entry order for {} failed: {}", order.symbol, e);
            e
        })?;
        info!(
            "Entry {} {} {} filled at {} (order {})",
            order.side, order.quantity, order.symbol, fill.fill_price, fill.order_id
        );

        let mut report = TradeReport::new(order.symbol.clone(), order.side, order.quantity, fill.clone());
        if protection.is_empty() {
            return Ok(report);
        }

        let mut failures = Vec::new();
        match self.protection_quantity(order, &fill, rules, base_coin).await {
            Ok(quantity) => {
                for (leg, percent) in protection.legs() {
                    match self.place_leg(order, &fill, rules, leg, percent, quantity).await {
                        Ok(placed) => match leg {
                            ProtectionLeg::TakeProfit => report.take_profit = Some(placed),
                            ProtectionLeg::StopLoss => report.stop_loss = Some(placed),
                        },
                        Err(failure) => failures.push(failure),
                    }
                }
            }
            Err(cause) => {
                error!("Cannot size protection for {}: {}", order.symbol, cause);
                for (leg, _) in protection.legs() {
                    failures.push(LegFailure { leg, trigger_price: None, cause: cause.clone() });
                }
            }
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            let failure = ProtectionFailure { report, failures };
            warn!("Position left without full protection: {}", failure);
            Err(TradeError::PartialProtectionFailure(Box::new(failure)))
        }
    }

    async fn place_leg(
        &self,
        order: &SizedOrder,
        fill: &MarketFill,
        rules: &InstrumentRules,
        leg: ProtectionLeg,
        percent: Decimal,
        quantity: Decimal,
    ) -> Result<PlacedOrder, LegFailure> {
        let trigger = trigger_price(leg, order.side, fill.fill_price, percent)
            .and_then(|raw| rules.round_to_tick(raw))
            .map_err(|cause| LegFailure { leg, trigger_price: None, cause })?;
        if trigger <= Decimal::ZERO {
            return Err(LegFailure {
                leg,
                trigger_price: Some(trigger),
                cause: TradeError::invalid_percentage(percent, format!("{} trigger price {} is not positive", leg, trigger)),
            });
        }

        let conditional = ConditionalOrder {
            symbol: order.symbol.clone(),
            leg,
            side: order.side.opposite(),
            trigger_price: trigger,
            quantity,
        };

        self.exchange.place_conditional_order(&conditional).await.map_err(|cause| {
            error!("{} order for {} at {} failed: {}", leg, order.symbol, trigger, cause);
            LegFailure { leg, trigger_price: Some(trigger), cause }
        })
    }

    /// Quantity the protective orders close.
    ///
    /// After a buy, spot fees come out of the bought coin, so the held balance
    /// caps the quantity. After a sell the executed quantity is bought back.
    async fn protection_quantity(
        &self,
        order: &SizedOrder,
        fill: &MarketFill,
        rules: &InstrumentRules,
        base_coin: &str,
    ) -> Result<Decimal, TradeError> {
        let executed = fill.filled_quantity.filter(|q| *q > Decimal::ZERO).unwrap_or(order.quantity);
        let quantity = match order.side {
            OrderSide::Buy => {
                let held = self.balances.available(base_coin).await?;
                rules.floor_to_step(executed.min(held))?
            }
            OrderSide::Sell => rules.floor_to_step(executed)?,
        };

        if quantity <= Decimal::ZERO {
            return Err(TradeError::InsufficientBalance(format!(
                "no {} available to protect after the entry",
                base_coin
            )));
        }
        Ok(quantity)
    }
}
