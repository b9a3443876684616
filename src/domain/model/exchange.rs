use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::errors::TradeError;

/// Trading constraints of one instrument, as published by the exchange
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentRules {
    pub symbol: String,
    pub min_quantity: Decimal,
    pub max_quantity: Option<Decimal>,
    /// Quantity increment
    pub step_size: Decimal,
    pub min_notional: Decimal,
    /// Price increment
    pub tick_size: Decimal,
}

impl InstrumentRules {
    /// Step and tick are divisors later on, so both must be positive
    pub fn check(&self) -> Result<(), TradeError> {
        if self.step_size <= Decimal::ZERO {
            return Err(TradeError::InvalidResponse(format!(
                "{}: step size must be positive, got {}",
                self.symbol, self.step_size
            )));
        }
        if self.tick_size <= Decimal::ZERO {
            return Err(TradeError::InvalidResponse(format!(
                "{}: tick size must be positive, got {}",
                self.symbol, self.tick_size
            )));
        }
        Ok(())
    }

    pub fn validated(self) -> Result<Self, TradeError> {
        self.check()?;
        Ok(self)
    }

    /// Round a quantity down to the step size
    pub fn floor_to_step(&self, quantity: Decimal) -> Result<Decimal, TradeError> {
        let steps = quantity.checked_div(self.step_size).ok_or_else(|| {
            TradeError::InvalidResponse(format!(
                "{}: quantity {} does not fit step {}",
                self.symbol, quantity, self.step_size
            ))
        })?;
        steps
            .floor()
            .checked_mul(self.step_size)
            .map(|q| q.normalize())
            .ok_or_else(|| TradeError::InvalidResponse(format!("{}: quantity {} overflows", self.symbol, quantity)))
    }

    /// Round a price to the nearest tick
    pub fn round_to_tick(&self, price: Decimal) -> Result<Decimal, TradeError> {
        let ticks = price.checked_div(self.tick_size).ok_or_else(|| {
            TradeError::InvalidResponse(format!(
                "{}: price {} does not fit tick {}",
                self.symbol, price, self.tick_size
            ))
        })?;
        ticks
            .round()
            .checked_mul(self.tick_size)
            .map(|p| p.normalize())
            .ok_or_else(|| TradeError::InvalidResponse(format!("{}: price {} overflows", self.symbol, price)))
    }
}
