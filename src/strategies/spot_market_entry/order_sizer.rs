use log::info;
use rust_decimal::Decimal;

use crate::domain::constants::{LOCAL_REJECTION_CODE, PERCENT_SCALE};
use crate::domain::enums::OrderSide;
use crate::domain::errors::TradeError;
use crate::domain::model::exchange::InstrumentRules;
use crate::domain::model::order::{check_percent_of_balance, SizedOrder};

/// Turns a percentage of the quote balance into a tradable base quantity.
/// Pure: every input is fetched beforehand.
pub struct OrderSizer;

impl OrderSizer {
    /// notional = balance * percent / 100, quantity = notional / price rounded
    /// down to the step size, then checked against the instrument minimums.
    pub fn size(
        rules: &InstrumentRules,
        side: OrderSide,
        balance: Decimal,
        price: Decimal,
        percent_of_balance: Decimal,
    ) -> Result<SizedOrder, TradeError> {
        check_percent_of_balance(percent_of_balance)?;
        rules.check()?;

        if price <= Decimal::ZERO {
            return Err(TradeError::InvalidResponse(format!(
                "{}: price must be positive, got {}",
                rules.symbol, price
            )));
        }
        if balance < Decimal::ZERO {
            return Err(TradeError::InvalidResponse(format!("negative balance {}", balance)));
        }

        let notional = balance
            .checked_mul(percent_of_balance)
            .map(|v| v / Decimal::from(PERCENT_SCALE))
            .ok_or_else(|| TradeError::InvalidResponse(format!("notional overflow for balance {}", balance)))?;
        let raw_quantity = notional
            .checked_div(price)
            .ok_or_else(|| TradeError::InvalidResponse(format!("quantity overflow at price {}", price)))?;
        let quantity = rules.floor_to_step(raw_quantity)?;

        if quantity <= Decimal::ZERO || quantity < rules.min_quantity {
            return Err(TradeError::InsufficientBalance(format!(
                "{}% of {} buys {} {} at {}, below the minimum quantity {}",
                percent_of_balance, balance, quantity, rules.symbol, price, rules.min_quantity
            )));
        }

        let order_notional = quantity * price;
        if order_notional < rules.min_notional {
            return Err(TradeError::InsufficientBalance(format!(
                "order value {} for {} is below the minimum notional {}",
                order_notional, rules.symbol, rules.min_notional
            )));
        }

        if let Some(max) = rules.max_quantity {
            if quantity > max {
                return Err(TradeError::rejected(
                    LOCAL_REJECTION_CODE,
                    format!("quantity {} exceeds the maximum {} for {}", quantity, max, rules.symbol),
                ));
            }
        }

        info!(
            "Sized {} {}: {} of balance {} -> notional {} -> quantity {} at {}",
            side, rules.symbol, percent_of_balance, balance, notional, quantity, price
        );

        Ok(SizedOrder {
            symbol: rules.symbol.clone(),
            side,
            quantity,
            reference_price: price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc_rules() -> InstrumentRules {
        InstrumentRules {
            symbol: "BTCUSDT".to_string(),
            min_quantity: dec!(0.000048),
            max_quantity: Some(dec!(71.73956243)),
            step_size: dec!(0.000001),
            min_notional: dec!(1),
            tick_size: dec!(0.01),
        }
    }

    #[test]
    fn quantity_is_floored_to_step() {
        // 10% of 1000 = 100 USDT at 30000 -> 0.00333333.. -> 0.003333
        let sized = OrderSizer::size(&btc_rules(), OrderSide::Buy, dec!(1000), dec!(30000), dec!(10)).unwrap();
        assert_eq!(sized.quantity, dec!(0.003333));
        assert_eq!(sized.symbol, "BTCUSDT");
        assert_eq!(sized.side, OrderSide::Buy);
        assert_eq!(sized.reference_price, dec!(30000));
    }

    #[test]
    fn notional_never_exceeds_requested_share() {
        let rules = btc_rules();
        let cases = [
            (dec!(1000), dec!(30000), dec!(10)),
            (dec!(57.123), dec!(61234.56), dec!(100)),
            (dec!(250000), dec!(0.37), dec!(0.5)),
            (dec!(1), dec!(1), dec!(100)),
            (dec!(999.99), dec!(3.3333), dec!(33.3)),
        ];
        for (balance, price, percent) in cases {
            let budget = balance * percent / dec!(100);
            match OrderSizer::size(&rules, OrderSide::Sell, balance, price, percent) {
                Ok(sized) => {
                    assert!(sized.quantity > Decimal::ZERO);
                    assert!(sized.quantity * price <= budget, "{} * {} > {}", sized.quantity, price, budget);
                    // One more step would overshoot the budget
                    assert!((sized.quantity + rules.step_size) * price > budget);
                    assert_eq!(sized.quantity % rules.step_size, Decimal::ZERO);
                }
                Err(TradeError::InsufficientBalance(_)) | Err(TradeError::ExchangeRejected { .. }) => {}
                Err(other) => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn percentage_outside_range_is_rejected_first() {
        for percent in [dec!(0), dec!(-1), dec!(100.0001)] {
            // Even with a zero balance and a nonsense price the percentage wins
            let err = OrderSizer::size(&btc_rules(), OrderSide::Buy, dec!(0), dec!(0), percent).unwrap_err();
            assert!(matches!(err, TradeError::InvalidPercentage { .. }), "got {:?}", err);
        }
    }

    #[test]
    fn below_minimum_quantity_is_insufficient_balance() {
        // 1 USDT at 30000 -> 0.000033 < 0.000048
        let err = OrderSizer::size(&btc_rules(), OrderSide::Buy, dec!(10), dec!(30000), dec!(10)).unwrap_err();
        assert!(matches!(err, TradeError::InsufficientBalance(_)));
    }

    #[test]
    fn zero_balance_is_insufficient_balance() {
        let err = OrderSizer::size(&btc_rules(), OrderSide::Buy, dec!(0), dec!(30000), dec!(50)).unwrap_err();
        assert!(matches!(err, TradeError::InsufficientBalance(_)));
    }

    #[test]
    fn below_minimum_notional_is_insufficient_balance() {
        let mut rules = btc_rules();
        rules.min_quantity = Decimal::ZERO;
        rules.min_notional = dec!(5);
        // 4 USDT budget clears the quantity floor but not the notional floor
        let err = OrderSizer::size(&rules, OrderSide::Buy, dec!(40), dec!(30000), dec!(10)).unwrap_err();
        assert!(matches!(err, TradeError::InsufficientBalance(_)));
    }

    #[test]
    fn above_maximum_quantity_is_rejected_locally() {
        let err = OrderSizer::size(&btc_rules(), OrderSide::Buy, dec!(10000000), dec!(1000), dec!(100)).unwrap_err();
        match err {
            TradeError::ExchangeRejected { code, .. } => assert_eq!(code, LOCAL_REJECTION_CODE),
            other => panic!("Expected ExchangeRejected, got {:?}", other),
        }
    }

    #[test]
    fn zero_step_size_is_invalid_response() {
        let mut rules = btc_rules();
        rules.step_size = Decimal::ZERO;
        let err = OrderSizer::size(&rules, OrderSide::Buy, dec!(1000), dec!(10), dec!(10)).unwrap_err();
        assert!(matches!(err, TradeError::InvalidResponse(_)), "got {:?}", err);
    }

    #[test]
    fn huge_balance_overflow_is_invalid_response() {
        let mut rules = btc_rules();
        rules.step_size = dec!(0.00000001);
        rules.max_quantity = None;
        let err = OrderSizer::size(&rules, OrderSide::Buy, dec!(10000000000000000000000), dec!(1), dec!(100))
            .unwrap_err();
        assert!(matches!(err, TradeError::InvalidResponse(_)), "got {:?}", err);
    }

    #[test]
    fn non_positive_price_is_invalid_response() {
        let err = OrderSizer::size(&btc_rules(), OrderSide::Buy, dec!(1000), dec!(0), dec!(10)).unwrap_err();
        assert!(matches!(err, TradeError::InvalidResponse(_)));
    }
}
