use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::domain::constants::LOCAL_REJECTION_CODE;
use crate::domain::enums::OrderStatus;
use crate::domain::errors::TradeError;
use crate::domain::model::exchange::InstrumentRules;
use crate::domain::model::order::MarketFill;
use crate::infrastructure::exchange::bybit::models::BybitResponse;

/// retCodes that mean the key, signature or permissions are wrong
pub const AUTH_RET_CODES: &[i64] = &[10003, 10004, 10005, 10007, 33004];

/// Turns raw V5 payloads into domain values
pub struct BybitParser;

impl BybitParser {
    /// Unwrap the `{retCode, retMsg, result}` envelope, mapping failures to error kinds
    pub fn parse_envelope(status: u16, body: &str) -> Result<Value, TradeError> {
        if status == 401 || status == 403 {
            return Err(TradeError::AuthError(format!("HTTP {}: {}", status, body.trim())));
        }

        let response: BybitResponse = serde_json::from_str(body).map_err(|e| {
            TradeError::InvalidResponse(format!("HTTP {} with unparseable body ({}): {}", status, e, body.trim()))
        })?;

        match response.ret_code {
            0 => Ok(response.result),
            code if AUTH_RET_CODES.contains(&code) => Err(TradeError::AuthError(format!(
                "retCode {}: {}",
                code, response.ret_msg
            ))),
            code => Err(TradeError::rejected(code, response.ret_msg)),
        }
    }

    /// Available balance of `coin` from a wallet-balance result.
    /// A coin missing from the wallet has a balance of zero.
    pub fn parse_wallet_balance(result: &Value, coin: &str) -> Result<Decimal, TradeError> {
        let accounts = list_field(result)?;
        let Some(account) = accounts.first() else {
            return Err(TradeError::InvalidResponse("wallet-balance: empty account list".to_string()));
        };

        let coins = account
            .get("coin")
            .and_then(|v| v.as_array())
            .ok_or_else(|| TradeError::InvalidResponse("wallet-balance: missing coin list".to_string()))?;

        let Some(entry) = coins
            .iter()
            .find(|c| c.get("coin").and_then(|v| v.as_str()) == Some(coin))
        else {
            return Ok(Decimal::ZERO);
        };

        // availableToWithdraw is blank on unified accounts, fall back to wallet minus locked
        if let Some(available) = opt_decimal_field(entry, "availableToWithdraw")? {
            return Ok(available);
        }
        let wallet = decimal_field(entry, "walletBalance")?;
        let locked = opt_decimal_field(entry, "locked")?.unwrap_or(Decimal::ZERO);
        Ok((wallet - locked).max(Decimal::ZERO))
    }

    /// `lastPrice` of the ticker matching `symbol`
    pub fn parse_last_price(result: &Value, symbol: &str) -> Result<Decimal, TradeError> {
        let ticker = find_symbol(list_field(result)?, symbol)
            .ok_or_else(|| TradeError::InvalidResponse(format!("tickers: no entry for {}", symbol)))?;
        decimal_field(ticker, "lastPrice")
    }

    /// Lot-size and price filters of `symbol`
    pub fn parse_instrument_rules(result: &Value, symbol: &str) -> Result<InstrumentRules, TradeError> {
        let instrument = find_symbol(list_field(result)?, symbol)
            .ok_or_else(|| TradeError::InvalidResponse(format!("instruments-info: no entry for {}", symbol)))?;

        if let Some(status) = instrument.get("status").and_then(|v| v.as_str()) {
            if status != "Trading" {
                return Err(TradeError::rejected(
                    LOCAL_REJECTION_CODE,
                    format!("{} is not open for trading (status {})", symbol, status),
                ));
            }
        }

        let lot = instrument
            .get("lotSizeFilter")
            .ok_or_else(|| TradeError::InvalidResponse(format!("{}: missing lotSizeFilter", symbol)))?;
        let price_filter = instrument
            .get("priceFilter")
            .ok_or_else(|| TradeError::InvalidResponse(format!("{}: missing priceFilter", symbol)))?;

        InstrumentRules {
            symbol: symbol.to_string(),
            min_quantity: opt_decimal_field(lot, "minOrderQty")?.unwrap_or(Decimal::ZERO),
            max_quantity: opt_decimal_field(lot, "maxOrderQty")?,
            step_size: decimal_field(lot, "basePrecision")?,
            min_notional: opt_decimal_field(lot, "minOrderAmt")?.unwrap_or(Decimal::ZERO),
            tick_size: decimal_field(price_filter, "tickSize")?,
        }
        .validated()
    }

    /// `orderId` of an order/create result
    pub fn parse_order_id(result: &Value) -> Result<String, TradeError> {
        result
            .get("orderId")
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| TradeError::InvalidResponse("order/create: missing orderId".to_string()))
    }

    /// Fill of `order_id` from an order lookup, `None` when the order is not
    /// listed yet or has no average price.
    pub fn parse_order_fill(result: &Value, order_id: &str) -> Result<Option<MarketFill>, TradeError> {
        let orders = list_field(result)?;
        let Some(order) = orders
            .iter()
            .find(|o| o.get("orderId").and_then(|v| v.as_str()) == Some(order_id))
        else {
            return Ok(None);
        };

        if let Some(status) = order.get("orderStatus").and_then(|v| v.as_str()) {
            let status = OrderStatus::from_str(status)
                .map_err(|e| TradeError::InvalidResponse(e.to_string()))?;
            if matches!(status, OrderStatus::Rejected) {
                return Err(TradeError::rejected(
                    LOCAL_REJECTION_CODE,
                    format!("order {} was rejected by the matching engine", order_id),
                ));
            }
            if !status.has_fills() {
                return Ok(None);
            }
        }

        let fill_price = match opt_decimal_field(order, "avgPrice")? {
            Some(price) if price > Decimal::ZERO => price,
            _ => return Ok(None),
        };

        Ok(Some(MarketFill {
            order_id: order_id.to_string(),
            fill_price,
            filled_quantity: opt_decimal_field(order, "cumExecQty")?,
        }))
    }
}

fn list_field(result: &Value) -> Result<&Vec<Value>, TradeError> {
    result
        .get("list")
        .and_then(|v| v.as_array())
        .ok_or_else(|| TradeError::InvalidResponse("missing result.list".to_string()))
}

fn find_symbol<'a>(list: &'a [Value], symbol: &str) -> Option<&'a Value> {
    list.iter()
        .find(|item| item.get("symbol").and_then(|v| v.as_str()) == Some(symbol))
}

/// Decimal that may be absent, null or blank
fn opt_decimal_field(data: &Value, field: &str) -> Result<Option<Decimal>, TradeError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Decimal::from_str(s.trim())
            .map(Some)
            .map_err(|e| TradeError::InvalidResponse(format!("{}: '{}' is not a decimal ({})", field, s, e))),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .map(Some)
            .map_err(|e| TradeError::InvalidResponse(format!("{}: {} is not a decimal ({})", field, n, e))),
        Some(other) => Err(TradeError::InvalidResponse(format!("{}: unexpected value {}", field, other))),
    }
}

fn decimal_field(data: &Value, field: &str) -> Result<Decimal, TradeError> {
    opt_decimal_field(data, field)?
        .ok_or_else(|| TradeError::InvalidResponse(format!("missing {}", field)))
}
