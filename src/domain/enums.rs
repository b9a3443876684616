use serde::{Serialize, Serializer};
use anyhow::{Result, anyhow};
use std::fmt;

// Bybit expects capitalised sides ("Buy"/"Sell") on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Side that closes a position opened with `self`
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "Buy",
            OrderSide::Sell => "Sell",
        }
    }
}

impl Serialize for OrderSide {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderType {
    Market,
}

impl Serialize for OrderType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            OrderType::Market => serializer.serialize_str("Market"),
        }
    }
}

/// Product category of the V5 API. Only spot is traded here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Spot,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Spot => "spot",
        }
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Which unit `qty` is expressed in for spot market orders
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarketUnit {
    BaseCoin,
}

impl Serialize for MarketUnit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MarketUnit::BaseCoin => serializer.serialize_str("baseCoin"),
        }
    }
}

/// Spot order filter. `StopOrder` makes the order conditional on `triggerPrice`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderFilter {
    StopOrder,
}

impl Serialize for OrderFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            OrderFilter::StopOrder => serializer.serialize_str("StopOrder"),
        }
    }
}

/// The two protective legs that may follow an entry order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ProtectionLeg {
    TakeProfit,
    StopLoss,
}

impl fmt::Display for ProtectionLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtectionLeg::TakeProfit => f.write_str("take-profit"),
            ProtectionLeg::StopLoss => f.write_str("stop-loss"),
        }
    }
}

// Lifecycle of an order as reported by order lookups
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Cancelled,
    PartiallyFilledCanceled,
    Rejected,
    Untriggered,
    Triggered,
    Deactivated,
}

impl OrderStatus {
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "New" => Ok(OrderStatus::New),
            "PartiallyFilled" => Ok(OrderStatus::PartiallyFilled),
            "Filled" => Ok(OrderStatus::Filled),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            "PartiallyFilledCanceled" => Ok(OrderStatus::PartiallyFilledCanceled),
            "Rejected" => Ok(OrderStatus::Rejected),
            "Untriggered" => Ok(OrderStatus::Untriggered),
            "Triggered" => Ok(OrderStatus::Triggered),
            "Deactivated" => Ok(OrderStatus::Deactivated),
            _ => Err(anyhow!("Unknown order status: {}", s)),
        }
    }

    /// True once some quantity has executed
    pub fn has_fills(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::PartiallyFilled | OrderStatus::PartiallyFilledCanceled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_side_flips() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }

    #[test]
    fn wire_values_match_v5_api() {
        assert_eq!(serde_json::to_string(&OrderSide::Sell).unwrap(), "\"Sell\"");
        assert_eq!(serde_json::to_string(&MarketUnit::BaseCoin).unwrap(), "\"baseCoin\"");
        assert_eq!(serde_json::to_string(&OrderFilter::StopOrder).unwrap(), "\"StopOrder\"");
        assert_eq!(serde_json::to_string(&Category::Spot).unwrap(), "\"spot\"");
    }
}
