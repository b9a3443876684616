use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

use crate::domain::enums::ProtectionLeg;
use crate::domain::model::report::TradeReport;

/// Every failure a trade invocation can surface. Nothing is retried.
#[derive(Error, Debug, Clone)]
pub enum TradeError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid percentage {value}: {reason}")]
    InvalidPercentage { value: Decimal, reason: String },

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Exchange rejected request (code {code}): {message}")]
    ExchangeRejected { code: i64, message: String },

    #[error("Invalid exchange response: {0}")]
    InvalidResponse(String),

    #[error("Entry order {order_id} was placed but its fill price is not available: {reason}")]
    FillUnavailable { order_id: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    PartialProtectionFailure(Box<ProtectionFailure>),
}

impl TradeError {
    pub fn invalid_percentage(value: Decimal, reason: impl Into<String>) -> Self {
        TradeError::InvalidPercentage { value, reason: reason.into() }
    }

    pub fn rejected(code: i64, message: impl Into<String>) -> Self {
        TradeError::ExchangeRejected { code, message: message.into() }
    }
}

impl From<reqwest::Error> for TradeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TradeError::NetworkError(format!("request timed out: {}", e))
        } else if e.is_decode() {
            TradeError::InvalidResponse(e.to_string())
        } else {
            TradeError::NetworkError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for TradeError {
    fn from(e: serde_json::Error) -> Self {
        TradeError::InvalidResponse(e.to_string())
    }
}

/// A protective order that could not be placed
#[derive(Debug, Clone)]
pub struct LegFailure {
    pub leg: ProtectionLeg,
    pub trigger_price: Option<Decimal>,
    pub cause: TradeError,
}

/// Entry order filled, but at least one TP/SL leg failed.
/// The position is open and not (fully) protected.
#[derive(Debug, Clone)]
pub struct ProtectionFailure {
    /// Entry fill plus whichever legs did succeed
    pub report: TradeReport,
    pub failures: Vec<LegFailure>,
}

impl ProtectionFailure {
    pub fn failed_legs(&self) -> Vec<ProtectionLeg> {
        self.failures.iter().map(|f| f.leg).collect()
    }

    pub fn failure_for(&self, leg: ProtectionLeg) -> Option<&LegFailure> {
        self.failures.iter().find(|f| f.leg == leg)
    }
}

impl fmt::Display for ProtectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entry order {} filled at {} but protection failed:",
            self.report.entry.order_id, self.report.entry.fill_price
        )?;
        for failure in &self.failures {
            write!(f, " [{}: {}]", failure.leg, failure.cause)?;
        }
        Ok(())
    }
}
