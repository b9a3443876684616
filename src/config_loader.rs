use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::domain::constants::*;
use crate::infrastructure::exchange::bybit::client::Network;

/// Top-level configuration structure containing all config sections
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub trading: TradingConfig,
}

/// Connection settings for the exchange. Credentials never live here.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default)]
    pub network: Network,

    /// Overrides the network's default REST endpoint
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_account_type")]
    pub account_type: String,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            base_url: None,
            recv_window_ms: default_recv_window_ms(),
            timeout_ms: default_timeout_ms(),
            account_type: default_account_type(),
        }
    }
}

impl ExchangeConfig {
    /// REST endpoint actually used, after applying any override
    pub fn rest_url(&self) -> &str {
        match &self.base_url {
            Some(url) => url,
            None => self.network.url(),
        }
    }
}

/// What gets traded against what
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            quote_currency: default_quote_currency(),
        }
    }
}

fn default_recv_window_ms() -> u64 {
    DEFAULT_RECV_WINDOW_MS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_account_type() -> String {
    DEFAULT_ACCOUNT_TYPE.to_string()
}

fn default_quote_currency() -> String {
    DEFAULT_QUOTE_CURRENCY.to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config_str = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        info!("Loaded configuration from {}", path.display());
        debug!("Exchange network: {:?}", config.exchange.network);

        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(config_str)?;
        config.trading.quote_currency = config.trading.quote_currency.trim().to_ascii_uppercase();
        config.validate()?;
        Ok(config)
    }

    /// Try each candidate path in order; fall back to defaults when none exists.
    /// A file that exists but does not parse is an error.
    pub fn load_first<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                return Self::from_file(path);
            }
            debug!("No config at {}", path.display());
        }
        warn!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.trading.quote_currency.is_empty() {
            return Err(anyhow!("trading.quote_currency must not be empty"));
        }
        if self.exchange.timeout_ms == 0 {
            return Err(anyhow!("exchange.timeout_ms must be positive"));
        }
        if self.exchange.recv_window_ms == 0 {
            return Err(anyhow!("exchange.recv_window_ms must be positive"));
        }
        Ok(())
    }
}
