use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info, warn};
use reqwest::{Client, RequestBuilder};
use ring::hmac;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::config_loader::ExchangeConfig;
use crate::domain::constants::ORDER_LINK_PREFIX;
use crate::domain::enums::*;
use crate::domain::errors::TradeError;
use crate::domain::model::exchange::InstrumentRules;
use crate::domain::model::order::{ConditionalOrder, MarketFill, PlacedOrder, SizedOrder};
use crate::domain::traits::ExchangeApi;
use crate::infrastructure::exchange::bybit::models::CreateOrderBody;
use crate::infrastructure::exchange::bybit::parsers::BybitParser;

const PATH_WALLET_BALANCE: &str = "/v5/account/wallet-balance";
const PATH_TICKERS: &str = "/v5/market/tickers";
const PATH_INSTRUMENTS: &str = "/v5/market/instruments-info";
const PATH_ORDER_CREATE: &str = "/v5/order/create";
const PATH_ORDER_REALTIME: &str = "/v5/order/realtime";
const PATH_ORDER_HISTORY: &str = "/v5/order/history";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    DEMO,
    #[serde(alias = "testnet")]
    TEST,
    #[serde(alias = "mainnet")]
    PROD,
}

impl Network {
    pub fn url(&self) -> &'static str {
        match self {
            Network::DEMO => "https://api-demo.bybit.com",
            Network::TEST => "https://api-testnet.bybit.com",
            Network::PROD => "https://api.bybit.com",
        }
    }

    /// Suffix of the credential environment variables
    pub fn env_suffix(&self) -> &'static str {
        match self {
            Network::DEMO => "DEMO",
            Network::TEST => "TEST",
            Network::PROD => "PROD",
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::DEMO
    }
}

#[derive(Clone)]
pub struct BybitKeys {
    pub api_key: String,
    api_secret: String,
}

// Keeps the secret out of logs
impl fmt::Debug for BybitKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BybitKeys")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl BybitKeys {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Reads `BYBIT_API_KEY_<NET>` and `BYBIT_API_SECRET_<NET>`
    pub fn from_env(network: &Network) -> Result<Self> {
        let key_var = format!("BYBIT_API_KEY_{}", network.env_suffix());
        let secret_var = format!("BYBIT_API_SECRET_{}", network.env_suffix());

        let api_key = std::env::var(&key_var).map_err(|_| anyhow!("Missing {}", key_var))?;
        let api_secret = std::env::var(&secret_var).map_err(|_| anyhow!("Missing {}", secret_var))?;
        if api_key.trim().is_empty() || api_secret.trim().is_empty() {
            return Err(anyhow!("{} / {} must not be empty", key_var, secret_var));
        }

        Ok(Self::new(api_key.trim(), api_secret.trim()))
    }

    /// V5 signature: hex(HMAC_SHA256(secret, timestamp + key + recv_window + payload))
    pub fn sign(&self, timestamp: i64, recv_window_ms: u64, payload: &str) -> String {
        let message = format!("{}{}{}{}", timestamp, self.api_key, recv_window_ms, payload);
        let key = hmac::Key::new(hmac::HMAC_SHA256, self.api_secret.as_bytes());
        let tag = hmac::sign(&key, message.as_bytes());
        hex::encode(tag.as_ref())
    }
}

/// Encode query parameters in the exact form that gets signed and sent
pub fn build_query(params: &[(&str, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Fresh orderLinkId (36 chars max on Bybit). Never reused, so it does not
/// deduplicate a resubmitted request.
pub fn new_order_link_id() -> String {
    format!("{}-{}", ORDER_LINK_PREFIX, Uuid::new_v4().simple())
}

/// Parse an order lookup for an entry that was already accepted. A payload
/// that cannot be read becomes `FillUnavailable`, so the caller still learns
/// the order id; only an explicit rejection stays `ExchangeRejected`.
fn fill_from_lookup(result: &Value, order_id: &str) -> Result<Option<MarketFill>, TradeError> {
    BybitParser::parse_order_fill(result, order_id).map_err(|e| match e {
        TradeError::ExchangeRejected { .. } => e,
        other => TradeError::FillUnavailable {
            order_id: order_id.to_string(),
            reason: other.to_string(),
        },
    })
}

/// Signed REST client for the Bybit V5 API
pub struct BybitClient {
    http: Client,
    base_url: Url,
    keys: BybitKeys,
    recv_window_ms: u64,
    account_type: String,
}

impl BybitClient {
    pub fn new(config: &ExchangeConfig, keys: BybitKeys) -> Result<Self, TradeError> {
        let base = config.rest_url();
        let base_url = Url::parse(base)
            .map_err(|e| TradeError::Config(format!("invalid base url '{}': {}", base, e)))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| TradeError::Config(format!("failed to build HTTP client: {}", e)))?;

        info!(
            "Initialized BybitClient for {:?} at {} (timeout {} ms)",
            config.network, base_url, config.timeout_ms
        );

        Ok(Self {
            http,
            base_url,
            keys,
            recv_window_ms: config.recv_window_ms,
            account_type: config.account_type.clone(),
        })
    }

    fn endpoint(&self, path: &str, query: Option<&str>) -> Result<Url, TradeError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| TradeError::Config(format!("invalid endpoint {}: {}", path, e)))?;
        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }

    fn with_auth(&self, request: RequestBuilder, payload: &str) -> RequestBuilder {
        let timestamp = Utc::now().timestamp_millis();
        let signature = self.keys.sign(timestamp, self.recv_window_ms, payload);
        request
            .header("X-BAPI-API-KEY", &self.keys.api_key)
            .header("X-BAPI-TIMESTAMP", timestamp.to_string())
            .header("X-BAPI-RECV-WINDOW", self.recv_window_ms.to_string())
            .header("X-BAPI-SIGN", signature)
            .header("X-BAPI-SIGN-TYPE", "2")
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Value, TradeError> {
        let response = request.send().await.map_err(|e| {
            error!("Request to {} failed: {}", path, e);
            TradeError::from(e)
        })?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Response from {} (HTTP {}): {}", path, status, body);

        BybitParser::parse_envelope(status, &body).map_err(|e| {
            warn!("{} returned an error: {}", path, e);
            e
        })
    }

    async fn public_get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, TradeError> {
        let query = build_query(params);
        let url = self.endpoint(path, Some(&query))?;
        debug!("GET {}", url);
        self.send(self.http.get(url), path).await
    }

    async fn private_get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, TradeError> {
        let query = build_query(params);
        let url = self.endpoint(path, Some(&query))?;
        debug!("GET {} (signed)", url);
        let request = self.with_auth(self.http.get(url), &query);
        self.send(request, path).await
    }

    async fn private_post(&self, path: &str, body: &CreateOrderBody) -> Result<Value, TradeError> {
        let payload = serde_json::to_string(body)?;
        let url = self.endpoint(path, None)?;
        debug!("POST {} {}", url, payload);
        let request = self
            .with_auth(self.http.post(url), &payload)
            .header("Content-Type", "application/json")
            .body(payload);
        self.send(request, path).await
    }

    /// One lookup in open/recent orders, then one in history. No polling.
    async fn fetch_fill(&self, order_id: &str) -> Result<MarketFill, TradeError> {
        let params = [
            ("category", Category::Spot.as_str().to_string()),
            ("orderId", order_id.to_string()),
        ];

        for path in [PATH_ORDER_REALTIME, PATH_ORDER_HISTORY] {
            let result = self.private_get(path, &params).await.map_err(|e| {
                TradeError::FillUnavailable {
                    order_id: order_id.to_string(),
                    reason: e.to_string(),
                }
            })?;
            if let Some(fill) = fill_from_lookup(&result, order_id)? {
                return Ok(fill);
            }
            debug!("Order {} has no average price in {}", order_id, path);
        }

        Err(TradeError::FillUnavailable {
            order_id: order_id.to_string(),
            reason: "order lookup returned no average price".to_string(),
        })
    }

    async fn create_order(&self, body: CreateOrderBody) -> Result<String, TradeError> {
        let result = self.private_post(PATH_ORDER_CREATE, &body).await?;
        BybitParser::parse_order_id(&result)
    }
}

#[async_trait]
impl ExchangeApi for BybitClient {
    async fn get_balance(&self, coin: &str) -> Result<Decimal, TradeError> {
        let params = [
            ("accountType", self.account_type.clone()),
            ("coin", coin.to_string()),
        ];
        let result = self.private_get(PATH_WALLET_BALANCE, &params).await?;
        let balance = BybitParser::parse_wallet_balance(&result, coin)?;
        info!("Available balance for {}: {}", coin, balance);
        Ok(balance)
    }

    async fn get_price(&self, symbol: &str) -> Result<Decimal, TradeError> {
        let params = [
            ("category", Category::Spot.as_str().to_string()),
            ("symbol", symbol.to_string()),
        ];
        let result = self.public_get(PATH_TICKERS, &params).await?;
        BybitParser::parse_last_price(&result, symbol)
    }

    async fn get_instrument_rules(&self, symbol: &str) -> Result<InstrumentRules, TradeError> {
        let params = [
            ("category", Category::Spot.as_str().to_string()),
            ("symbol", symbol.to_string()),
        ];
        let result = self.public_get(PATH_INSTRUMENTS, &params).await?;
        let rules = BybitParser::parse_instrument_rules(&result, symbol)?;
        debug!("Instrument rules for {}: {:?}", symbol, rules);
        Ok(rules)
    }

    async fn place_market_order(&self, order: &SizedOrder) -> Result<MarketFill, TradeError> {
        let body = CreateOrderBody {
            category: Category::Spot,
            symbol: order.symbol.clone(),
            side: order.side,
            order_type: OrderType::Market,
            qty: order.quantity,
            market_unit: Some(MarketUnit::BaseCoin),
            order_filter: None,
            trigger_price: None,
            order_link_id: new_order_link_id(),
        };
        info!(
            "Placing market {} {} {} (link id {})",
            order.side, order.quantity, order.symbol, body.order_link_id
        );

        let order_id = self.create_order(body).await?;
        info!("Market order accepted: {}", order_id);

        let fill = self.fetch_fill(&order_id).await?;
        info!("Market order {} filled at {}", fill.order_id, fill.fill_price);
        Ok(fill)
    }

    async fn place_conditional_order(&self, order: &ConditionalOrder) -> Result<PlacedOrder, TradeError> {
        let body = CreateOrderBody {
            category: Category::Spot,
            symbol: order.symbol.clone(),
            side: order.side,
            order_type: OrderType::Market,
            qty: order.quantity,
            market_unit: Some(MarketUnit::BaseCoin),
            order_filter: Some(OrderFilter::StopOrder),
            trigger_price: Some(order.trigger_price),
            order_link_id: new_order_link_id(),
        };
        info!(
            "Placing {} for {}: {} {} @ trigger {}",
            order.leg, order.symbol, order.side, order.quantity, order.trigger_price
        );

        let order_id = self.create_order(body).await?;
        info!("{} order accepted: {}", order.leg, order_id);
        Ok(PlacedOrder { order_id })
    }
}
