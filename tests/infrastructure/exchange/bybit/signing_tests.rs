use rust_decimal_macros::dec;
use bybit_spot_bot::domain::enums::{Category, MarketUnit, OrderFilter, OrderSide, OrderType};
use bybit_spot_bot::infrastructure::exchange::bybit::client::{build_query, new_order_link_id, BybitKeys};
use bybit_spot_bot::infrastructure::exchange::bybit::models::CreateOrderBody;

const TIMESTAMP: i64 = 1_700_000_000_000;
const RECV_WINDOW: u64 = 5000;

#[test]
fn test_sign_get_query_matches_known_vector() {
    let keys = BybitKeys::new("test-key", "test-secret");
    let query = build_query(&[
        ("accountType", "UNIFIED".to_string()),
        ("coin", "USDT".to_string()),
    ]);
    assert_eq!(query, "accountType=UNIFIED&coin=USDT");

    let signature = keys.sign(TIMESTAMP, RECV_WINDOW, &query);
    assert_eq!(
        signature,
        "5e3368dc6513523693e132a7282a050c40c53c95b5ab65bf70a921fdd91b45a6"
    );
}

#[test]
fn test_sign_post_body_matches_known_vector() {
    let keys = BybitKeys::new("test-key", "test-secret");
    let body = r#"{"category":"spot","symbol":"BTCUSDT"}"#;

    let signature = keys.sign(TIMESTAMP, RECV_WINDOW, body);
    assert_eq!(
        signature,
        "868f480146ca9f2565a028497580cd3645e1cbc04b4f14225b95f7d912688073"
    );
}

#[test]
fn test_signature_depends_on_every_component() {
    let keys = BybitKeys::new("test-key", "test-secret");
    let base = keys.sign(TIMESTAMP, RECV_WINDOW, "coin=USDT");

    assert_ne!(base, keys.sign(TIMESTAMP + 1, RECV_WINDOW, "coin=USDT"));
    assert_ne!(base, keys.sign(TIMESTAMP, RECV_WINDOW + 1, "coin=USDT"));
    assert_ne!(base, keys.sign(TIMESTAMP, RECV_WINDOW, "coin=USDC"));
    assert_ne!(base, BybitKeys::new("test-key", "other").sign(TIMESTAMP, RECV_WINDOW, "coin=USDT"));
}

#[test]
fn test_conditional_order_body_serialization() {
    let body = CreateOrderBody {
        category: Category::Spot,
        symbol: "BTCUSDT".to_string(),
        side: OrderSide::Sell,
        order_type: OrderType::Market,
        qty: dec!(0.003333),
        market_unit: Some(MarketUnit::BaseCoin),
        order_filter: Some(OrderFilter::StopOrder),
        trigger_price: Some(dec!(27000.5)),
        order_link_id: "bsb-test".to_string(),
    };

    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["category"], "spot");
    assert_eq!(value["side"], "Sell");
    assert_eq!(value["orderType"], "Market");
    assert_eq!(value["qty"], "0.003333");
    assert_eq!(value["marketUnit"], "baseCoin");
    assert_eq!(value["orderFilter"], "StopOrder");
    assert_eq!(value["triggerPrice"], "27000.5");
    assert_eq!(value["orderLinkId"], "bsb-test");
}

#[test]
fn test_market_order_body_omits_trigger_fields() {
    let body = CreateOrderBody {
        category: Category::Spot,
        symbol: "BTCUSDT".to_string(),
        side: OrderSide::Buy,
        order_type: OrderType::Market,
        qty: dec!(1),
        market_unit: Some(MarketUnit::BaseCoin),
        order_filter: None,
        trigger_price: None,
        order_link_id: new_order_link_id(),
    };

    let value = serde_json::to_value(&body).unwrap();
    assert!(value.get("triggerPrice").is_none());
    assert!(value.get("orderFilter").is_none());
}
