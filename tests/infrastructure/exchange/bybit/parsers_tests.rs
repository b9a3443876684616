use rust_decimal_macros::dec;
use serde_json::json;
use bybit_spot_bot::domain::errors::TradeError;
use bybit_spot_bot::infrastructure::exchange::bybit::parsers::BybitParser;

#[test]
fn test_parse_envelope_success_returns_result() {
    let body = json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": { "orderId": "1321003749386327552", "orderLinkId": "bsb-1" },
        "retExtInfo": {},
        "time": 1672211918471u64
    })
    .to_string();

    let result = BybitParser::parse_envelope(200, &body).unwrap();
    assert_eq!(BybitParser::parse_order_id(&result).unwrap(), "1321003749386327552");
}

#[test]
fn test_parse_envelope_maps_auth_codes() {
    for code in [10003, 10004, 10005] {
        let body = json!({ "retCode": code, "retMsg": "error sign!", "result": {} }).to_string();
        match BybitParser::parse_envelope(200, &body) {
            Err(TradeError::AuthError(msg)) => assert!(msg.contains(&code.to_string())),
            other => panic!("Expected AuthError for {}, got {:?}", code, other),
        }
    }
}

#[test]
fn test_parse_envelope_http_unauthorized_is_auth_error() {
    let result = BybitParser::parse_envelope(401, "Unauthorized");
    assert!(matches!(result, Err(TradeError::AuthError(_))));
}

#[test]
fn test_parse_envelope_other_codes_are_rejections() {
    let body = json!({
        "retCode": 170136,
        "retMsg": "Order quantity exceeded upper limit.",
        "result": {}
    })
    .to_string();

    match BybitParser::parse_envelope(200, &body) {
        Err(TradeError::ExchangeRejected { code, message }) => {
            assert_eq!(code, 170136);
            assert_eq!(message, "Order quantity exceeded upper limit.");
        }
        other => panic!("Expected ExchangeRejected, got {:?}", other),
    }
}

#[test]
fn test_parse_envelope_garbage_is_invalid_response() {
    let result = BybitParser::parse_envelope(502, "<html>Bad Gateway</html>");
    assert!(matches!(result, Err(TradeError::InvalidResponse(_))));
}

#[test]
fn test_parse_wallet_balance_prefers_available_to_withdraw() {
    let result = json!({
        "list": [{
            "accountType": "UNIFIED",
            "coin": [
                { "coin": "BTC", "walletBalance": "0.5", "locked": "0", "availableToWithdraw": "0.5" },
                { "coin": "USDT", "walletBalance": "1200.5", "locked": "200", "availableToWithdraw": "1000.25" }
            ]
        }]
    });

    let balance = BybitParser::parse_wallet_balance(&result, "USDT").unwrap();
    assert_eq!(balance, dec!(1000.25));
}

#[test]
fn test_parse_wallet_balance_falls_back_to_wallet_minus_locked() {
    let result = json!({
        "list": [{
            "accountType": "UNIFIED",
            "coin": [
                { "coin": "USDT", "walletBalance": "1200.5", "locked": "200.5", "availableToWithdraw": "" }
            ]
        }]
    });

    let balance = BybitParser::parse_wallet_balance(&result, "USDT").unwrap();
    assert_eq!(balance, dec!(1000));
}

#[test]
fn test_parse_wallet_balance_missing_coin_is_zero() {
    let result = json!({ "list": [{ "accountType": "UNIFIED", "coin": [] }] });
    let balance = BybitParser::parse_wallet_balance(&result, "SOL").unwrap();
    assert_eq!(balance, dec!(0));
}

#[test]
fn test_parse_last_price() {
    let result = json!({
        "category": "spot",
        "list": [{
            "symbol": "BTCUSDT",
            "bid1Price": "20517.96",
            "ask1Price": "20527.77",
            "lastPrice": "20533.13",
            "volume24h": "243316.4"
        }]
    });

    let price = BybitParser::parse_last_price(&result, "BTCUSDT").unwrap();
    assert_eq!(price, dec!(20533.13));

    let missing = BybitParser::parse_last_price(&result, "ETHUSDT");
    assert!(matches!(missing, Err(TradeError::InvalidResponse(_))));
}

#[test]
fn test_parse_instrument_rules() {
    let result = json!({
        "category": "spot",
        "list": [{
            "symbol": "BTCUSDT",
            "baseCoin": "BTC",
            "quoteCoin": "USDT",
            "status": "Trading",
            "lotSizeFilter": {
                "basePrecision": "0.000001",
                "quotePrecision": "0.00000001",
                "minOrderQty": "0.000048",
                "maxOrderQty": "71.73956243",
                "minOrderAmt": "1",
                "maxOrderAmt": "2000000"
            },
            "priceFilter": { "tickSize": "0.01" }
        }]
    });

    let rules = BybitParser::parse_instrument_rules(&result, "BTCUSDT").unwrap();
    assert_eq!(rules.symbol, "BTCUSDT");
    assert_eq!(rules.step_size, dec!(0.000001));
    assert_eq!(rules.min_quantity, dec!(0.000048));
    assert_eq!(rules.max_quantity, Some(dec!(71.73956243)));
    assert_eq!(rules.min_notional, dec!(1));
    assert_eq!(rules.tick_size, dec!(0.01));
}

#[test]
fn test_parse_instrument_rules_rejects_halted_symbol() {
    let result = json!({
        "list": [{
            "symbol": "LUNAUSDT",
            "status": "Closed",
            "lotSizeFilter": { "basePrecision": "0.01", "minOrderQty": "1", "minOrderAmt": "1" },
            "priceFilter": { "tickSize": "0.0001" }
        }]
    });

    let result = BybitParser::parse_instrument_rules(&result, "LUNAUSDT");
    assert!(matches!(result, Err(TradeError::ExchangeRejected { .. })));
}

#[test]
fn test_parse_order_fill() {
    let result = json!({
        "list": [{
            "orderId": "fd4300ae-7847-404e-b947-b46980a4d140",
            "orderLinkId": "bsb-abc",
            "symbol": "BTCUSDT",
            "side": "Buy",
            "orderType": "Market",
            "orderStatus": "Filled",
            "avgPrice": "30012.5",
            "cumExecQty": "0.003333",
            "qty": "0.003333"
        }],
        "nextPageCursor": "",
        "category": "spot"
    });

    let fill = BybitParser::parse_order_fill(&result, "fd4300ae-7847-404e-b947-b46980a4d140")
        .unwrap()
        .expect("fill should be present");
    assert_eq!(fill.fill_price, dec!(30012.5));
    assert_eq!(fill.filled_quantity, Some(dec!(0.003333)));
}

#[test]
fn test_parse_order_fill_without_avg_price_is_none() {
    let result = json!({
        "list": [{ "orderId": "42", "orderStatus": "New", "avgPrice": "", "cumExecQty": "0" }]
    });
    assert!(BybitParser::parse_order_fill(&result, "42").unwrap().is_none());

    let empty = json!({ "list": [] });
    assert!(BybitParser::parse_order_fill(&empty, "42").unwrap().is_none());
}

#[test]
fn test_parse_order_fill_rejected_order() {
    let result = json!({
        "list": [{ "orderId": "43", "orderStatus": "Rejected", "avgPrice": "0" }]
    });
    let err = BybitParser::parse_order_fill(&result, "43").unwrap_err();
    assert!(matches!(err, TradeError::ExchangeRejected { .. }));
}

#[test]
fn test_parse_order_fill_unknown_status_is_invalid_response() {
    let result = json!({
        "list": [{ "orderId": "44", "orderStatus": "Exploded", "avgPrice": "100" }]
    });
    let err = BybitParser::parse_order_fill(&result, "44").unwrap_err();
    assert!(matches!(err, TradeError::InvalidResponse(_)));
}
