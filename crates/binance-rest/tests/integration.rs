//! Integration tests for the Binance.US REST client
//!
//! Every test runs against an in-process mock server; nothing touches the
//! real exchange.

mod common;

use std::sync::Arc;
use std::time::Duration;

use binance_rest::{
    BinanceRestClient, ClientConfig, NewOrder, OrderRef, OrderSide, RecoveryStrategy, RestError,
    TrustTier,
};
use common::*;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tracing::Level;

// =============================================================================
// Request building
// =============================================================================

#[tokio::test]
async fn test_public_query_preserves_param_order() {
    let server = MockServer::start().await;
    server.route("GET", "/api/v3/depth", Canned::ok(json!({"bids": [], "asks": []})));

    server.client().market().depth("BTCUSD", Some(5)).await.unwrap();

    let request = server.last_request();
    assert_eq!(request.method, "GET");
    assert_eq!(request.query.as_deref(), Some("symbol=BTCUSD&limit=5"));
}

#[tokio::test]
async fn test_public_request_sends_no_credentials() {
    let server = MockServer::start().await;
    server.route("GET", "/api/v3/ping", Canned::ok(json!({})));

    let payload = server.client().market().ping().await.unwrap();
    assert_eq!(payload, json!({}));

    let request = server.last_request();
    assert!(request.header("x-mbx-apikey").is_none());
    assert!(request.query.is_none());
}

#[tokio::test]
async fn test_secure_request_sends_key_but_no_signature() {
    let server = MockServer::start().await;
    server.route("GET", "/api/v3/historicalTrades", Canned::ok(json!([])));

    server
        .client()
        .market()
        .historical_trades("BTCUSD", Some(100), Some(50))
        .await
        .unwrap();

    let request = server.last_request();
    assert_eq!(request.header("x-mbx-apikey"), Some(API_KEY));
    assert_eq!(
        request.query.as_deref(),
        Some("symbol=BTCUSD&fromId=100&limit=50")
    );
}

#[tokio::test]
async fn test_redirect_is_classified_not_followed() {
    let server = MockServer::start().await;
    server.route(
        "GET",
        "/api/v3/historicalTrades",
        Canned::raw(302, "").with_location("/elsewhere"),
    );
    server.route("GET", "/elsewhere", Canned::ok(json!([])));

    let err = server
        .client()
        .market()
        .historical_trades("BTCUSD", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, RestError::InternalServer(_)), "got {:?}", err);
    assert_eq!(err.status(), Some(302));
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/api/v3/historicalTrades");
}

#[tokio::test]
async fn test_signed_get_is_verifiable() {
    let server = MockServer::start().await;
    server.route("GET", "/api/v3/openOrders", Canned::ok(json!([])));

    server.client().spot().open_orders(Some("BTCUSD"), None).await.unwrap();

    let request = server.last_request();
    assert_eq!(request.header("x-mbx-apikey"), Some(API_KEY));

    let query = request.query.clone().unwrap();
    assert!(query.starts_with("symbol=BTCUSD&timestamp="));
    let timestamp_at = query.find("&timestamp=").unwrap();
    let signature_at = query.find("&signature=").unwrap();
    assert!(timestamp_at < signature_at);
    assert!(request.has_valid_signature(SECRET_KEY));
    assert!(!request.has_valid_signature("some-other-secret"));
}

#[tokio::test]
async fn test_signed_post_signs_form_body() {
    let server = MockServer::start().await;
    server.route(
        "POST",
        "/api/v3/order",
        Canned::ok(json!({"symbol": "BTCUSD", "orderId": 28, "status": "NEW"})),
    );

    let order = NewOrder::limit("BTCUSD", OrderSide::Buy, dec!(0.5), dec!(100));
    let payload = server.client().spot().create_order(&order).await.unwrap();
    assert_eq!(payload["orderId"], 28);

    let request = server.last_request();
    assert_eq!(
        request.body,
        "symbol=BTCUSD&side=BUY&type=LIMIT&timeInForce=GTC&quantity=0.5&price=100"
    );
    assert_eq!(
        request.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert!(request.query.as_deref().unwrap().starts_with("timestamp="));
    assert!(request.has_valid_signature(SECRET_KEY));
}

#[tokio::test]
async fn test_cancel_by_client_order_id() {
    let server = MockServer::start().await;
    server.route("DELETE", "/api/v3/order", Canned::ok(json!({"status": "CANCELED"})));

    server
        .client()
        .spot()
        .cancel_order("BTCUSD", &OrderRef::client("my-order-1"), None, Some(5000))
        .await
        .unwrap();

    let request = server.last_request();
    assert_eq!(request.method, "DELETE");
    assert!(request
        .query
        .as_deref()
        .unwrap()
        .starts_with("symbol=BTCUSD&origClientOrderId=my-order-1&recvWindow=5000&timestamp="));
    assert!(request.body.is_empty());
    assert!(request.has_valid_signature(SECRET_KEY));
}

#[tokio::test]
async fn test_configured_recv_window_is_signed() {
    let server = MockServer::start().await;
    server.route("GET", "/api/v3/account", Canned::ok(json!({"balances": []})));

    let client = BinanceRestClient::with_config(server.config().with_recv_window(7000));
    client.spot().account_information(None).await.unwrap();

    let request = server.last_request();
    assert!(request
        .query
        .as_deref()
        .unwrap()
        .starts_with("recvWindow=7000&timestamp="));
    assert!(request.has_valid_signature(SECRET_KEY));
}

#[tokio::test]
async fn test_invalid_order_never_sent() {
    let server = MockServer::start().await;
    let mut order = NewOrder::limit("BTCUSD", OrderSide::Sell, dec!(1), dec!(100));
    order.price = None;

    let err = server.client().spot().create_order(&order).await.unwrap_err();
    assert!(matches!(err, RestError::InvalidRequest(_)));
    assert!(server.requests().is_empty());
}

// =============================================================================
// Credentials
// =============================================================================

#[tokio::test]
async fn test_missing_credentials_fail_before_dispatch() {
    let server = MockServer::start().await;
    let client = server.anonymous_client();

    let err = client.spot().open_orders(None, None).await.unwrap_err();
    assert!(matches!(
        err,
        RestError::MissingCredentials { tier: TrustTier::Signed, .. }
    ));

    let err = client
        .market()
        .historical_trades("BTCUSD", None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RestError::MissingCredentials { tier: TrustTier::SecureKeyOnly, .. }
    ));

    assert!(server.requests().is_empty());
}

// =============================================================================
// Response classification
// =============================================================================

#[tokio::test]
async fn test_status_classes_over_the_wire() {
    let server = MockServer::start().await;
    let client = server.client();
    let body = json!({"code": -1121, "msg": "Invalid symbol."});

    let cases: [(u16, fn(&RestError) -> bool); 6] = [
        (403, |e| matches!(e, RestError::WafLimit(_))),
        (418, |e| matches!(e, RestError::IpBanned(_))),
        (429, |e| matches!(e, RestError::RateLimitExceeded(_))),
        (504, |e| matches!(e, RestError::ResponseReadTimeout(_))),
        (400, |e| matches!(e, RestError::MalformedRequest(_))),
        (500, |e| matches!(e, RestError::InternalServer(_))),
    ];

    for (status, expected) in cases {
        server.route("GET", "/api/v3/ticker/price", Canned::json(status, body.clone()));
        let err = client.market().price("XYZUSD").await.unwrap_err();
        assert!(expected(&err), "status {} gave {:?}", status, err);
        assert_eq!(err.status(), Some(status));
        assert_eq!(err.code(), Some(-1121));
        assert_eq!(err.message(), Some("Invalid symbol."));
    }
}

#[tokio::test]
async fn test_error_message_names_the_request() {
    let server = MockServer::start().await;
    server.route(
        "GET",
        "/api/v3/depth",
        Canned::json(
            400,
            json!({"code": -1100, "msg": "Illegal characters found in parameter 'symbol'."}),
        ),
    );

    let err = server.client().market().depth("BTC USD", None).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "[MalformedRequest][400][-1100] GET /api/v3/depth - Illegal characters found in parameter 'symbol'."
    );
}

#[tokio::test]
async fn test_waf_html_body() {
    let server = MockServer::start().await;
    server.route("GET", "/api/v3/exchangeInfo", Canned::raw(403, "<html>Forbidden</html>"));

    let err = server.client().market().exchange_info(None).await.unwrap_err();
    assert!(matches!(err, RestError::WafLimit(_)));
    assert_eq!(err.code(), None);
    assert_eq!(
        err.response().map(|r| r.body().clone()),
        Some(Value::String("<html>Forbidden</html>".to_string()))
    );
}

#[tokio::test]
async fn test_ban_carries_retry_after() {
    let server = MockServer::start().await;
    server.route(
        "GET",
        "/api/v3/ticker/price",
        Canned::json(418, json!({"code": -1003, "msg": "Way too many requests; IP banned."}))
            .with_retry_after(120),
    );

    let err = server.client().market().price("BTCUSD").await.unwrap_err();
    assert!(matches!(err, RestError::IpBanned(_)));
    assert_eq!(err.retry_after(), Some(Duration::from_secs(120)));
    assert_eq!(
        err.recovery_strategy(),
        RecoveryStrategy::Halt { retry_after_ms: Some(120_000) }
    );
}

#[tokio::test]
async fn test_gateway_timeout_on_order_is_outcome_unknown() {
    let server = MockServer::start().await;
    server.route("POST", "/api/v3/order", Canned::json(504, json!({})));

    let order = NewOrder::market("BTCUSD", OrderSide::Sell, dec!(0.01));
    let err = server.client().spot().create_order(&order).await.unwrap_err();
    assert!(matches!(err, RestError::ResponseReadTimeout(_)));
    assert!(err.is_outcome_unknown());
    assert_eq!(err.recovery_strategy(), RecoveryStrategy::VerifyBeforeRetry);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_non_json_success_is_decode_error() {
    let server = MockServer::start().await;
    server.route("GET", "/api/v3/ping", Canned::raw(200, "pong"));

    let err = server.client().market().ping().await.unwrap_err();
    assert!(matches!(err, RestError::Decode(_)));
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let server = MockServer::start().await;
    server.route("GET", "/api/v3/ping", Canned::raw(200, ""));

    assert_eq!(server.client().market().ping().await.unwrap(), Value::Null);
}

// =============================================================================
// Transport failures
// =============================================================================

#[tokio::test]
async fn test_slow_server_is_timeout_not_malformed() {
    let server = MockServer::start().await;
    server.route(
        "GET",
        "/api/v3/time",
        Canned::ok(json!({"serverTime": 1})).with_delay(Duration::from_secs(2)),
    );

    let client = BinanceRestClient::with_config(
        server.config().with_timeout(Duration::from_millis(200)),
    );
    let err = client.market().server_time_raw().await.unwrap_err();
    assert!(matches!(err, RestError::Timeout { .. }), "got {:?}", err);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_order_timeout_needs_verification() {
    let server = MockServer::start().await;
    server.route(
        "POST",
        "/api/v3/order",
        Canned::ok(json!({})).with_delay(Duration::from_secs(2)),
    );

    let client = BinanceRestClient::with_config(
        server.config().with_timeout(Duration::from_millis(200)),
    );
    let order = NewOrder::market("BTCUSD", OrderSide::Buy, dec!(1));
    let err = client.spot().create_order(&order).await.unwrap_err();
    assert!(matches!(err, RestError::Timeout { .. }));
    assert_eq!(err.recovery_strategy(), RecoveryStrategy::VerifyBeforeRetry);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client =
        BinanceRestClient::with_config(ClientConfig::new().with_base_url(closed_port_url()));

    let err = client.market().ping().await.unwrap_err();
    assert!(matches!(err, RestError::Transport { .. }), "got {:?}", err);
    assert_eq!(err.status(), None);
    assert_eq!(err.request().map(|r| r.path()), Some("/api/v3/ping"));
}

// =============================================================================
// Convenience accessors
// =============================================================================

#[tokio::test]
async fn test_price_for() {
    let server = MockServer::start().await;
    server.route(
        "GET",
        "/api/v3/ticker/price",
        Canned::ok(json!({"symbol": "BTCUSD", "price": "123.45"})),
    );

    let price = server.client().market_data().price_for("BTCUSD").await.unwrap();
    assert_eq!(price, 123.45);
    assert_eq!(server.last_request().query.as_deref(), Some("symbol=BTCUSD"));
}

#[tokio::test]
async fn test_price_for_non_numeric_is_decode_error() {
    let server = MockServer::start().await;
    server.route(
        "GET",
        "/api/v3/ticker/price",
        Canned::ok(json!({"symbol": "BTCUSD", "price": "n/a"})),
    );

    let err = server.client().market_data().price_for("BTCUSD").await.unwrap_err();
    assert!(matches!(err, RestError::Decode(_)));
}

#[tokio::test]
async fn test_average_prices() {
    let server = MockServer::start().await;
    server.route("GET", "/api/v3/avgPrice", Canned::ok(json!({"mins": 5, "price": "9.35751834"})));
    server.route(
        "GET",
        "/api/v3/ticker/24hr",
        Canned::ok(json!({
            "symbol": "BTCUSD",
            "priceChange": "-94.99999800",
            "priceChangePercent": "-95.960",
            "weightedAvgPrice": "0.29628482",
            "lastPrice": "4.00000200",
            "volume": "8913.30000000",
            "count": 76
        })),
    );

    let data = server.client();
    let market = data.market_data();
    assert_eq!(market.avg_price_for("BTCUSD").await.unwrap(), 9.35751834);
    assert_eq!(market.avg_price_24h_for("BTCUSD").await.unwrap(), 0.29628482);
}

#[tokio::test]
async fn test_book_ticker_for() {
    let server = MockServer::start().await;
    server.route(
        "GET",
        "/api/v3/ticker/bookTicker",
        Canned::ok(json!({
            "symbol": "ETHUSD",
            "bidPrice": "1999.50",
            "bidQty": "3.2",
            "askPrice": "2000.50",
            "askQty": "1.1"
        })),
    );

    let ticker = server.client().market_data().book_ticker_for("ETHUSD").await.unwrap();
    assert_eq!(ticker.mid_price(), dec!(2000.00));
    assert_eq!(ticker.spread(), dec!(1.00));
}

#[tokio::test]
async fn test_server_time_and_timezone() {
    let server = MockServer::start().await;
    server.route("GET", "/api/v3/time", Canned::ok(json!({"serverTime": 1578963600000i64})));
    server.route(
        "GET",
        "/api/v3/exchangeInfo",
        Canned::ok(json!({"timezone": "UTC", "serverTime": 1578963600000i64, "symbols": []})),
    );

    let client = server.client();
    let time = client.market_data().server_time().await.unwrap();
    assert_eq!(time.timestamp_millis(), 1_578_963_600_000);
    assert_eq!(client.market_data().timezone().await.unwrap(), "UTC");
}

#[tokio::test]
async fn test_coins_keep_positive_balances_only() {
    let server = MockServer::start().await;
    server.route(
        "GET",
        "/sapi/v1/capital/config/getall",
        Canned::ok(json!([
            {"coin": "BTC", "name": "Bitcoin", "free": "0.5", "withdrawing": "0", "trading": true},
            {"coin": "ETH", "name": "Ethereum", "free": "0.00000000", "withdrawing": "0", "trading": true},
            {"coin": "USD", "name": "US Dollar", "free": "12.34567891", "withdrawing": "1", "trading": false}
        ])),
    );

    let coins = server.client().balances().coins().await.unwrap();
    let symbols: Vec<&str> = coins.iter().map(|c| c.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTC", "USD"]);
    assert_eq!(coins[0].amount_satoshi, 50_000_000);
    assert_eq!(coins[1].amount_satoshi, 1_234_567_891);
    assert_eq!(coins[1].withdrawing, 100_000_000);
    assert!(!coins[1].trading);

    assert!(server.last_request().has_valid_signature(SECRET_KEY));
}

// =============================================================================
// Connections
// =============================================================================

#[tokio::test]
async fn test_concurrent_requests_share_one_connection() {
    let server = MockServer::start().await;
    server.route(
        "GET",
        "/api/v3/ticker/price",
        Canned::ok(json!({"symbol": "BTCUSD", "price": "1.5"})),
    );
    let client = server.client();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                let price = client.market_data().price_for("BTCUSD").await.unwrap();
                (price, client.connection_for(TrustTier::Public).unwrap())
            })
        })
        .collect();

    let mut connections = Vec::new();
    for task in tasks {
        let (price, connection) = task.await.unwrap();
        assert_eq!(price, 1.5);
        connections.push(connection);
    }

    assert!(connections.iter().all(|c| Arc::ptr_eq(c, &connections[0])));
    assert_eq!(server.requests().len(), 16);
}

#[tokio::test]
async fn test_reload_rebuilds_connections() {
    let server = MockServer::start().await;
    server.route("GET", "/api/v3/ping", Canned::ok(json!({})));
    let client = server.client();

    client.market().ping().await.unwrap();
    let before = client.connection_for(TrustTier::Public).unwrap();

    client.reload();
    client.market().ping().await.unwrap();
    let after = client.connection_for(TrustTier::Public).unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(&*client.base_url(), server.base_url.as_str());
}

// =============================================================================
// Logging
// =============================================================================

#[tokio::test]
async fn test_info_logging_hides_key_and_bodies() {
    let server = MockServer::start().await;
    server.route(
        "GET",
        "/api/v3/historicalTrades",
        Canned::ok(json!([{"id": 17, "price": "4.2"}])),
    );

    let logs = LogCapture::default();
    let client = BinanceRestClient::with_config(server.config().with_dispatch(logs.dispatch()));
    client.market().historical_trades("BTCUSD", None, None).await.unwrap();

    let output = logs.contents();
    assert!(output.contains("/api/v3/historicalTrades"), "logs: {}", output);
    assert!(output.contains("status=200"), "logs: {}", output);
    assert!(!output.contains(API_KEY));
    assert!(!output.contains("response details"));
}

#[tokio::test]
async fn test_debug_logging_includes_bodies_but_not_key() {
    let server = MockServer::start().await;
    server.route(
        "GET",
        "/api/v3/ticker/price",
        Canned::ok(json!({"symbol": "BTCUSD", "price": "123.45"})),
    );

    let logs = LogCapture::default();
    let client = BinanceRestClient::with_config(
        server
            .config()
            .with_log_level(Level::DEBUG)
            .with_dispatch(logs.dispatch()),
    );
    client.market_data().price_for("BTCUSD").await.unwrap();

    let output = logs.contents();
    assert!(output.contains("response details"), "logs: {}", output);
    assert!(output.contains("123.45"));
    assert!(!output.contains(API_KEY));
}
