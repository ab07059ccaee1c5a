//! Integration tests for the Binance REST client against local servers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{RawQuery, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use binance_rest::{
    BinanceRestClient, ClientConfig, Credentials, HttpRequest, HttpTransport, Method, OrderParams,
    OrderStatus, ReqwestTransport, RestError, TimestampPolicy,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

const SERVER_TIME: u64 = 1700000000000;
const API_KEY: &str = "integration-api-key";
const SECRET_KEY: &str = "integration-secret-key";

#[derive(Clone, Default)]
struct TestServerState {
    last_query: Arc<Mutex<Option<String>>>,
    last_headers: Arc<Mutex<Option<HeaderMap>>>,
}

impl TestServerState {
    async fn record(&self, query: Option<String>, headers: HeaderMap) {
        *self.last_query.lock().await = query;
        *self.last_headers.lock().await = Some(headers);
    }
}

async fn mock_server_time() -> impl IntoResponse {
    axum::Json(json!({ "serverTime": SERVER_TIME }))
}

async fn mock_teapot() -> impl IntoResponse {
    (StatusCode::IM_A_TEAPOT, r#"{"code":-1021,"msg":"bad"}"#)
}

async fn mock_not_json() -> impl IntoResponse {
    (StatusCode::OK, "definitely not json")
}

async fn mock_open_orders(
    State(state): State<TestServerState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    if !headers.contains_key("x-mbx-apikey") {
        return (StatusCode::UNAUTHORIZED, axum::Json(json!({"code": -2015, "msg": "no key"})));
    }
    state.record(query, headers).await;
    (StatusCode::OK, axum::Json(json!([])))
}

async fn mock_cancel_order(
    State(state): State<TestServerState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    state.record(query, headers).await;
    axum::Json(json!({
        "symbol": "BTCUSDT",
        "orderId": 12345,
        "status": "CANCELED",
    }))
}

async fn mock_new_order(
    State(state): State<TestServerState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    state.record(query, headers).await;
    axum::Json(json!({
        "symbol": "BTCUSDT",
        "orderId": 12345,
        "orderListId": -1,
        "clientOrderId": "abc",
        "transactTime": SERVER_TIME,
        "status": "NEW",
        "type": "LIMIT",
        "side": "SELL",
    }))
}

async fn mock_echo(headers: HeaderMap, body: String) -> impl IntoResponse {
    let content_types: Vec<String> = headers
        .get_all(CONTENT_TYPE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect();
    axum::Json(json!({
        "content_types": content_types,
        "body": body,
    }))
}

fn create_router(state: TestServerState) -> Router {
    Router::new()
        .route("/api/v3/time", get(mock_server_time))
        .route("/api/v3/openOrders", get(mock_open_orders))
        .route(
            "/api/v3/order",
            axum::routing::post(mock_new_order).delete(mock_cancel_order),
        )
        .route("/teapot", get(mock_teapot))
        .route("/not-json", get(mock_not_json))
        .route("/echo", axum::routing::post(mock_echo))
        .with_state(state)
}

async fn start_mock_server(state: TestServerState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    addr
}

fn client_for(addr: SocketAddr) -> BinanceRestClient {
    let config = ClientConfig::new()
        .with_base_url(format!("http://{}", addr))
        .with_credentials(Credentials::new(API_KEY, SECRET_KEY).unwrap());
    BinanceRestClient::with_config(config).unwrap()
}

#[tokio::test]
async fn test_server_time() {
    let addr = start_mock_server(TestServerState::default()).await;
    let client = client_for(addr);

    assert_eq!(client.get_server_time().await.unwrap(), SERVER_TIME);
}

#[tokio::test]
async fn test_non_success_status_keeps_raw_body() {
    let addr = start_mock_server(TestServerState::default()).await;
    let transport = ReqwestTransport::new("binance-rest-tests").unwrap();

    let request = HttpRequest::new(Method::Get, format!("http://{}/teapot", addr));
    let err = RestError::from(transport.execute(request).await.unwrap_err());

    match err {
        RestError::Remote { status, ref body } => {
            assert_eq!(status, 418);
            assert_eq!(body, r#"{"code":-1021,"msg":"bad"}"#);
        }
        ref other => panic!("expected remote error, got {:?}", other),
    }
    assert_eq!(err.api_error().unwrap().code, -1021);
}

#[tokio::test]
async fn test_success_with_invalid_json_is_decode_error() {
    let addr = start_mock_server(TestServerState::default()).await;
    let transport = ReqwestTransport::new("binance-rest-tests").unwrap();

    let request = HttpRequest::new(Method::Get, format!("http://{}/not-json", addr));
    let err = RestError::from(transport.execute(request).await.unwrap_err());

    assert!(matches!(err, RestError::Decode { ref body, .. } if body == "definitely not json"));
}

#[tokio::test]
async fn test_request_body_sent_as_json() {
    let addr = start_mock_server(TestServerState::default()).await;
    let transport = ReqwestTransport::new("binance-rest-tests").unwrap();

    let request = HttpRequest::new(Method::Post, format!("http://{}/echo", addr))
        .with_body(json!({"symbol": "BTCUSDT", "quantity": "0.01"}));
    let response = transport.execute(request).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body["content_types"], json!(["application/json"]));

    let received: Value = serde_json::from_str(response.body["body"].as_str().unwrap()).unwrap();
    assert_eq!(received, json!({"symbol": "BTCUSDT", "quantity": "0.01"}));
}

#[tokio::test]
async fn test_signed_request_headers_and_query() {
    let state = TestServerState::default();
    let addr = start_mock_server(state.clone()).await;
    let client = client_for(addr);

    let orders = client.get_open_orders(Some("ETHUSDT")).await.unwrap();
    assert!(orders.is_empty());

    let headers = state.last_headers.lock().await.clone().unwrap();
    assert_eq!(headers.get("x-mbx-apikey").unwrap(), API_KEY);
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
    assert!(headers
        .get("user-agent")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("binance-rest/"));

    let query = state.last_query.lock().await.clone().unwrap();
    let signed_part = format!("symbol=ETHUSDT&timestamp={}", SERVER_TIME);
    let expected_signature = Credentials::new(API_KEY, SECRET_KEY)
        .unwrap()
        .sign(&signed_part);
    assert_eq!(query, format!("{}&signature={}", signed_part, expected_signature));
}

#[tokio::test]
async fn test_cancel_order_round_trip() {
    let state = TestServerState::default();
    let addr = start_mock_server(state.clone()).await;
    let client = client_for(addr);

    let response = client.cancel_order("btcusdt", 12345).await.unwrap();
    assert_eq!(response.status, Some(OrderStatus::Canceled));
    assert_eq!(response.order_id, Some(12345));

    let query = state.last_query.lock().await.clone().unwrap();
    assert!(query.starts_with("symbol=BTCUSDT&orderId=12345&timestamp=1700000000000&signature="));
}

#[tokio::test]
async fn test_create_order_over_http() {
    let state = TestServerState::default();
    let addr = start_mock_server(state.clone()).await;
    let client = client_for(addr);

    let params = OrderParams::new()
        .with_time_in_force(binance_rest::TimeInForce::GoodTillCancelled)
        .with_quantity(dec!(0.01))
        .with_price(dec!(25000));
    let order = client.create_order("BTCUSDT", "sell", "limit", params).await.unwrap();
    assert_eq!(order.order_id, 12345);

    let query = state.last_query.lock().await.clone().unwrap();
    assert!(query.starts_with(
        "symbol=BTCUSDT&side=SELL&type=LIMIT&timeInForce=GTC&quantity=0.01&price=25000&timestamp="
    ));
}

#[tokio::test]
async fn test_signed_value_passthrough() {
    let addr = start_mock_server(TestServerState::default()).await;
    let client = client_for(addr);

    let params = binance_rest::QueryParams::new()
        .with("symbol", "BTCUSDT")
        .with("orderId", 12345);
    let body: Value = client
        .signed(Method::Delete, "/api/v3/order", params)
        .await
        .unwrap();

    assert_eq!(body["status"], "CANCELED");
}

#[tokio::test]
async fn test_timeout_closes_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();

    // Accept the connection, never answer, report when the client hangs up
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
        let _ = closed_tx.send(());
    });

    let config = ClientConfig::new()
        .with_base_url(format!("http://{}", addr))
        .with_timeout(Duration::from_millis(200))
        .with_timestamp_policy(TimestampPolicy::LocalClock);
    let client = BinanceRestClient::with_config(config).unwrap();

    let err = client.get_server_time().await.unwrap_err();
    assert!(matches!(err, RestError::Timeout(d) if d == Duration::from_millis(200)));
    assert!(err.is_retryable());

    let closed = tokio::time::timeout(Duration::from_secs(5), closed_rx).await;
    assert!(matches!(closed, Ok(Ok(()))), "server never saw the connection close");
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::new().with_base_url(format!("http://{}", addr));
    let client = BinanceRestClient::with_config(config).unwrap();

    let err = client.get_server_time().await.unwrap_err();
    assert!(matches!(err, RestError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_signed_call_without_credentials() {
    let addr = start_mock_server(TestServerState::default()).await;
    let config = ClientConfig::new().with_base_url(format!("http://{}", addr));
    let client = BinanceRestClient::with_config(config).unwrap();

    let err = client.get_open_orders(None).await.unwrap_err();
    assert!(matches!(err, RestError::AuthRequired));
}
