//! Main REST client implementation

use std::sync::Arc;
use std::time::Duration;

use binance_auth::{Credentials, QueryParams, API_KEY_ENV, SECRET_KEY_ENV};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::clock::{ServerClock, TimestampPolicy};
use crate::dispatch::Dispatcher;
use crate::endpoints::{AccountEndpoints, MarketEndpoints, TradingEndpoints};
use crate::error::{RestError, RestResult};
use crate::transport::{HttpTransport, Method, ReqwestTransport, DEFAULT_TIMEOUT};
use crate::types::{
    AccountInfo, CancelOrderResponse, OpenOrder, OrderParams, OrderRequest, OrderResponse,
};

/// Spot testnet
pub const DEFAULT_BASE_URL: &str = "https://testnet.binance.vision";

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("binance-rest/", env!("CARGO_PKG_VERSION"));

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "BINANCE_REST_URL";

/// Environment variable overriding the request timeout (milliseconds)
pub const TIMEOUT_ENV: &str = "BINANCE_TIMEOUT_MS";

/// Binance Spot REST API client
///
/// Public endpoints work without credentials; signed endpoints fail with
/// [`RestError::AuthRequired`] until credentials are configured.
///
/// # Example
///
/// ```no_run
/// use binance_rest::{BinanceRestClient, Credentials, OrderParams, TimeInForce};
/// use rust_decimal_macros::dec;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Public endpoints only
///     let client = BinanceRestClient::new()?;
///     let now = client.get_server_time().await?;
///
///     // With authentication for signed endpoints
///     let creds = Credentials::from_env()?;
///     let auth_client = BinanceRestClient::with_credentials(creds)?;
///     let params = OrderParams::new()
///         .with_time_in_force(TimeInForce::GoodTillCancelled)
///         .with_quantity(dec!(0.01))
///         .with_price(dec!(25000));
///     let order = auth_client.create_order("BTCUSDT", "SELL", "LIMIT", params).await?;
///     auth_client.cancel_order("BTCUSDT", order.order_id).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BinanceRestClient {
    dispatcher: Arc<Dispatcher>,
    credentials: Option<Credentials>,
}

impl BinanceRestClient {
    /// Create a new client without authentication
    ///
    /// Only public endpoints will be available.
    pub fn new() -> RestResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with credentials
    pub fn with_credentials(credentials: Credentials) -> RestResult<Self> {
        Self::with_config(ClientConfig::new().with_credentials(credentials))
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// Returns [`RestError::Config`] if the HTTP client cannot be built.
    pub fn with_config(config: ClientConfig) -> RestResult<Self> {
        let transport = ReqwestTransport::new(config.user_agent())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client that sends requests through `transport`
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let dispatcher = Dispatcher::new(
            transport,
            config.base_url,
            config.timeout,
            ServerClock::new(config.timestamp_policy),
        );

        info!(base_url = dispatcher.base_url(), "Created Binance REST client");

        Self {
            dispatcher: Arc::new(dispatcher),
            credentials: config.credentials,
        }
    }

    /// Check if the client has credentials for signed endpoints
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        self.dispatcher.base_url()
    }

    fn credentials(&self) -> RestResult<&Credentials> {
        self.credentials.as_ref().ok_or(RestError::AuthRequired)
    }

    /// Send a signed request and decode the JSON response into `T`
    ///
    /// Every signed operation goes through here. Decoding into
    /// `serde_json::Value` returns the body as received.
    pub async fn signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: QueryParams,
    ) -> RestResult<T> {
        let credentials = self.credentials()?;
        self.dispatcher.signed(credentials, method, path, params).await
    }

    // ========================================================================
    // Public Market Endpoints
    // ========================================================================

    /// Get market endpoints
    pub fn market(&self) -> MarketEndpoints<'_> {
        MarketEndpoints::new(&self.dispatcher)
    }

    /// Get exchange server time in milliseconds since the Unix epoch
    pub async fn get_server_time(&self) -> RestResult<u64> {
        self.market().get_server_time().await
    }

    // ========================================================================
    // Signed Account Endpoints
    // ========================================================================

    /// Get account endpoints (requires credentials)
    pub fn account(&self) -> RestResult<AccountEndpoints<'_>> {
        Ok(AccountEndpoints::new(&self.dispatcher, self.credentials()?))
    }

    /// Get account information and balances
    ///
    /// # Arguments
    /// * `recv_window` - Validity window in ms (default: 5000)
    pub async fn get_user_data(&self, recv_window: Option<u64>) -> RestResult<AccountInfo> {
        self.account()?.get_account(recv_window).await
    }

    /// Get open orders, for one symbol or all of them
    pub async fn get_open_orders(&self, symbol: Option<&str>) -> RestResult<Vec<OpenOrder>> {
        self.account()?.get_open_orders(symbol).await
    }

    // ========================================================================
    // Signed Trading Endpoints
    // ========================================================================

    /// Get trading endpoints (requires credentials)
    pub fn trading(&self) -> RestResult<TradingEndpoints<'_>> {
        Ok(TradingEndpoints::new(&self.dispatcher, self.credentials()?))
    }

    /// Place an order from loosely typed side and type strings
    ///
    /// `side` and `order_type` are case-insensitive and must be BUY/SELL and
    /// MARKET/LIMIT; anything else fails with [`RestError::Validation`]
    /// without sending a request.
    pub async fn create_order(
        &self,
        symbol: &str,
        side: &str,
        order_type: &str,
        params: OrderParams,
    ) -> RestResult<OrderResponse> {
        let order = OrderRequest::new(symbol, side.parse()?, order_type.parse()?, params);
        self.place_order(&order).await
    }

    /// Place a typed order
    pub async fn place_order(&self, order: &OrderRequest) -> RestResult<OrderResponse> {
        self.trading()?.place_order(order).await
    }

    /// Cancel an order by its exchange-assigned id
    ///
    /// Fields outside [`CancelOrderResponse`] are dropped. For the full
    /// payload, call [`signed`](Self::signed) with `serde_json::Value`,
    /// `Method::Delete`, `/api/v3/order` and `symbol` then `orderId`.
    pub async fn cancel_order(&self, symbol: &str, order_id: u64) -> RestResult<CancelOrderResponse> {
        self.trading()?.cancel_order(symbol, order_id).await
    }
}

impl std::fmt::Debug for BinanceRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceRestClient")
            .field("dispatcher", &self.dispatcher)
            .field("has_credentials", &self.has_credentials())
            .finish()
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API credentials (optional)
    pub credentials: Option<Credentials>,
    /// Base URL, without a trailing path
    pub base_url: String,
    /// Time allowed for each request
    pub timeout: Duration,
    /// Custom user agent
    pub user_agent: Option<String>,
    /// Where signed requests get their timestamp
    pub timestamp_policy: TimestampPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            timestamp_policy: TimestampPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from the environment
    ///
    /// Reads `BINANCE_REST_URL` and `BINANCE_TIMEOUT_MS` when set, and
    /// credentials when both `BINANCE_API_KEY` and `BINANCE_SECRET_KEY` are set.
    pub fn from_env() -> RestResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config.base_url = url;
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let millis: u64 = raw
                .trim()
                .parse()
                .map_err(|_| RestError::Config(format!("{} is not a number: {}", TIMEOUT_ENV, raw)))?;
            config.timeout = Duration::from_millis(millis);
        }
        if std::env::var_os(API_KEY_ENV).is_some() && std::env::var_os(SECRET_KEY_ENV).is_some() {
            config.credentials = Some(Credentials::from_env()?);
        }

        Ok(config)
    }

    /// Set credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set timestamp policy
    pub fn with_timestamp_policy(mut self, policy: TimestampPolicy) -> Self {
        self.timestamp_policy = policy;
        self
    }

    fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}
