//! Types for Binance Spot REST API requests and responses

use binance_auth::QueryParams;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RestError;

// ============================================================================
// Trading Types
// ============================================================================

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    /// Buy order
    Buy,
    /// Sell order
    Sell,
}

impl OrderSide {
    /// Get the API string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = RestError;

    /// Parse after upper-casing, so `"buy"` and `"BUY"` are both accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            _ => Err(RestError::Validation {
                field: "side",
                value: s.to_string(),
            }),
        }
    }
}

/// Order type
///
/// Only the two types this client places are accepted; everything else is
/// rejected before a request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Market order
    Market,
    /// Limit order
    Limit,
}

impl OrderType {
    /// Get the API string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "MARKET",
            Self::Limit => "LIMIT",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = RestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MARKET" => Ok(Self::Market),
            "LIMIT" => Ok(Self::Limit),
            _ => Err(RestError::Validation {
                field: "type",
                value: s.to_string(),
            }),
        }
    }
}

/// Time in force for orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good till cancelled
    #[serde(rename = "GTC")]
    GoodTillCancelled,
    /// Immediate or cancel
    #[serde(rename = "IOC")]
    ImmediateOrCancel,
    /// Fill or kill
    #[serde(rename = "FOK")]
    FillOrKill,
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoodTillCancelled => write!(f, "GTC"),
            Self::ImmediateOrCancel => write!(f, "IOC"),
            Self::FillOrKill => write!(f, "FOK"),
        }
    }
}

/// Shape of the new-order response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NewOrderRespType {
    /// Identifiers only
    Ack,
    /// Order state without fills
    Result,
    /// Order state with fills
    Full,
}

impl std::fmt::Display for NewOrderRespType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ack => write!(f, "ACK"),
            Self::Result => write!(f, "RESULT"),
            Self::Full => write!(f, "FULL"),
        }
    }
}

/// Optional parameters of a new order
///
/// Which fields a given order type needs (for example `price` and
/// `time_in_force` for LIMIT) is checked by the exchange, not here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderParams {
    /// Time in force
    pub time_in_force: Option<TimeInForce>,
    /// Base asset quantity
    pub quantity: Option<Decimal>,
    /// Quote asset quantity (MARKET orders)
    pub quote_order_qty: Option<Decimal>,
    /// Limit price
    pub price: Option<Decimal>,
    /// Client-assigned order id
    pub new_client_order_id: Option<String>,
    /// Strategy id
    pub strategy_id: Option<u64>,
    /// Strategy type (values below 1000000 are reserved)
    pub strategy_type: Option<u64>,
    /// Stop price
    pub stop_price: Option<Decimal>,
    /// Trailing delta in basis points
    pub trailing_delta: Option<u64>,
    /// Iceberg quantity
    pub iceberg_qty: Option<Decimal>,
    /// Response shape
    pub new_order_resp_type: Option<NewOrderRespType>,
    /// Request validity window in milliseconds
    pub recv_window: Option<u64>,
}

impl OrderParams {
    /// Create empty parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set time in force
    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    /// Set base quantity
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set quote quantity
    pub fn with_quote_order_qty(mut self, qty: Decimal) -> Self {
        self.quote_order_qty = Some(qty);
        self
    }

    /// Set limit price
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Set client order id
    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.new_client_order_id = Some(id.into());
        self
    }

    /// Set strategy id and type
    pub fn with_strategy(mut self, id: u64, strategy_type: u64) -> Self {
        self.strategy_id = Some(id);
        self.strategy_type = Some(strategy_type);
        self
    }

    /// Set stop price
    pub fn with_stop_price(mut self, price: Decimal) -> Self {
        self.stop_price = Some(price);
        self
    }

    /// Set trailing delta
    pub fn with_trailing_delta(mut self, delta: u64) -> Self {
        self.trailing_delta = Some(delta);
        self
    }

    /// Set iceberg quantity
    pub fn with_iceberg_qty(mut self, qty: Decimal) -> Self {
        self.iceberg_qty = Some(qty);
        self
    }

    /// Set response type
    pub fn with_resp_type(mut self, resp_type: NewOrderRespType) -> Self {
        self.new_order_resp_type = Some(resp_type);
        self
    }

    /// Set receive window
    pub fn with_recv_window(mut self, recv_window: u64) -> Self {
        self.recv_window = Some(recv_window);
        self
    }

    /// Append the set fields to `params` using Binance's parameter names
    pub fn append_to(&self, params: &mut QueryParams) {
        params.push_opt("timeInForce", self.time_in_force);
        params.push_opt("quantity", self.quantity);
        params.push_opt("quoteOrderQty", self.quote_order_qty);
        params.push_opt("price", self.price);
        params.push_opt("newClientOrderId", self.new_client_order_id.as_deref());
        params.push_opt("strategyId", self.strategy_id);
        params.push_opt("strategyType", self.strategy_type);
        params.push_opt("stopPrice", self.stop_price);
        params.push_opt("trailingDelta", self.trailing_delta);
        params.push_opt("icebergQty", self.iceberg_qty);
        params.push_opt("newOrderRespType", self.new_order_resp_type);
        params.push_opt("recvWindow", self.recv_window);
    }
}

/// Request to place an order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// Trading pair (e.g. "BTCUSDT")
    pub symbol: String,
    /// Order side
    pub side: OrderSide,
    /// Order type
    pub order_type: OrderType,
    /// Optional parameters
    pub params: OrderParams,
}

impl OrderRequest {
    /// Create an order with the given parameters
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        order_type: OrderType,
        params: OrderParams,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type,
            params,
        }
    }

    /// Create a market order for a base quantity
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Decimal) -> Self {
        Self::new(
            symbol,
            side,
            OrderType::Market,
            OrderParams::new().with_quantity(quantity),
        )
    }

    /// Create a good-till-cancelled limit order
    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: Decimal, price: Decimal) -> Self {
        Self::new(
            symbol,
            side,
            OrderType::Limit,
            OrderParams::new()
                .with_time_in_force(TimeInForce::GoodTillCancelled)
                .with_quantity(quantity)
                .with_price(price),
        )
    }

    /// Query parameters in wire order: symbol, side, type, then the set options
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new()
            .with("symbol", self.symbol.to_uppercase())
            .with("side", self.side)
            .with("type", self.order_type);
        self.params.append_to(&mut params);
        params
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Server time response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ServerTime {
    /// Milliseconds since the Unix epoch
    #[serde(rename = "serverTime")]
    pub server_time: u64,
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    PendingCancel,
    Rejected,
    Expired,
    ExpiredInMatch,
    /// A status this client does not know about
    #[serde(other)]
    Unknown,
}

/// Asset balance
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Balance {
    /// Asset name
    pub asset: String,
    /// Available amount
    pub free: Decimal,
    /// Amount locked in open orders
    pub locked: Decimal,
}

impl Balance {
    /// Free plus locked
    pub fn total(&self) -> Decimal {
        self.free + self.locked
    }
}

/// Account information (`GET /api/v3/account`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default)]
    pub maker_commission: i64,
    #[serde(default)]
    pub taker_commission: i64,
    #[serde(default)]
    pub buyer_commission: i64,
    #[serde(default)]
    pub seller_commission: i64,
    #[serde(default)]
    pub can_trade: bool,
    #[serde(default)]
    pub can_withdraw: bool,
    #[serde(default)]
    pub can_deposit: bool,
    #[serde(default)]
    pub brokered: bool,
    /// Last account update (ms)
    #[serde(default)]
    pub update_time: u64,
    /// Account type, e.g. "SPOT"
    #[serde(default)]
    pub account_type: String,
    /// Balances (the exchange omits zero balances by default)
    #[serde(default)]
    pub balances: Vec<Balance>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl AccountInfo {
    /// Balance for a specific asset
    pub fn balance(&self, asset: &str) -> Option<&Balance> {
        self.balances.iter().find(|b| b.asset == asset)
    }

    /// Balances with a non-zero free or locked amount
    pub fn non_zero_balances(&self) -> impl Iterator<Item = &Balance> {
        self.balances.iter().filter(|b| !b.total().is_zero())
    }
}

/// Open order (`GET /api/v3/openOrders`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrder {
    pub symbol: String,
    pub order_id: u64,
    #[serde(default)]
    pub order_list_id: i64,
    #[serde(default)]
    pub client_order_id: String,
    pub price: Decimal,
    pub orig_qty: Decimal,
    pub executed_qty: Decimal,
    #[serde(default)]
    pub cummulative_quote_qty: Option<Decimal>,
    pub status: OrderStatus,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: OrderSide,
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    #[serde(default)]
    pub iceberg_qty: Option<Decimal>,
    /// Creation time (ms)
    #[serde(default)]
    pub time: u64,
    /// Last update (ms)
    #[serde(default)]
    pub update_time: u64,
    #[serde(default)]
    pub is_working: bool,
}

/// Individual fill of a new order (FULL response type)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub price: Decimal,
    pub qty: Decimal,
    pub commission: Decimal,
    pub commission_asset: String,
    #[serde(default)]
    pub trade_id: Option<i64>,
}

/// Response from placing an order
///
/// ACK responses carry only the identifiers; RESULT and FULL add the order
/// state, FULL adds fills.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub symbol: String,
    pub order_id: u64,
    #[serde(default)]
    pub order_list_id: i64,
    #[serde(default)]
    pub client_order_id: String,
    /// Transaction time (ms)
    #[serde(default)]
    pub transact_time: u64,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub orig_qty: Option<Decimal>,
    #[serde(default)]
    pub executed_qty: Option<Decimal>,
    #[serde(default)]
    pub cummulative_quote_qty: Option<Decimal>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    #[serde(default, rename = "type")]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub side: Option<OrderSide>,
    #[serde(default)]
    pub fills: Vec<Fill>,
}

/// Response from cancelling an order
///
/// Every field is optional so partial payloads still decode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderResponse {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub orig_client_order_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<u64>,
    #[serde(default)]
    pub order_list_id: Option<i64>,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub orig_qty: Option<Decimal>,
    #[serde(default)]
    pub executed_qty: Option<Decimal>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    /// Any order type can be cancelled, so this stays a string
    #[serde(default, rename = "type")]
    pub order_type: Option<String>,
    #[serde(default)]
    pub side: Option<OrderSide>,
}
