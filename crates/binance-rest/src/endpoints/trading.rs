//! Trading endpoints for order management
//!
//! These endpoints require authentication.

use binance_auth::{Credentials, QueryParams};
use tracing::{debug, info, instrument};

use crate::dispatch::Dispatcher;
use crate::error::RestResult;
use crate::transport::Method;
use crate::types::{CancelOrderResponse, OrderRequest, OrderResponse};

const ORDER_PATH: &str = "/api/v3/order";

/// Trading endpoints for order management
pub struct TradingEndpoints<'a> {
    dispatcher: &'a Dispatcher,
    credentials: &'a Credentials,
}

impl<'a> TradingEndpoints<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher, credentials: &'a Credentials) -> Self {
        Self { dispatcher, credentials }
    }

    /// Place a new order
    ///
    /// Field combinations (e.g. `price` for LIMIT orders) are checked by the
    /// exchange.
    #[instrument(skip(self, order), fields(symbol = %order.symbol, side = %order.side, order_type = %order.order_type))]
    pub async fn place_order(&self, order: &OrderRequest) -> RestResult<OrderResponse> {
        debug!("Placing order");

        let response: OrderResponse = self
            .dispatcher
            .signed(self.credentials, Method::Post, ORDER_PATH, order.to_params())
            .await?;

        info!(order_id = response.order_id, "Order placed");
        Ok(response)
    }

    /// Cancel an order by its exchange-assigned id
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, symbol: &str, order_id: u64) -> RestResult<CancelOrderResponse> {
        let params = QueryParams::new()
            .with("symbol", symbol.to_uppercase())
            .with("orderId", order_id);

        debug!("Cancelling order");
        self.dispatcher
            .signed(self.credentials, Method::Delete, ORDER_PATH, params)
            .await
    }
}
