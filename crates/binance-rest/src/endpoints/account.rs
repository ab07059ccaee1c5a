//! Private account endpoints
//!
//! These endpoints require authentication.

use binance_auth::{Credentials, QueryParams};
use tracing::{debug, instrument};

use crate::dispatch::Dispatcher;
use crate::error::RestResult;
use crate::transport::Method;
use crate::types::{AccountInfo, OpenOrder};

/// `recvWindow` sent with account queries unless the caller picks another
pub const DEFAULT_RECV_WINDOW: u64 = 5000;

/// Private account endpoints
pub struct AccountEndpoints<'a> {
    dispatcher: &'a Dispatcher,
    credentials: &'a Credentials,
}

impl<'a> AccountEndpoints<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher, credentials: &'a Credentials) -> Self {
        Self { dispatcher, credentials }
    }

    /// Get account information and balances
    ///
    /// # Arguments
    /// * `recv_window` - Validity window in ms (default: 5000)
    #[instrument(skip(self))]
    pub async fn get_account(&self, recv_window: Option<u64>) -> RestResult<AccountInfo> {
        let params = QueryParams::new()
            .with("recvWindow", recv_window.unwrap_or(DEFAULT_RECV_WINDOW));

        debug!("Fetching account information");
        self.dispatcher
            .signed(self.credentials, Method::Get, "/api/v3/account", params)
            .await
    }

    /// Get open orders
    ///
    /// # Arguments
    /// * `symbol` - Restrict to one trading pair; `None` returns all pairs
    #[instrument(skip(self))]
    pub async fn get_open_orders(&self, symbol: Option<&str>) -> RestResult<Vec<OpenOrder>> {
        let mut params = QueryParams::new();
        params.push_opt("symbol", symbol);

        debug!("Fetching open orders");
        self.dispatcher
            .signed(self.credentials, Method::Get, "/api/v3/openOrders", params)
            .await
    }
}
