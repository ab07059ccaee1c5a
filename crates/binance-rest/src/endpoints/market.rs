//! Public market data endpoints
//!
//! These endpoints don't require authentication.

use tracing::{debug, instrument};

use crate::dispatch::Dispatcher;
use crate::error::RestResult;

/// Public market data endpoints
pub struct MarketEndpoints<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> MarketEndpoints<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Get server time in milliseconds since the Unix epoch
    #[instrument(skip(self))]
    pub async fn get_server_time(&self) -> RestResult<u64> {
        debug!("Fetching server time");
        self.dispatcher.server_time().await
    }
}
