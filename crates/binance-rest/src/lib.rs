//! REST API client for the Binance Spot exchange
//!
//! This crate signs and sends requests to Binance's Spot REST API (testnet
//! by default): server time, order placement and cancellation, account
//! information and open orders.
//!
//! # Features
//!
//! - **Market Data**: Server time
//! - **Account**: Balances and permissions, open orders
//! - **Trading**: Place and cancel orders
//!
//! # Authentication
//!
//! Signed endpoints require API credentials. Each signed request carries a
//! `timestamp` and an HMAC-SHA256 `signature` of its query string, plus the
//! `X-MBX-APIKEY` header.
//!
//! # Example
//!
//! ```no_run
//! use binance_rest::{BinanceRestClient, Credentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Public endpoints (no auth required)
//!     let client = BinanceRestClient::new()?;
//!     println!("Server time: {}", client.get_server_time().await?);
//!
//!     // Signed endpoints (auth required)
//!     let creds = Credentials::from_env()?;
//!     let auth_client = BinanceRestClient::with_credentials(creds)?;
//!     let account = auth_client.get_user_data(None).await?;
//!     for balance in account.non_zero_balances() {
//!         println!("{}: {}", balance.asset, balance.free);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Timestamps
//!
//! By default every signed call first fetches the server time. See
//! [`TimestampPolicy`] for the cached-offset and local-clock alternatives.
//!
//! The client never retries; [`RestError::is_retryable`] tells callers which
//! failures are worth another attempt.

pub mod client;
pub mod clock;
mod dispatch;
pub mod endpoints;
pub mod error;
pub mod transport;
pub mod types;

// Re-export main types
pub use binance_auth::{Credentials, QueryParams};
pub use client::{BinanceRestClient, ClientConfig, DEFAULT_BASE_URL};
pub use clock::TimestampPolicy;
pub use dispatch::API_KEY_HEADER;
pub use error::{ApiErrorPayload, RestError, RestResult};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockTransport;

// Re-export endpoint-specific types
pub use types::{
    // Account
    AccountInfo, Balance, OpenOrder,
    // Trading
    NewOrderRespType, OrderParams, OrderRequest, OrderSide, OrderStatus, OrderType, TimeInForce,
    // Responses
    CancelOrderResponse, Fill, OrderResponse, ServerTime,
};
