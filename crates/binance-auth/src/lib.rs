//! Credentials and request signing for the Binance Spot REST API
//!
//! Binance `TRADE` and `USER_DATA` endpoints authenticate a request by an
//! HMAC-SHA256 signature over its exact query string. This crate provides the
//! three pieces needed to produce one:
//!
//! - [`Credentials`] - API key plus secret key (zeroized on drop)
//! - [`QueryParams`] - insertion-ordered, URL-encoded parameters
//! - [`RequestSigner`] - merges the timestamp, encodes, signs
//!
//! # Example
//!
//! ```
//! use binance_auth::{Credentials, QueryParams, RequestSigner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let creds = Credentials::new("api-key", "secret-key")?;
//! let params = QueryParams::new()
//!     .with("symbol", "BTCUSDT")
//!     .with("orderId", 12345);
//!
//! let signed = RequestSigner::new(&creds).sign(params, 1700000000000)?;
//! assert!(signed
//!     .to_query_string()
//!     .starts_with("symbol=BTCUSDT&orderId=12345&timestamp=1700000000000&signature="));
//! # Ok(())
//! # }
//! ```

mod credentials;
mod error;
mod query;
mod signer;

pub use credentials::{Credentials, API_KEY_ENV, SECRET_KEY_ENV};
pub use error::{AuthError, AuthResult};
pub use query::QueryParams;
pub use signer::{RequestSigner, SignedQuery, SIGNATURE_PARAM, TIMESTAMP_PARAM};
