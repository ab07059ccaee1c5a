//! Error types for REST API operations

use std::time::Duration;

use binance_auth::AuthError;
use serde::Deserialize;

use crate::transport::TransportError;

/// Errors that can occur during REST API operations
///
/// Callers branch on the variant: validation problems never reach the
/// network, while `Network`, `Timeout` and `Remote` describe how a request
/// that was sent went wrong.
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// An argument was rejected before any request was made
    #[error("Invalid {field}: {value}")]
    Validation {
        /// Name of the rejected argument
        field: &'static str,
        /// The value as supplied by the caller
        value: String,
    },

    /// DNS, connect or TLS failure
    #[error("Network error: {0}")]
    Network(String),

    /// Request did not complete within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Exchange answered with a non-2xx status
    #[error("HTTP status code {status}, response: {body}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Response body was not the expected JSON
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Decoder error message
        message: String,
        /// Raw response body
        body: String,
    },

    /// Missing API credentials for a signed endpoint
    #[error("Authentication required for this endpoint")]
    AuthRequired,

    /// Credential or signing failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<TransportError> for RestError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(message) => Self::Network(message),
            TransportError::Timeout(after) => Self::Timeout(after),
            TransportError::Status { status, body } => Self::Remote { status, body },
            TransportError::Decode { message, body } => Self::Decode { message, body },
        }
    }
}

/// Error payload returned by Binance alongside non-2xx statuses
///
/// ```json
/// {"code": -1021, "msg": "Timestamp for this request is outside of the recvWindow."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorPayload {
    /// Binance error code (negative)
    pub code: i64,
    /// Human-readable message
    pub msg: String,
}

impl ApiErrorPayload {
    /// Timestamp outside of `recvWindow` or ahead of server time
    pub const INVALID_TIMESTAMP: i64 = -1021;
    /// Signature did not match
    pub const INVALID_SIGNATURE: i64 = -1022;
    /// Unknown order sent
    pub const NO_SUCH_ORDER: i64 = -2013;
}

impl RestError {
    /// HTTP status of a `Remote` error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parse the Binance `{code, msg}` payload of a `Remote` error
    ///
    /// Returns `None` for other variants or when the body has another shape.
    pub fn api_error(&self) -> Option<ApiErrorPayload> {
        match self {
            Self::Remote { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }

    /// Whether the same request could succeed if the caller tried again
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Remote { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Check if the error was raised before any request was sent
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;
