//! API credentials for Binance signed endpoints
//!
//! Implements HMAC-SHA256 signing as required by Binance's `TRADE` and
//! `USER_DATA` endpoints.
//!
//! # Security
//!
//! The secret key is stored using the `secrecy` crate which:
//! - Zeroizes memory on drop (prevents memory scanning)
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "BINANCE_API_KEY";

/// Environment variable holding the secret key
pub const SECRET_KEY_ENV: &str = "BINANCE_SECRET_KEY";

/// API credentials for signed requests
///
/// The secret key is zeroized when the Credentials are dropped and is only
/// ever used as the HMAC key.
pub struct Credentials {
    /// API key (sent in the `X-MBX-APIKEY` header)
    api_key: String,
    /// Secret key (zeroized on drop)
    secret_key: SecretString,
}

impl Credentials {
    /// Create new credentials from an API key and secret key
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidCredentials`] when either value is empty.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> AuthResult<Self> {
        let api_key = api_key.into();
        let secret_key = secret_key.into();

        if api_key.trim().is_empty() {
            return Err(AuthError::InvalidCredentials("API key is empty".to_string()));
        }
        if secret_key.trim().is_empty() {
            return Err(AuthError::InvalidCredentials("secret key is empty".to_string()));
        }

        Ok(Self {
            api_key,
            secret_key: SecretString::from(secret_key),
        })
    }

    /// Create credentials from environment variables
    ///
    /// Reads `BINANCE_API_KEY` and `BINANCE_SECRET_KEY` from the environment.
    pub fn from_env() -> AuthResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| AuthError::EnvVarNotSet(API_KEY_ENV.to_string()))?;
        let secret_key = std::env::var(SECRET_KEY_ENV)
            .map_err(|_| AuthError::EnvVarNotSet(SECRET_KEY_ENV.to_string()))?;

        Self::new(api_key, secret_key)
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign a payload
    ///
    /// Returns the lowercase hex HMAC-SHA256 of `payload` keyed by the
    /// secret key. Binance expects the payload to be the exact query string
    /// (or request body) that goes on the wire.
    pub fn sign(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl Clone for Credentials {
    /// Clone credentials (creates a new SecretString with the same content)
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            secret_key: SecretString::from(self.secret_key.expose_secret().to_string()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = self
            .api_key
            .char_indices()
            .nth(8)
            .map_or(self.api_key.as_str(), |(idx, _)| &self.api_key[..idx]);

        f.debug_struct("Credentials")
            .field("api_key", &format!("{}...", shown))
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
