//! Error types for credential handling and request signing

/// Errors that can occur while building credentials or signing a request
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Invalid API credentials
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// Query parameters could not be URL-encoded
    #[error("Failed to encode query string: {0}")]
    Encode(String),
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
