//! Ordered query-string encoding
//!
//! Binance verifies the signature against the query string exactly as it was
//! sent, so parameters keep their insertion order and are encoded once.

use std::fmt::Display;

use crate::error::{AuthError, AuthResult};

/// Insertion-ordered request parameters
///
/// Values are stored already rendered to text, so numbers and decimals are
/// formatted with their `Display` impl at the moment they are pushed.
///
/// # Example
///
/// ```
/// use binance_auth::QueryParams;
///
/// let params = QueryParams::new()
///     .with("symbol", "BTCUSDT")
///     .with("orderId", 12345);
///
/// assert_eq!(params.encode().unwrap(), "symbol=BTCUSDT&orderId=12345");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create an empty parameter list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.push(key, value);
        self
    }

    /// Append a parameter
    pub fn push(&mut self, key: impl Into<String>, value: impl Display) {
        self.pairs.push((key.into(), value.to_string()));
    }

    /// Append a parameter only when a value is present
    pub fn push_opt<V: Display>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Replace the value of an existing parameter in place, or append it
    pub fn set(&mut self, key: impl Into<String>, value: impl Display) {
        let key = key.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Append every pair from another parameter list
    pub fn extend(&mut self, other: QueryParams) {
        self.pairs.extend(other.pairs);
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no parameters were added
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Check whether a parameter with this name exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Value of the first parameter with this name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over the pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode as `application/x-www-form-urlencoded`
    ///
    /// Keys and values are percent-encoded, joined with `=` and separated by
    /// `&`. An empty list encodes to an empty string.
    pub fn encode(&self) -> AuthResult<String> {
        serde_urlencoded::to_string(&self.pairs).map_err(|e| AuthError::Encode(e.to_string()))
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.push(key, value);
        }
        params
    }
}
