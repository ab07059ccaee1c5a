//! HTTP transport abstraction
//!
//! This module provides a trait-based abstraction over a single HTTP
//! request/response exchange, enabling unit testing of the client without
//! real network calls.
//!
//! # Example
//!
//! ```no_run
//! use binance_rest::transport::{HttpRequest, HttpTransport, Method, ReqwestTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransport::new("binance-rest/0.1.0")?;
//! let request = HttpRequest::new(Method::Get, "https://testnet.binance.vision/api/v3/time");
//! let response = transport.execute(request).await?;
//! println!("{}", response.body);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::{RestError, RestResult};

/// Default time allowed for a whole request/response exchange
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Transport layer errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// DNS, connect or TLS failure
    #[error("network error: {0}")]
    Network(String),

    /// Exchange did not complete in time; the connection was dropped
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Status outside 200..=299
    #[error("HTTP status code {status}, response: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// 2xx response whose body is not JSON
    #[error("invalid JSON response: {message}")]
    Decode {
        /// Parser error message
        message: String,
        /// Raw response body
        body: String,
    },
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Upper-case method name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single outbound request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL, including the query string
    pub url: String,
    /// Extra headers (`Content-Type: application/json` is always sent)
    pub headers: Vec<(String, String)>,
    /// Optional JSON body
    pub body: Option<serde_json::Value>,
    /// Time allowed for connect, send and reading the full body
    pub timeout: Duration,
}

impl HttpRequest {
    /// Create a request with no headers, no body and the default timeout
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Value of the first header with this name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// URL path without scheme, host or query
    pub fn path(&self) -> &str {
        let without_query = self.url.split('?').next().unwrap_or(&self.url);
        match without_query.find("://") {
            Some(idx) => {
                let rest = &without_query[idx + 3..];
                rest.find('/').map_or("/", |pos| &rest[pos..])
            }
            None => without_query,
        }
    }

    /// Raw query string, if any
    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, query)| query)
    }
}

/// A successful (2xx) response with its parsed JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed body
    pub body: serde_json::Value,
}

/// Trait for HTTP transport abstraction
///
/// This trait enables unit testing of the client by allowing mock
/// implementations to be injected instead of real HTTP connections.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and buffer the full response
    ///
    /// Resolves with the parsed body for statuses 200..=299; every other
    /// outcome is a [`TransportError`].
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Map a status and raw body to the transport result
fn parse_response(status: u16, body: String) -> Result<HttpResponse, TransportError> {
    if !(200..=299).contains(&status) {
        warn!(status, "Non-success response");
        return Err(TransportError::Status { status, body });
    }

    match serde_json::from_str(&body) {
        Ok(value) => Ok(HttpResponse { status, body: value }),
        Err(e) => Err(TransportError::Decode {
            message: e.to_string(),
            body,
        }),
    }
}

/// Render a reqwest error without its URL (the query carries the signature)
fn describe(err: reqwest::Error) -> String {
    let err = err.without_url();
    match std::error::Error::source(&err) {
        Some(source) => format!("{}: {}", err, source),
        None => err.to_string(),
    }
}

/// Real HTTPS transport using reqwest
///
/// Idle connections are not kept, so every request opens its own connection.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport
    pub fn new(user_agent: impl AsRef<str>) -> RestResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent.as_ref())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| RestError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path()))]
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout;

        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .header(CONTENT_TYPE, "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        // Dropping the exchange future on timeout aborts the connection.
        let (status, body) = match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) if e.is_timeout() => {
                warn!(?timeout, "Request timed out");
                return Err(TransportError::Timeout(timeout));
            }
            Ok(Err(e)) => return Err(TransportError::Network(describe(e))),
            Err(_) => {
                warn!(?timeout, "Request timed out");
                return Err(TransportError::Timeout(timeout));
            }
        };

        debug!(status, len = body.len(), "Response received");
        parse_response(status, body)
    }
}

/// Mock transport for testing
///
/// Returns queued responses in order and records every request it receives.
/// Status codes and bodies go through the same mapping as the real transport.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: parking_lot::Mutex<std::collections::VecDeque<Result<(u16, String), TransportError>>>,
    requests: parking_lot::Mutex<Vec<HttpRequest>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTransport {
    /// Create a new mock transport with no queued responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and raw body
    pub fn push_json(&self, status: u16, body: impl Into<String>) {
        self.responses.lock().push_back(Ok((status, body.into())));
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request);

        let next = self.responses.lock().pop_front();
        match next {
            Some(Ok((status, body))) => parse_response(status, body),
            Some(Err(error)) => Err(error),
            None => Err(TransportError::Network("no mock response queued".into())),
        }
    }
}
