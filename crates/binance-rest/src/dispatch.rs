//! Request dispatch shared by all endpoint groups

use std::sync::Arc;
use std::time::Duration;

use binance_auth::{Credentials, QueryParams, RequestSigner};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::clock::ServerClock;
use crate::error::{RestError, RestResult};
use crate::transport::{HttpRequest, HttpTransport, Method};
use crate::types::ServerTime;

/// Header carrying the API key on signed requests
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Path of the server time endpoint
pub(crate) const SERVER_TIME_PATH: &str = "/api/v3/time";

/// Builds, signs and sends requests against one base URL
pub(crate) struct Dispatcher {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    timeout: Duration,
    clock: ServerClock,
}

impl Dispatcher {
    pub(crate) fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        timeout: Duration,
        clock: ServerClock,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            clock,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query)
        }
    }

    async fn send(&self, request: HttpRequest) -> RestResult<Value> {
        let response = self.transport.execute(request.with_timeout(self.timeout)).await?;
        Ok(response.body)
    }

    /// Unsigned GET
    pub(crate) async fn public<T: DeserializeOwned>(
        &self,
        path: &str,
        params: QueryParams,
    ) -> RestResult<T> {
        let query = params.encode()?;
        debug!("Making public request to {}", path);

        let body = self.send(HttpRequest::new(Method::Get, self.url(path, &query))).await?;
        decode(body)
    }

    /// Exchange time in milliseconds since the Unix epoch
    pub(crate) async fn server_time(&self) -> RestResult<u64> {
        let time: ServerTime = self.public(SERVER_TIME_PATH, QueryParams::new()).await?;
        Ok(time.server_time)
    }

    /// Signed request: timestamp, sign, attach the API key and send
    #[instrument(skip(self, credentials, params))]
    pub(crate) async fn signed<T: DeserializeOwned>(
        &self,
        credentials: &Credentials,
        method: Method,
        path: &str,
        params: QueryParams,
    ) -> RestResult<T> {
        let timestamp = self.clock.now(move || self.server_time()).await?;
        let signer = RequestSigner::new(credentials);
        let signed = signer.sign(params, timestamp)?;

        debug!("Making authenticated request to {}", path);

        let request = HttpRequest::new(method, self.url(path, &signed.to_query_string()))
            .with_header(API_KEY_HEADER, signer.api_key());
        let body = self.send(request).await?;
        decode(body)
    }
}

/// Decode a JSON body into `T`, keeping the raw text on mismatch
fn decode<T: DeserializeOwned>(body: Value) -> RestResult<T> {
    T::deserialize(&body).map_err(|e| RestError::Decode {
        message: e.to_string(),
        body: body.to_string(),
    })
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("timestamp_policy", &self.clock.policy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TimestampPolicy;
    use crate::transport::MockTransport;

    fn dispatcher(mock: Arc<MockTransport>, policy: TimestampPolicy) -> Dispatcher {
        Dispatcher::new(
            mock,
            "https://testnet.binance.vision/",
            Duration::from_millis(750),
            ServerClock::new(policy),
        )
    }

    fn creds() -> Credentials {
        Credentials::new("test-api-key", "test-secret").unwrap()
    }

    #[tokio::test]
    async fn test_public_request_url_and_timeout() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, r#"{"serverTime":1700000000000}"#);
        let dispatcher = dispatcher(mock.clone(), TimestampPolicy::ServerTimeEachRequest);

        assert_eq!(dispatcher.server_time().await.unwrap(), 1700000000000);

        let request = mock.last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url, "https://testnet.binance.vision/api/v3/time");
        assert_eq!(request.timeout, Duration::from_millis(750));
        assert!(request.header(API_KEY_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_signed_request_fetches_time_then_signs() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, r#"{"serverTime":1700000000000}"#);
        mock.push_json(200, r#"{"ok":true}"#);
        let dispatcher = dispatcher(mock.clone(), TimestampPolicy::ServerTimeEachRequest);
        let creds = creds();

        let body: Value = dispatcher
            .signed(&creds, Method::Get, "/api/v3/account", QueryParams::new().with("recvWindow", 5000))
            .await
            .unwrap();
        assert_eq!(body["ok"], true);

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].path(), SERVER_TIME_PATH);

        let signed = &requests[1];
        assert_eq!(signed.header(API_KEY_HEADER), Some("test-api-key"));
        let expected = creds.sign("recvWindow=5000&timestamp=1700000000000");
        assert_eq!(
            signed.query(),
            Some(format!("recvWindow=5000&timestamp=1700000000000&signature={}", expected).as_str())
        );
    }

    #[tokio::test]
    async fn test_time_failure_stops_signed_request() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(503, "unavailable");
        let dispatcher = dispatcher(mock.clone(), TimestampPolicy::ServerTimeEachRequest);

        let result: RestResult<Value> = dispatcher
            .signed(&creds(), Method::Get, "/api/v3/account", QueryParams::new())
            .await;

        assert!(matches!(result, Err(RestError::Remote { status: 503, .. })));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_decode_error() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, r#"{"unexpected":1}"#);
        let dispatcher = dispatcher(mock, TimestampPolicy::LocalClock);

        let result = dispatcher.server_time().await;
        match result {
            Err(RestError::Decode { body, .. }) => assert_eq!(body, r#"{"unexpected":1}"#),
            other => panic!("expected decode error, got {:?}", other),
        }
    }
}
