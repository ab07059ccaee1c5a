//! Signed query construction
//!
//! A signed request is the encoded parameters plus a `timestamp`, followed by
//! `&signature=<hex>` where the signature covers the exact encoded bytes.

use tracing::trace;

use crate::credentials::Credentials;
use crate::error::AuthResult;
use crate::query::QueryParams;

/// Name of the timestamp parameter merged into every signed request
pub const TIMESTAMP_PARAM: &str = "timestamp";

/// Name of the signature parameter appended after signing
pub const SIGNATURE_PARAM: &str = "signature";

/// An encoded query string together with its signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedQuery {
    query: String,
    signature: String,
}

impl SignedQuery {
    /// The encoded query the signature was computed over
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Lowercase hex HMAC-SHA256 of [`SignedQuery::query`]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The wire form: `<query>&signature=<signature>`
    pub fn to_query_string(&self) -> String {
        format!("{}&{}={}", self.query, SIGNATURE_PARAM, self.signature)
    }
}

/// Request signer for building authenticated requests
#[derive(Debug)]
pub struct RequestSigner<'a> {
    credentials: &'a Credentials,
}

impl<'a> RequestSigner<'a> {
    /// Create a new request signer
    pub fn new(credentials: &'a Credentials) -> Self {
        Self { credentials }
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    /// Merge `timestamp` into `params`, encode them and sign the result
    ///
    /// An existing `timestamp` parameter keeps its position and gets the new
    /// value; otherwise it is appended last.
    pub fn sign(&self, mut params: QueryParams, timestamp: u64) -> AuthResult<SignedQuery> {
        params.set(TIMESTAMP_PARAM, timestamp);
        let query = params.encode()?;
        let signature = self.credentials.sign(&query);
        trace!(params = params.len(), timestamp, "Signed query");

        Ok(SignedQuery { query, signature })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new(
            "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A",
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j",
        )
        .unwrap()
    }

    #[test]
    fn test_timestamp_is_appended_and_signed() {
        let creds = creds();
        let signer = RequestSigner::new(&creds);

        let params = QueryParams::new()
            .with("symbol", "LTCBTC")
            .with("side", "BUY")
            .with("type", "LIMIT")
            .with("timeInForce", "GTC")
            .with("quantity", 1)
            .with("price", "0.1")
            .with("recvWindow", 5000);

        let signed = signer.sign(params, 1499827319559).unwrap();

        assert_eq!(
            signed.query(),
            "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559"
        );
        assert_eq!(
            signed.signature(),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
        assert_eq!(
            signed.to_query_string(),
            format!("{}&signature={}", signed.query(), signed.signature())
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let creds = creds();
        let signer = RequestSigner::new(&creds);
        let params = QueryParams::new().with("symbol", "BTCUSDT").with("orderId", 12345);

        let first = signer.sign(params.clone(), 1700000000000).unwrap();
        let second = signer.sign(params, 1700000000000).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_any_change_alters_signature() {
        let creds = creds();
        let signer = RequestSigner::new(&creds);
        let base = signer
            .sign(QueryParams::new().with("symbol", "BTCUSDT"), 1700000000000)
            .unwrap();

        let other_value = signer
            .sign(QueryParams::new().with("symbol", "BTCUSDC"), 1700000000000)
            .unwrap();
        let other_time = signer
            .sign(QueryParams::new().with("symbol", "BTCUSDT"), 1700000000001)
            .unwrap();

        assert_ne!(base.signature(), other_value.signature());
        assert_ne!(base.signature(), other_time.signature());
    }

    #[test]
    fn test_empty_params_sign_timestamp_only() {
        let creds = creds();
        let signed = RequestSigner::new(&creds)
            .sign(QueryParams::new(), 1700000000000)
            .unwrap();

        assert_eq!(signed.query(), "timestamp=1700000000000");
        assert!(signed.to_query_string().starts_with("timestamp=1700000000000&signature="));
    }

    #[test]
    fn test_existing_timestamp_keeps_position() {
        let creds = creds();
        let params = QueryParams::new().with("timestamp", 1).with("symbol", "BTCUSDT");
        let signed = RequestSigner::new(&creds).sign(params, 42).unwrap();

        assert_eq!(signed.query(), "timestamp=42&symbol=BTCUSDT");
    }

    #[test]
    fn test_signature_matches_credentials_sign() {
        let creds = creds();
        let signed = RequestSigner::new(&creds)
            .sign(QueryParams::new().with("recvWindow", 5000), 1700000000000)
            .unwrap();

        assert_eq!(signed.signature(), creds.sign(signed.query()));
    }
}
