//! Outbound request signing
//!
//! Binance signed endpoints expect two extra query parameters appended after
//! the caller's own: `timestamp` (epoch milliseconds) and `signature`
//! (lowercase hex HMAC-SHA256). The signature covers the query string as it
//! stands once `timestamp` has been added, followed by the request body.
//!
//! Signing happens on the fully built [`reqwest::Request`], immediately before
//! it is handed to the transport, so the bytes that are signed are the bytes
//! that are sent.

use chrono::Utc;
use reqwest::{Request, Url};
use tracing::trace;

use crate::credentials::Credentials;
use crate::error::{AuthError, AuthResult};

/// Header carrying the API key on secure and signed requests
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Query parameter carrying the request timestamp
pub const TIMESTAMP_PARAM: &str = "timestamp";

/// Query parameter carrying the signature
pub const SIGNATURE_PARAM: &str = "signature";

/// Current wall-clock time in epoch milliseconds
pub fn timestamp_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

/// Signs outbound requests for `SIGNED` endpoints
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
}

impl RequestSigner {
    /// Create a signer; the credentials must carry a secret key
    pub fn new(credentials: Credentials) -> AuthResult<Self> {
        if !credentials.has_secret_key() {
            return Err(AuthError::MissingSecretKey);
        }
        Ok(Self { credentials })
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    /// Sign the request using the current time
    ///
    /// Returns the timestamp that was embedded.
    pub fn sign(&self, request: &mut Request) -> AuthResult<u64> {
        let timestamp = timestamp_ms();
        self.sign_at(request, timestamp)?;
        Ok(timestamp)
    }

    /// Sign the request with an explicit timestamp
    ///
    /// Appends `timestamp`, computes the signature over the resulting query
    /// plus body, then appends `signature`. Nothing is cached between calls.
    pub fn sign_at(&self, request: &mut Request, timestamp: u64) -> AuthResult<()> {
        append_query_pair(request.url_mut(), TIMESTAMP_PARAM, &timestamp.to_string());

        let payload = signing_payload(request)?;
        let signature = self.credentials.sign(&payload);

        append_query_pair(request.url_mut(), SIGNATURE_PARAM, &signature);

        trace!(
            method = %request.method(),
            path = request.url().path(),
            timestamp,
            "Signed request"
        );
        Ok(())
    }
}

/// The exact bytes covered by the signature: query string followed by body
pub fn signing_payload(request: &Request) -> AuthResult<Vec<u8>> {
    let mut payload = request.url().query().unwrap_or_default().as_bytes().to_vec();

    if let Some(body) = request.body() {
        let bytes = body.as_bytes().ok_or_else(|| {
            AuthError::UnsignableBody(format!("{} {}", request.method(), request.url().path()))
        })?;
        payload.extend_from_slice(bytes);
    }

    Ok(payload)
}

// Values appended here are digits or hex, so no escaping is needed and the
// existing (already encoded) query is left byte-for-byte intact.
fn append_query_pair(url: &mut Url, key: &str, value: &str) {
    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{}&{}={}", existing, key, value),
        _ => format!("{}={}", key, value),
    };
    url.set_query(Some(&query));
}
