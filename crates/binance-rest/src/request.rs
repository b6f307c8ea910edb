//! Declarative request descriptions
//!
//! Every endpoint builds an [`ApiRequest`] and hands it to the executor. The
//! descriptor says what to call and how it must be authenticated; it knows
//! nothing about transport, timestamps or signatures.

use std::fmt;

use crate::error::{RestError, RestResult};

/// HTTP verbs used by the REST API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Get the method as an uppercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether params travel in a form body rather than the query string
    pub fn sends_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Authentication requirement of an endpoint
///
/// Fixed per endpoint; callers never choose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrustTier {
    /// No credentials sent
    Public,
    /// API key header only (`USER_STREAM`, `MARKET_DATA` security types)
    SecureKeyOnly,
    /// API key header plus `timestamp` and `signature` (`TRADE`, `USER_DATA`)
    Signed,
}

impl TrustTier {
    /// All tiers, in slot order
    pub const ALL: [TrustTier; 3] = [Self::Public, Self::SecureKeyOnly, Self::Signed];

    /// Whether requests on this tier carry the API key header
    pub fn sends_api_key(&self) -> bool {
        !matches!(self, Self::Public)
    }

    /// Whether requests on this tier are signed
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signed)
    }

    pub(crate) fn slot(&self) -> usize {
        match self {
            Self::Public => 0,
            Self::SecureKeyOnly => 1,
            Self::Signed => 2,
        }
    }
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Public => "public",
            Self::SecureKeyOnly => "secure",
            Self::Signed => "signed",
        };
        f.write_str(s)
    }
}

/// Insertion-ordered request parameters
///
/// Order is preserved all the way to the wire, which keeps query strings
/// predictable for logging and signing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    /// Create an empty parameter list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    /// Append a parameter only when a value is present
    pub fn push_opt<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Builder-style [`push`](Self::push)
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    /// Builder-style [`push_opt`](Self::push_opt)
    pub fn with_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.push_opt(key, value);
        self
    }

    /// Look up the first value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Iterate over the pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// URL-encode as `k1=v1&k2=v2`, preserving order
    pub fn encode(&self) -> RestResult<String> {
        serde_urlencoded::to_string(&self.pairs)
            .map_err(|e| RestError::InvalidRequest(e.to_string()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        }
    }
}

/// A single REST call: method, path, params and trust tier
///
/// Built once per call and consumed by
/// [`BinanceRestClient::execute`](crate::BinanceRestClient::execute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    method: HttpMethod,
    path: String,
    params: Params,
    tier: TrustTier,
}

impl ApiRequest {
    /// Create a request with no params
    pub fn new(method: HttpMethod, path: impl Into<String>, tier: TrustTier) -> Self {
        Self {
            method,
            path: path.into(),
            params: Params::new(),
            tier,
        }
    }

    /// Public (unauthenticated) request
    pub fn public(method: HttpMethod, path: impl Into<String>) -> Self {
        Self::new(method, path, TrustTier::Public)
    }

    /// Request carrying the API key header
    pub fn secure(method: HttpMethod, path: impl Into<String>) -> Self {
        Self::new(method, path, TrustTier::SecureKeyOnly)
    }

    /// Request carrying the API key header, timestamp and signature
    pub fn signed(method: HttpMethod, path: impl Into<String>) -> Self {
        Self::new(method, path, TrustTier::Signed)
    }

    /// Attach params
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn tier(&self) -> TrustTier {
        self.tier
    }

    /// Check the descriptor is complete enough to dispatch
    pub fn validate(&self) -> RestResult<()> {
        if self.path.trim().is_empty() {
            return Err(RestError::InvalidRequest("request path is empty".to_string()));
        }
        if !self.path.starts_with('/') {
            return Err(RestError::InvalidRequest(format!(
                "request path must start with '/': {}",
                self.path
            )));
        }
        if self.path.contains('?') {
            return Err(RestError::InvalidRequest(format!(
                "request path must not carry a query string: {}",
                self.path
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
