//! Per-tier HTTP connections
//!
//! A [`Connection`] is an HTTP client bound to one base URL and one
//! [`TrustTier`]: it owns the default headers for that tier and, for the
//! signed tier, the [`RequestSigner`] applied to every outbound request.
//!
//! [`ConnectionProvider`] builds connections lazily and caches one per tier.
//! Cached handles are never mutated; a reload swaps in a new `Arc`, so
//! requests already holding the old handle finish on it undisturbed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use binance_auth::{RequestSigner, API_KEY_HEADER};
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, Level};

use crate::config::{ClientConfig, DEFAULT_BASE_URLS};
use crate::error::{RestError, RestResult};
use crate::request::{ApiRequest, TrustTier};
use crate::response::Response;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// tracing macros need a const level; pick one at runtime
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        if $level == Level::ERROR {
            tracing::error!($($arg)+)
        } else if $level == Level::WARN {
            tracing::warn!($($arg)+)
        } else if $level == Level::INFO {
            tracing::info!($($arg)+)
        } else if $level == Level::DEBUG {
            tracing::debug!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    };
}

/// HTTP client configured for one trust tier
pub struct Connection {
    tier: TrustTier,
    base_url: String,
    http: reqwest::Client,
    signer: Option<RequestSigner>,
    timeout: Duration,
    log_level: Level,
    recv_window: Option<u64>,
}

impl Connection {
    /// Build a connection for `tier` against `base_url`
    pub fn build(tier: TrustTier, base_url: &str, config: &ClientConfig) -> RestResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            RestError::InvalidConfig(format!("invalid base URL {}: {}", base_url, e))
        })?;

        let credentials = &config.credentials;
        let mut headers = HeaderMap::new();

        if tier.sends_api_key() {
            if !credentials.has_api_key() {
                return Err(RestError::MissingCredentials {
                    tier,
                    reason: "API key not configured",
                });
            }
            let name = HeaderName::from_bytes(API_KEY_HEADER.as_bytes())
                .map_err(|e| RestError::InvalidConfig(e.to_string()))?;
            let mut value = HeaderValue::from_str(credentials.api_key()).map_err(|_| {
                RestError::InvalidConfig("API key is not a valid header value".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let signer = if tier.is_signed() {
            if !credentials.has_secret_key() {
                return Err(RestError::MissingCredentials {
                    tier,
                    reason: "secret key not configured",
                });
            }
            Some(RequestSigner::new(credentials.clone())?)
        } else {
            None
        };

        // 3xx is classified like any other status, never followed
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(headers)
            .user_agent(config.user_agent.as_deref().unwrap_or(concat!(
                "binance-rest/",
                env!("CARGO_PKG_VERSION")
            )))
            .build()
            .map_err(|e| RestError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            tier,
            base_url,
            http,
            signer,
            timeout: config.timeout,
            log_level: config.log_level,
            recv_window: config.recv_window,
        })
    }

    pub fn tier(&self) -> TrustTier {
        self.tier
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether outbound requests are signed
    pub fn is_signed(&self) -> bool {
        self.signer.is_some()
    }

    fn logs_details(&self) -> bool {
        self.log_level >= Level::DEBUG
    }

    /// Build the outbound request: params in the query for GET/DELETE, in a
    /// form body for POST/PUT, then signed if this is the signed tier.
    pub fn prepare(&self, request: &ApiRequest) -> RestResult<reqwest::Request> {
        let mut params = request.params().clone();
        if let (true, Some(window)) = (self.is_signed(), self.recv_window) {
            if !params.contains("recvWindow") {
                params.push("recvWindow", window);
            }
        }
        let encoded = params.encode()?;

        let mut url = Url::parse(&format!("{}{}", self.base_url, request.path()))
            .map_err(|e| RestError::InvalidRequest(format!("{}: {}", request, e)))?;

        let method = request.method();
        if !method.sends_body() && !encoded.is_empty() {
            url.set_query(Some(&encoded));
        }

        let mut builder = self.http.request(method.into(), url);
        if method.sends_body() && !encoded.is_empty() {
            builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(encoded);
        }

        let mut outbound = builder
            .build()
            .map_err(|e| RestError::InvalidRequest(format!("{}: {}", request, e)))?;

        if let Some(signer) = &self.signer {
            signer.sign(&mut outbound)?;
        }

        Ok(outbound)
    }

    /// Send one request and read the full response; no retries
    pub async fn send(&self, request: &ApiRequest) -> RestResult<Response> {
        let outbound = self.prepare(request)?;

        log_at!(
            self.log_level,
            method = %outbound.method(),
            url = %outbound.url(),
            tier = %self.tier,
            "request"
        );
        if self.logs_details() {
            let body = outbound
                .body()
                .and_then(|b| b.as_bytes())
                .map(String::from_utf8_lossy)
                .unwrap_or_default();
            log_at!(self.log_level, headers = ?outbound.headers(), body = %body, "request details");
        }

        let started = Instant::now();
        let reply = self
            .http
            .execute(outbound)
            .await
            .map_err(|e| transport_error(request, e))?;

        let status = reply.status().as_u16();
        let retry_after = parse_retry_after(reply.headers());
        let reply_headers = self.logs_details().then(|| format!("{:?}", reply.headers()));

        let bytes = reply
            .bytes()
            .await
            .map_err(|e| transport_error(request, e))?;

        log_at!(
            self.log_level,
            status,
            method = %request.method(),
            path = request.path(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response"
        );
        if let Some(headers) = reply_headers {
            log_at!(
                self.log_level,
                headers = %headers,
                body = %String::from_utf8_lossy(&bytes),
                "response details"
            );
        }

        let body = decode_body(request, status, &bytes)?;
        Ok(Response::new(status, body).with_retry_after(retry_after))
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("tier", &self.tier)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("signed", &self.is_signed())
            .finish()
    }
}

fn transport_error(request: &ApiRequest, source: reqwest::Error) -> RestError {
    if source.is_timeout() {
        RestError::Timeout {
            request: request.clone(),
        }
    } else {
        RestError::Transport {
            request: request.clone(),
            source,
        }
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Empty bodies become `Null`. Error bodies that are not JSON (WAF pages,
/// gateway HTML) are kept as a string so classification still works.
fn decode_body(request: &ApiRequest, status: u16, bytes: &[u8]) -> RestResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(e) if (200..300).contains(&status) => Err(RestError::Decode(format!(
            "{} returned a non-JSON body: {}",
            request, e
        ))),
        Err(_) => Ok(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}

/// Lazily built, per-tier cache of [`Connection`]s
pub struct ConnectionProvider {
    config: ClientConfig,
    base_url: RwLock<Option<Arc<str>>>,
    slots: [RwLock<Option<Arc<Connection>>>; 3],
}

impl ConnectionProvider {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            base_url: RwLock::new(None),
            slots: Default::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The base URL in use, selecting one on first call
    ///
    /// A configured override always wins; otherwise one of the known hosts is
    /// picked at random and kept until [`reload`](Self::reload).
    pub fn base_url(&self) -> Arc<str> {
        if let Some(url) = self.base_url.read().as_ref() {
            return Arc::clone(url);
        }

        let mut guard = self.base_url.write();
        if let Some(url) = guard.as_ref() {
            return Arc::clone(url);
        }

        let selected: Arc<str> = match &self.config.base_url {
            Some(url) => Arc::from(url.as_str()),
            None => {
                let host = DEFAULT_BASE_URLS
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or(DEFAULT_BASE_URLS[0]);
                Arc::from(host)
            }
        };
        debug!(base_url = %selected, "Selected base URL");
        *guard = Some(Arc::clone(&selected));
        selected
    }

    /// Get the cached connection for `tier`, building it on first use
    ///
    /// Concurrent first use builds exactly one connection.
    pub fn connection_for(&self, tier: TrustTier) -> RestResult<Arc<Connection>> {
        let slot = &self.slots[tier.slot()];

        if let Some(connection) = slot.read().as_ref() {
            return Ok(Arc::clone(connection));
        }

        let mut guard = slot.write();
        if let Some(connection) = guard.as_ref() {
            return Ok(Arc::clone(connection));
        }

        let connection = Arc::new(Connection::build(tier, &self.base_url(), &self.config)?);
        debug!(tier = %tier, base_url = connection.base_url(), "Created connection");
        *guard = Some(Arc::clone(&connection));
        Ok(connection)
    }

    /// Rebuild the connection for one tier against the current base URL
    pub fn reload_tier(&self, tier: TrustTier) -> RestResult<Arc<Connection>> {
        let connection = Arc::new(Connection::build(tier, &self.base_url(), &self.config)?);
        *self.slots[tier.slot()].write() = Some(Arc::clone(&connection));
        debug!(tier = %tier, "Reloaded connection");
        Ok(connection)
    }

    /// Drop every cached connection and re-select the base URL
    pub fn reload(&self) {
        *self.base_url.write() = None;
        for slot in &self.slots {
            *slot.write() = None;
        }
        debug!("Reloaded all connections");
    }
}

impl std::fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("base_url", &*self.base_url.read())
            .finish()
    }
}
