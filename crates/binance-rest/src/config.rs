//! Client configuration

use std::str::FromStr;
use std::time::Duration;

use binance_auth::Credentials;
use tracing::{Dispatch, Level};

use crate::error::{RestError, RestResult};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Known-good API hosts; one is picked per client unless a base URL is set
pub const DEFAULT_BASE_URLS: &[&str] = &["https://api.binance.us"];

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "BINANCE_BASE_URL";
/// Environment variable setting the timeout in seconds
pub const TIMEOUT_ENV: &str = "BINANCE_TIMEOUT_SECS";
/// Environment variable setting the exchange log level
pub const LOG_LEVEL_ENV: &str = "BINANCE_LOG_LEVEL";
/// Environment variable setting the default `recvWindow`
pub const RECV_WINDOW_ENV: &str = "BINANCE_RECV_WINDOW";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API credentials (may be empty for public-only use)
    pub credentials: Credentials,
    /// Base URL override; `None` picks from [`DEFAULT_BASE_URLS`]
    pub base_url: Option<String>,
    /// Request timeout (connect + read)
    pub timeout: Duration,
    /// Level at which request/response exchanges are logged.
    /// Headers and bodies are only logged at DEBUG or TRACE.
    pub log_level: Level,
    /// `recvWindow` added to signed requests that do not set one
    pub recv_window: Option<u64>,
    /// Custom user agent
    pub user_agent: Option<String>,
    /// Subscriber that receives this client's logs instead of the global one
    pub dispatch: Option<Dispatch>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::anonymous(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            log_level: Level::INFO,
            recv_window: None,
            user_agent: None,
            dispatch: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Credentials come from `BINANCE_API_KEY` / `BINANCE_SECRET_KEY`; the
    /// optional `BINANCE_BASE_URL`, `BINANCE_TIMEOUT_SECS`,
    /// `BINANCE_LOG_LEVEL` and `BINANCE_RECV_WINDOW` override the defaults.
    pub fn from_env() -> RestResult<Self> {
        let mut config = Self::new().with_credentials(Credentials::from_env()?);
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> RestResult<()> {
        if let Some(url) = lookup(BASE_URL_ENV) {
            self.base_url = Some(url);
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            let secs = parse_env::<f64>(TIMEOUT_ENV, &secs)?;
            if !secs.is_finite() || secs <= 0.0 {
                return Err(RestError::InvalidConfig(format!(
                    "{} must be a positive number of seconds",
                    TIMEOUT_ENV
                )));
            }
            self.timeout = Duration::from_secs_f64(secs);
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            self.log_level = parse_env::<Level>(LOG_LEVEL_ENV, &level)?;
        }
        if let Some(window) = lookup(RECV_WINDOW_ENV) {
            self.recv_window = Some(parse_env::<u64>(RECV_WINDOW_ENV, &window)?);
        }
        Ok(())
    }

    /// Set credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the base URL (e.g. a test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the exchange log level
    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Set the default `recvWindow` for signed requests (milliseconds)
    pub fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window = Some(recv_window_ms);
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Route this client's logs to a specific subscriber
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Whether header and body details are logged
    pub fn logs_details(&self) -> bool {
        self.log_level >= Level::DEBUG
    }
}

fn parse_env<T: FromStr>(name: &str, raw: &str) -> RestResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| RestError::InvalidConfig(format!("{} has an invalid value: {}", name, raw)))
}
