//! Error types for REST API operations
//!
//! Every failed call surfaces as exactly one [`RestError`]. Nothing is retried
//! inside the client; [`RestError::recovery_strategy`] is advice for callers
//! that want to build their own retry policy.

use std::fmt;
use std::time::Duration;

use binance_auth::AuthError;

use crate::request::{ApiRequest, HttpMethod, TrustTier};
use crate::response::Response;

/// A non-2xx response, with the request that produced it
#[derive(Debug, Clone)]
pub struct ApiFailure {
    request: ApiRequest,
    response: Response,
}

impl ApiFailure {
    pub fn new(request: ApiRequest, response: Response) -> Self {
        Self { request, response }
    }

    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn status(&self) -> u16 {
        self.response.status()
    }

    pub fn code(&self) -> Option<i64> {
        self.response.error_code()
    }

    pub fn message(&self) -> Option<&str> {
        self.response.error_message()
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.status())?;
        if let Some(code) = self.code() {
            write!(f, "[{}]", code)?;
        }
        write!(f, " {}", self.request)?;
        if let Some(msg) = self.message() {
            write!(f, " - {}", msg)?;
        }
        Ok(())
    }
}

/// Errors that can occur during REST API operations
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// The transport gave up waiting (connect, send or body read)
    #[error("[Timeout] {request}")]
    Timeout { request: ApiRequest },

    /// Transport failure before any response arrived (DNS, refused, TLS, ...)
    #[error("[Error] {request}: {source}")]
    Transport {
        request: ApiRequest,
        source: reqwest::Error,
    },

    /// HTTP 403: a web application firewall rule blocked the request
    #[error("[WAFLimit]{0}")]
    WafLimit(Box<ApiFailure>),

    /// HTTP 418: the caller's IP was auto-banned after repeated 429s
    ///
    /// Stop sending traffic; retrying extends the ban.
    #[error("[IPBanned]{0}")]
    IpBanned(Box<ApiFailure>),

    /// HTTP 429: request rate limit exceeded; back off
    #[error("[RateLimitExceeded]{0}")]
    RateLimitExceeded(Box<ApiFailure>),

    /// HTTP 504: the exchange accepted the request but did not answer in time
    ///
    /// **The execution status is UNKNOWN.** This is not a failure report:
    /// the operation may well have taken effect. Never resubmit an order on
    /// this error without first querying its status.
    #[error("[ResponseReadTimeout]{0}")]
    ResponseReadTimeout(Box<ApiFailure>),

    /// Any other HTTP 4xx: the request itself was wrong (params, signature, ...)
    #[error("[MalformedRequest]{0}")]
    MalformedRequest(Box<ApiFailure>),

    /// Any other non-2xx, typically 5xx
    #[error("[InternalServerError]{0}")]
    InternalServer(Box<ApiFailure>),

    /// The trust tier needs credentials the client was not given
    #[error("Credentials missing for {tier} request: {reason}")]
    MissingCredentials {
        tier: TrustTier,
        reason: &'static str,
    },

    /// The request descriptor is incomplete or malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Client configuration could not be applied
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A successful response could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Credential loading or signing failed
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl RestError {
    /// The HTTP failure details, for status-classified errors
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::WafLimit(f)
            | Self::IpBanned(f)
            | Self::RateLimitExceeded(f)
            | Self::ResponseReadTimeout(f)
            | Self::MalformedRequest(f)
            | Self::InternalServer(f) => Some(f),
            _ => None,
        }
    }

    /// The request that failed, when one was dispatched or attempted
    pub fn request(&self) -> Option<&ApiRequest> {
        match self {
            Self::Timeout { request } | Self::Transport { request, .. } => Some(request),
            _ => self.failure().map(ApiFailure::request),
        }
    }

    /// The response, when one was received
    pub fn response(&self) -> Option<&Response> {
        self.failure().map(ApiFailure::response)
    }

    /// HTTP status, when a response was received
    pub fn status(&self) -> Option<u16> {
        self.failure().map(ApiFailure::status)
    }

    /// Exchange error code from the response body
    pub fn code(&self) -> Option<i64> {
        self.failure().and_then(ApiFailure::code)
    }

    /// Exchange error message from the response body
    pub fn message(&self) -> Option<&str> {
        self.failure().and_then(ApiFailure::message)
    }

    /// `Retry-After` hint from the response
    pub fn retry_after(&self) -> Option<Duration> {
        self.response().and_then(Response::retry_after)
    }

    /// Whether the operation may have taken effect despite the error
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, Self::ResponseReadTimeout(_))
    }

    /// Get the recovery strategy for this error
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        let hinted_ms = self.retry_after().map(|d| d.as_millis() as u64);

        match self {
            Self::RateLimitExceeded(_) => RecoveryStrategy::Backoff {
                initial_ms: hinted_ms.unwrap_or(1_000),
                max_ms: 60_000,
                multiplier: 2,
            },
            Self::WafLimit(_) => RecoveryStrategy::Backoff {
                initial_ms: hinted_ms.unwrap_or(5_000),
                max_ms: 300_000,
                multiplier: 2,
            },
            Self::IpBanned(_) => RecoveryStrategy::Halt {
                retry_after_ms: hinted_ms,
            },
            Self::ResponseReadTimeout(_) => RecoveryStrategy::VerifyBeforeRetry,
            Self::Timeout { request } if request.method() != HttpMethod::Get => {
                RecoveryStrategy::VerifyBeforeRetry
            }
            Self::Timeout { .. } | Self::Transport { .. } => RecoveryStrategy::Retry {
                delay_ms: 1_000,
                max_attempts: 3,
            },
            Self::InternalServer(_) => RecoveryStrategy::service_retry(),
            Self::MalformedRequest(_)
            | Self::MissingCredentials { .. }
            | Self::InvalidRequest(_)
            | Self::InvalidConfig(_)
            | Self::Decode(_)
            | Self::Auth(_) => RecoveryStrategy::Fatal,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.recovery_strategy().allows_retry()
    }

    /// Check if this error indicates rate limiting or a ban
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded(_) | Self::IpBanned(_) | Self::WafLimit(_)
        )
    }
}

/// Recovery strategy for handling API errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Exponential backoff before retry
    Backoff {
        initial_ms: u64,
        max_ms: u64,
        multiplier: u32,
    },
    /// Fixed delay retry
    Retry { delay_ms: u64, max_attempts: u32 },
    /// Query the operation's status before deciding to resubmit
    VerifyBeforeRetry,
    /// Stop all traffic to the exchange (until the hint, if any, has passed)
    Halt { retry_after_ms: Option<u64> },
    /// Cannot recover programmatically
    Fatal,
}

impl RecoveryStrategy {
    /// Default retry for transient service errors
    pub fn service_retry() -> Self {
        Self::Retry {
            delay_ms: 5_000,
            max_attempts: 3,
        }
    }

    /// Get the initial delay duration
    pub fn initial_delay(&self) -> Option<Duration> {
        match self {
            Self::Backoff { initial_ms, .. } => Some(Duration::from_millis(*initial_ms)),
            Self::Retry { delay_ms, .. } => Some(Duration::from_millis(*delay_ms)),
            Self::Halt { retry_after_ms } => retry_after_ms.map(Duration::from_millis),
            _ => None,
        }
    }

    /// Check if this strategy allows an immediate blind retry
    pub fn allows_retry(&self) -> bool {
        matches!(self, Self::Backoff { .. } | Self::Retry { .. })
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;
