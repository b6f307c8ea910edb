//! HTTP response view and status classification

use std::time::Duration;

use serde_json::Value;

use crate::error::{ApiFailure, RestError, RestResult};
use crate::request::ApiRequest;

/// A completed HTTP exchange, reduced to what classification needs
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: u16,
    body: Value,
    retry_after: Option<Duration>,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            retry_after: None,
        }
    }

    /// Attach the server's `Retry-After` hint
    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Parsed JSON body (a string value when the body was not JSON)
    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    /// Exchange error code (`code` field), when present
    pub fn error_code(&self) -> Option<i64> {
        self.body.get("code").and_then(Value::as_i64)
    }

    /// Exchange error message (`msg` field), when present
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("msg").and_then(Value::as_str)
    }

    /// Delay the server asked for before the next request
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Map a completed exchange to its payload or a typed error
///
/// The HTTP status alone decides the outcome; a `code` in the body never
/// overrides it.
pub fn classify(request: &ApiRequest, response: Response) -> RestResult<Value> {
    if response.is_success() {
        return Ok(response.into_body());
    }

    let status = response.status();
    let failure = Box::new(ApiFailure::new(request.clone(), response));

    Err(match status {
        403 => RestError::WafLimit(failure),
        418 => RestError::IpBanned(failure),
        429 => RestError::RateLimitExceeded(failure),
        504 => RestError::ResponseReadTimeout(failure),
        400..=499 => RestError::MalformedRequest(failure),
        _ => RestError::InternalServer(failure),
    })
}
