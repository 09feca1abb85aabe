//! Retry and backoff policy for API requests

use std::fmt;
use std::time::Duration;

/// HTTP verbs the client sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Repeating the request cannot duplicate its effect
    pub fn is_idempotent(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Put | HttpMethod::Delete)
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
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Transport-level failure classes the policy distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout,
    Connect,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub backoff_factor: Duration,
    pub backoff_max: Duration,
    pub retry_status_codes: Vec<u16>,
    pub respect_retry_after: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: Duration::from_millis(500),
            backoff_max: Duration::from_secs(120),
            retry_status_codes: vec![429, 500, 502, 503, 504],
            respect_retry_after: true,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_status_codes.contains(&status)
    }

    /// Connect errors are retried for every method; timeouts only when the
    /// method is idempotent, since the server may already have acted
    pub fn should_retry_failure(&self, method: HttpMethod, failure: TransportFailure) -> bool {
        match failure {
            TransportFailure::Connect => true,
            TransportFailure::Timeout => method.is_idempotent(),
            TransportFailure::Other => false,
        }
    }

    /// Delay before retry `attempt` (1-based).
    ///
    /// `min(backoff_factor * 2^(attempt-1), backoff_max)`, or the server's
    /// `Retry-After` seconds (capped the same way) when honored.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<&str>) -> Duration {
        if self.respect_retry_after
            && let Some(seconds) = retry_after.and_then(parse_retry_after)
        {
            return Duration::from_secs(seconds).min(self.backoff_max);
        }
        let exponent = attempt.saturating_sub(1).min(31);
        self.backoff_factor
            .saturating_mul(1u32 << exponent)
            .min(self.backoff_max)
    }
}

/// `Retry-After` in delta-seconds form; HTTP dates are ignored
fn parse_retry_after(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}
