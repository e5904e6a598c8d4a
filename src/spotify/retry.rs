use std::time::Duration;

use reqwest::{StatusCode, header::HeaderMap};

use crate::config::DEFAULT_MAX_RETRIES;

/// Bounded retry policy for Web API requests.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first request.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in seconds).
    pub base_delay: u64,
    /// Maximum delay cap (in seconds).
    pub max_delay: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: 1,
            max_delay: 60,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Rate limits and server side failures are worth another attempt.
    pub fn is_retryable(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    pub fn should_retry(&self, status: StatusCode, attempt: u32) -> bool {
        attempt < self.max_retries && Self::is_retryable(status)
    }

    /// `Retry-After` wins when present, otherwise `base_delay * 2^attempt`.
    /// Both are capped at `max_delay`.
    pub fn delay(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        let secs = retry_after.unwrap_or_else(|| {
            self.base_delay
                .saturating_mul(2_u64.saturating_pow(attempt))
        });
        Duration::from_secs(secs.min(self.max_delay))
    }
}

pub fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}
