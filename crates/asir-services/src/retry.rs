//! Exponential backoff for calls to the text generation service.
//!
//! Retried: timeouts, connection failures, 5xx, 429 and 408.
//! Not retried: other 4xx (bad request, bad key, quota denied).

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};

pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 250;
pub const DEFAULT_MAX_DELAY_MS: u64 = 4000;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after the first
    pub max_retries: u32,
    /// Delay before the first retry; doubles each attempt
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let delay_ms = (self.initial_delay.as_millis() as u64).saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_delay.as_millis() as u64))
    }
}

pub fn should_retry_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}

pub fn should_retry_error(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        return true;
    }
    error.status().is_some_and(should_retry_status)
}

/// Run `send` until it yields a non-retryable outcome or retries run out.
///
/// A retryable status on the final attempt is returned as the response, so
/// the caller sees the real status code.
pub async fn send_with_retry<F, Fut>(
    config: &RetryConfig,
    send: F,
) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        let outcome = send().await;
        let retryable = match &outcome {
            Ok(response) => should_retry_status(response.status()),
            Err(e) => should_retry_error(e),
        };

        if !retryable || attempt >= config.max_retries {
            if retryable {
                tracing::error!("Giving up after {} attempts", attempt + 1);
            } else if attempt > 0 {
                tracing::info!("Request settled after {} retries", attempt);
            }
            return outcome;
        }

        let delay = config.delay_for_attempt(attempt);
        match &outcome {
            Ok(response) => tracing::warn!(
                "Retryable status {} (attempt {} of {}), waiting {:?}",
                response.status(),
                attempt + 1,
                config.max_retries + 1,
                delay
            ),
            Err(e) => tracing::warn!(
                "Retryable error (attempt {} of {}): {}, waiting {:?}",
                attempt + 1,
                config.max_retries + 1,
                e,
                delay
            ),
        }
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
