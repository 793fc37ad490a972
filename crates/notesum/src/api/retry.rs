//! Bounded retry with backoff for summarization requests.
//!
//! Retries transient failures (429, 5xx, timeouts, dropped connections).
//! Never retries 400/401/403 or anything else that will fail the same way
//! on the next attempt.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries (0 = no retries, just fail immediately).
    pub max_retries: u32,
    /// Initial delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier (1.0 keeps the delay constant).
    pub multiplier: f64,
    /// Whether to shorten delays by a deterministic jitter factor.
    pub jitter: bool,
}

impl Default for RetryConfig {
    /// One retry after a one-second pause.
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Create a config with the given number of retries.
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_retries: retries,
            ..Default::default()
        }
    }

    /// A config that never retries.
    pub fn none() -> Self {
        Self::with_retries(0)
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        if self.jitter {
            let jitter_factor = match attempt % 4 {
                0 => 0.75,
                1 => 0.90,
                2 => 0.60,
                _ => 0.85,
            };
            Duration::from_secs_f64(capped * jitter_factor)
        } else {
            Duration::from_secs_f64(capped)
        }
    }
}

/// Run `op` until it succeeds, fails permanently, or the retry budget is spent.
///
/// Returns the last error when every attempt fails.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < config.max_retries && is_transient_error(&e) => {
                let delay = config.delay_for_attempt(attempt);
                attempt += 1;
                warn!(
                    "summarization attempt failed, retrying ({attempt}/{}) in {:.1}s: {e}",
                    config.max_retries,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Whether an error string indicates a transient (retryable) failure.
pub fn is_transient_error(error: &str) -> bool {
    if is_permanent_error(error) {
        return false;
    }

    let transient_statuses = ["429", "500", "502", "503", "504", "529"];
    if transient_statuses
        .iter()
        .any(|s| error.contains(&format!("HTTP {s}")))
    {
        return true;
    }

    let lower = error.to_lowercase();
    [
        "request failed:",
        "connection reset",
        "connection refused",
        "timed out",
        "timeout",
        "broken pipe",
        "network",
    ]
    .iter()
    .any(|p| lower.contains(p))
}

/// Whether an error is a permanent (non-retryable) failure.
pub fn is_permanent_error(error: &str) -> bool {
    ["HTTP 400", "HTTP 401", "HTTP 403", "HTTP 404", "HTTP 422"]
        .iter()
        .any(|p| error.contains(p))
}
