//! Bounded exponential backoff for transient failures

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Retry budget applied to both the fetch and each delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one; at least 1
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles per attempt after that
    pub base_delay: Duration,
    /// Cap on the per-attempt delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Backoff delay after the given 1-based attempt number
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_delay)
    }
}

/// Drive `op` until it succeeds, fails permanently, or the attempt
/// budget runs out
///
/// Only errors `is_transient` classifies as transient are retried; the
/// last error is returned once the budget is exhausted. A cancelled
/// token cuts the backoff sleep short and returns the pending error;
/// the caller is responsible for reporting the cancellation itself.
pub async fn retry_transient<T, E, F, Fut>(
    policy: &RetryPolicy,
    cancel: Option<&CancellationToken>,
    what: &str,
    is_transient: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !is_transient(&error) || attempt >= max_attempts {
                    return Err(error);
                }
                let delay = policy.delay_for(attempt);
                warn!(
                    %error,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "{what} failed, retrying"
                );
                match cancel {
                    Some(token) => {
                        tokio::select! {
                            _ = token.cancelled() => return Err(error),
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                    None => tokio::time::sleep(delay).await,
                }
                attempt += 1;
            }
        }
    }
}
