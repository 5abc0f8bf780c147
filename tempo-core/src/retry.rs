//! Exponential-backoff retry for fetch operations.
//!
//! Every failure counts: transport errors, non-success statuses, malformed
//! bodies and per-attempt timeouts. Once the attempts are used up the policy
//! resolves to `None` rather than an error, so callers render "no data yet".

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 8000;

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failure (doubles after each further failure).
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Bound on a single attempt's wait for a response.
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_DELAY_MS)
    }
}

/// Attempt bookkeeping for one logical call.
#[derive(Debug)]
struct RetryState {
    attempt: u32,
    max_attempts: u32,
}

impl RetryState {
    fn new(max_attempts: u32) -> Self {
        Self { attempt: 0, max_attempts }
    }

    fn exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_millis(base_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
            attempt_timeout: None,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Delay to wait after the `failures`-th consecutive failure (1-based).
    pub fn delay_after_failure(&self, failures: u32) -> Duration {
        let factor = 2u64.saturating_pow(failures.saturating_sub(1));
        let delay_ms = (self.base_delay.as_millis() as u64).saturating_mul(factor);
        let capped = delay_ms.min(self.max_delay.as_millis() as u64);
        Duration::from_millis(capped)
    }

    /// Run `operation` until it succeeds or the attempts run out.
    ///
    /// At least one attempt is always made, even with `max_attempts == 0`.
    pub async fn execute<T, E, F, Fut>(&self, label: &str, operation: F) -> Option<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut state = RetryState::new(self.max_attempts);

        loop {
            state.attempt += 1;

            let outcome = match self.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, operation()).await {
                    Ok(result) => result.map_err(|e| e.to_string()),
                    Err(_) => Err(format!("timed out after {limit:?}")),
                },
                None => operation().await.map_err(|e| e.to_string()),
            };

            match outcome {
                Ok(value) => {
                    if state.attempt > 1 {
                        tracing::info!("{} succeeded on attempt {}", label, state.attempt);
                    }
                    return Some(value);
                }
                Err(reason) => {
                    if state.exhausted() {
                        tracing::error!(
                            "{} failed after {} attempts: {}",
                            label,
                            state.attempt,
                            reason
                        );
                        return None;
                    }

                    let delay = self.delay_after_failure(state.attempt);
                    tracing::warn!(
                        "{} attempt {} of {} failed: {}; retrying in {:?}",
                        label,
                        state.attempt,
                        state.max_attempts,
                        reason,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
