use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first one)
    pub max_attempts: u32,
    /// Delay before the first backoff retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 doubles the delay each time)
    pub backoff_multiplier: f64,
    /// Fixed pause before re-sending a batch whose output failed validation
    pub validation_delay: Duration,
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Retry after the policy's exponential backoff delay
    Backoff,
    /// Retry after a fixed delay
    After(Duration),
    /// Give up immediately
    Stop,
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            validation_delay: Duration::from_secs(1),
        }
    }

    /// Set the maximum delay between retries
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the backoff multiplier
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set the pause used before re-sending a batch that failed validation
    pub fn with_validation_delay(mut self, delay: Duration) -> Self {
        self.validation_delay = delay;
        self
    }

    /// Preset: provider translation calls
    /// Backoff delays: 1s, 2s; validation retries wait 1s
    pub fn translation(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(16))
            .with_backoff_multiplier(2.0)
    }

    /// Backoff delay before the given attempt (0-indexed; attempt 0 never waits)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);

        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::translation(3)
    }
}

/// Execute an async operation with retries
///
/// After each failure `classify` decides whether to back off exponentially,
/// wait a fixed delay, or stop. A policy with `max_attempts` of zero still
/// makes one attempt.
///
/// # Returns
/// The first successful result, or the error of the last attempt made
pub async fn with_retry<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
    classify: C,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    C: Fn(&E) -> RetryAction,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        "{}: Succeeded on attempt {}/{}",
                        operation_name,
                        attempt + 1,
                        max_attempts
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                let action = classify(&e);
                if action == RetryAction::Stop {
                    debug!(
                        "{}: Error is not retryable, failing immediately: {}",
                        operation_name, e
                    );
                    return Err(e);
                }

                let remaining = max_attempts - attempt - 1;
                if remaining == 0 {
                    warn!(
                        "{}: All {} attempts failed. Last error: {}",
                        operation_name, max_attempts, e
                    );
                    return Err(e);
                }

                warn!(
                    "{}: Attempt {}/{} failed ({}), {} retries remaining",
                    operation_name,
                    attempt + 1,
                    max_attempts,
                    e,
                    remaining
                );

                attempt += 1;
                let delay = match action {
                    RetryAction::After(delay) => delay,
                    _ => policy.delay_for_attempt(attempt),
                };
                if !delay.is_zero() {
                    debug!(
                        "{}: Retry attempt {}/{} after {:?}",
                        operation_name,
                        attempt + 1,
                        max_attempts,
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
