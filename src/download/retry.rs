//! Bounded retry executor for font downloads.
//!
//! [`RetryPolicy::run`] invokes an async operation until it succeeds or the
//! attempt budget is spent, then surfaces the last failure as a [`RetryError`].
//! The default policy retries immediately; [`RetryPolicy::with_backoff`] adds
//! capped exponential backoff with jitter.
//!
//! # Example
//!
//! ```
//! use font_cache_core::download::RetryPolicy;
//!
//! # async fn example() {
//! let policy = RetryPolicy::with_max_attempts(3);
//! let result: Result<u32, _> = policy
//!     .run(|attempt| async move {
//!         if attempt < 3 { Err("not yet") } else { Ok(attempt) }
//!     })
//!     .await;
//! assert_eq!(result.unwrap(), 3);
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use super::constants::{DEFAULT_MAX_ATTEMPTS, MAX_JITTER};

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Failure returned once every attempt has failed.
#[derive(Debug)]
pub struct RetryError<E> {
    /// Attempts made, including the first.
    pub attempts: u32,
    /// Error of the final attempt.
    pub last: E,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed after {} attempt(s): {}", self.attempts, self.last)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last)
    }
}

/// Retry budget and delay settings.
///
/// # Delay Calculation
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt - 1), max_delay) + jitter
/// ```
///
/// Jitter is bounded by the smaller of `base_delay` and 500ms, so a zero
/// `base_delay` disables both the delay and the jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_max_attempts(DEFAULT_MAX_ATTEMPTS)
    }
}

impl RetryPolicy {
    /// Immediate retries with the given budget (minimum 1).
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }

    /// Enables exponential backoff starting at `base_delay`, capped at `max_delay`.
    #[must_use]
    pub fn with_backoff(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay.max(base_delay);
        self
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `operation` until it succeeds or the budget is exhausted.
    ///
    /// The closure receives the 1-indexed attempt number.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] carrying the last failure once
    /// `max_attempts` attempts have failed.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt >= self.max_attempts {
                        debug!(attempt, max = self.max_attempts, error = %error, "max attempts reached");
                        return Err(RetryError {
                            attempts: attempt,
                            last: error,
                        });
                    }

                    let delay = self.calculate_delay(attempt);
                    debug!(
                        attempt,
                        next_attempt = attempt + 1,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "will retry"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    /// Delay before the attempt following `attempt`.
    fn calculate_delay(&self, attempt: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis() as f64;
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * f64::from(self.backoff_multiplier).powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + calculate_jitter(self.base_delay.min(MAX_JITTER))
    }
}

/// Random jitter between zero and `max`.
fn calculate_jitter(max: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_ms = rng.gen_range(0..=max.as_millis() as u64);
    Duration::from_millis(jitter_ms)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn test_default_policy_is_five_immediate_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.calculate_delay(1), Duration::ZERO);
        assert_eq!(policy.calculate_delay(4), Duration::ZERO);
    }

    #[test]
    fn test_max_attempts_minimum_is_one() {
        assert_eq!(RetryPolicy::with_max_attempts(0).max_attempts(), 1);
    }

    #[test]
    fn test_backoff_delay_grows_and_caps() {
        let policy = RetryPolicy::with_max_attempts(10)
            .with_backoff(Duration::from_secs(1), Duration::from_secs(5));

        let first = policy.calculate_delay(1);
        assert!(first >= Duration::from_secs(1));
        assert!(first <= Duration::from_millis(1500));

        let second = policy.calculate_delay(2);
        assert!(second >= Duration::from_secs(2));
        assert!(second <= Duration::from_millis(2500));

        let capped = policy.calculate_delay(8);
        assert!(capped >= Duration::from_secs(5));
        assert!(capped <= Duration::from_millis(5500));
    }

    #[test]
    fn test_jitter_within_bounds() {
        for _ in 0..100 {
            assert!(calculate_jitter(MAX_JITTER) <= MAX_JITTER);
            assert!(calculate_jitter(Duration::from_millis(5)) <= Duration::from_millis(5));
        }
    }

    #[tokio::test]
    async fn test_run_stops_on_first_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<&str, RetryError<String>> = RetryPolicy::with_max_attempts(5)
            .run(|_| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_retries_until_success() {
        let result: Result<u32, RetryError<String>> = RetryPolicy::with_max_attempts(5)
            .run(|attempt| async move {
                if attempt < 3 {
                    Err(format!("attempt {attempt} failed"))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_run_surfaces_last_error_after_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), RetryError<String>> = RetryPolicy::with_max_attempts(4)
            .run(|attempt| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(format!("failure {attempt}"))
                }
            })
            .await;

        let error = result.unwrap_err();
        assert_eq!(error.attempts, 4);
        assert_eq!(error.last, "failure 4");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(error.to_string().contains("4 attempt(s)"));
    }

    #[tokio::test]
    async fn test_run_waits_between_attempts_with_backoff() {
        let started = std::time::Instant::now();
        let result: Result<(), RetryError<&str>> = RetryPolicy::with_max_attempts(3)
            .with_backoff(Duration::from_millis(20), Duration::from_millis(40))
            .run(|_| async { Err("nope") })
            .await;

        assert_eq!(result.unwrap_err().attempts, 3);
        // 20ms + 40ms of backoff, plus jitter.
        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
