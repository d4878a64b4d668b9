//! Retry policy
//!
//! Bounded re-execution of an operation on transient failures. Which failures
//! are transient is decided by `Error::is_retryable`; anything else propagates
//! on first occurrence.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::config::Config;
use crate::Result;

/// Longest error message included in retry log lines
const LOGGED_ERROR_CHARS: usize = 100;

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Sleep between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a policy; at least one attempt is always made
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Policy from `MAX_RETRIES` and `RETRY_DELAY`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_retries, config.retry_delay())
    }

    /// Single attempt, no retries
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Run `op` until it succeeds, fails fatally, or attempts run out
    ///
    /// The last error is returned once attempts are exhausted. There is no
    /// sleep after the final attempt.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() || attempt >= self.max_attempts => return Err(e),
                Err(e) => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        operation,
                        error = %truncate(&e.to_string()),
                        "Retrying after transient failure"
                    );
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}

fn truncate(message: &str) -> String {
    if message.chars().count() <= LOGGED_ERROR_CHARS {
        message.to_string()
    } else {
        let mut short: String = message.chars().take(LOGGED_ERROR_CHARS).collect();
        short.push_str("...");
        short
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_secs(1));

        let value = policy
            .run("click", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(Error::stale_element("#btn"))
                } else {
                    Ok(n)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts_without_trailing_sleep() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(4, Duration::from_secs(2));

        let start = Instant::now();
        let err = policy
            .run("type", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Error::element_not_found("#user"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ElementNotFound(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // Three sleeps between four attempts
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_propagates_immediately() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::from_secs(1));

        let start = Instant::now();
        let err = policy
            .run("select", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Error::action_failure("javascript error"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ActionFailure(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(0, Duration::ZERO);
        let _ = policy
            .run("noop", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Error::timeout("x"))
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_and_truncate() {
        let config = Config {
            max_retries: 5,
            retry_delay: 0.25,
            ..Default::default()
        };
        assert_eq!(
            RetryPolicy::from_config(&config),
            RetryPolicy::new(5, Duration::from_millis(250))
        );

        let long = "x".repeat(250);
        assert_eq!(truncate(&long).len(), LOGGED_ERROR_CHARS + 3);
        assert_eq!(truncate("short"), "short");
    }
}
