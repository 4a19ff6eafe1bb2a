//! Retry combinators with linear backoff.

use crate::error::ApiError;
use std::future::Future;
use std::time::Duration;
use stratus_core::config::RetryConfig;
use tracing::warn;

/// Retry policy for external API calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Base delay; attempt N waits `N * base_delay` before the next try
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Build a policy from the application retry configuration.
    #[must_use]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    /// Delay before the retry following attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Retry a task with linear backoff.
///
/// Attempts the task up to `policy.max_attempts` times, sleeping
/// `attempt * base_delay` between attempts. The final attempt's error is
/// propagated to the caller unchanged.
pub async fn retry_call<F, Fut, T, E>(mut task_fn: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match task_fn().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt >= max_attempts {
                    warn!(
                        "call failed after {} attempts (max: {}): {}",
                        attempt, max_attempts, e
                    );
                    return Err(e);
                }

                let delay = policy.delay_after(attempt);
                warn!(
                    "call failed on attempt {}/{}: {}; retrying in {:?}",
                    attempt, max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    unreachable!("loop returns via Ok or the final Err")
}

/// Retry a resource API call, but only while the failure is transient.
///
/// Deterministic failures (permission, structural, not-found) propagate
/// immediately without burning the attempt budget.
pub async fn retry_transient<F, Fut, T>(mut task_fn: F, policy: &RetryPolicy) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match task_fn().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_transient() || attempt >= max_attempts {
                    return Err(e);
                }

                let delay = policy.delay_after(attempt);
                warn!(
                    "transient API error on attempt {}/{} ({}); retrying in {:?}",
                    attempt,
                    max_attempts,
                    e.code(),
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    unreachable!("loop returns via Ok or the final Err")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_linear_backoff_delays() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(1500));
    }

    #[test]
    fn test_policy_from_config_floors_attempts() {
        let config = RetryConfig {
            max_attempts: 0,
            base_delay_ms: 100,
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 1);
    }

    #[tokio::test]
    async fn test_retry_call_succeeds_on_second_attempt() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let task = || {
            let count = attempt_count_clone.clone();
            async move {
                let current = count.fetch_add(1, Ordering::SeqCst) + 1;
                if current < 2 {
                    Err("transient error")
                } else {
                    Ok("success")
                }
            }
        };

        let result = retry_call(task, &fast_policy()).await;

        assert_eq!(result.expect("should succeed"), "success");
        assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_call_exhaustion_propagates_final_error() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let task = || {
            let count = attempt_count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("persistent error")
            }
        };

        let result = retry_call(task, &fast_policy()).await;

        // The final error propagates unchanged after exactly max_attempts tries
        assert_eq!(result.expect_err("should fail"), "persistent error");
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_transient_does_not_retry_permission_errors() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let task = || {
            let count = attempt_count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ApiError::AccessDenied {
                    operation: "ListBuckets".to_string(),
                    code: "AccessDenied".to_string(),
                })
            }
        };

        let result = retry_transient(task, &fast_policy()).await;

        assert!(matches!(
            result.expect_err("should fail"),
            ApiError::AccessDenied { .. }
        ));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_transient_retries_throttling() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let task = || {
            let count = attempt_count_clone.clone();
            async move {
                let current = count.fetch_add(1, Ordering::SeqCst) + 1;
                if current < 3 {
                    Err(ApiError::Throttled {
                        code: "Throttling".to_string(),
                    })
                } else {
                    Ok(42)
                }
            }
        };

        let result = retry_transient(task, &fast_policy()).await;

        assert_eq!(result.expect("should succeed"), 42);
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    }
}
