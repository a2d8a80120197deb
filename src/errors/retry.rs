use std::time::Duration;
use std::future::Future;

use super::classification::ErrorClassification;
use super::types::FairwayError;
use tracing::warn;

impl ErrorClassification {
    /// Retry delay for the given attempt (0-indexed): exponential backoff
    /// `base * 2^attempt` plus up to one base of random jitter, capped at `max`.
    pub fn retry_delay(&self, attempt: u32, base: Duration, max: Duration) -> Duration {
        let factor = 2.0_f64.powi(attempt.min(16) as i32);
        let jitter: f64 = rand::random::<f64>();
        let secs = base.as_secs_f64() * (factor + jitter);
        Duration::from_secs_f64(secs.min(max.as_secs_f64()))
    }
}

/// Retry configuration for client operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    pub fn no_retry() -> Self {
        Self { max_retries: 0, ..Default::default() }
    }
}

/// Execute an async operation with retry logic.
///
/// Retries only if the error is classified as retryable and we haven't
/// exceeded max_retries.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    config: &RetryConfig,
    mut factory: F,
) -> Result<T, FairwayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FairwayError>>,
{
    let max_attempts = config.max_retries + 1;
    let mut attempt = 0;

    loop {
        match factory().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let classification = e.classify();

                if !classification.retryable {
                    warn!(
                        operation = operation_name,
                        error_type = classification.error_type,
                        "Non-retryable error, failing immediately"
                    );
                    return Err(e);
                }
                if attempt + 1 >= max_attempts {
                    warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max = max_attempts,
                        "Max retries exhausted"
                    );
                    return Err(e);
                }

                let delay = classification.retry_delay(attempt, config.base_delay, config.max_delay);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max = max_attempts,
                    error_type = classification.error_type,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying after error"
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_retry_delay_grows_and_caps() {
        let class = ErrorClassification { error_type: "network_error", retryable: true };
        let base = Duration::from_millis(100);
        let max = Duration::from_secs(1);
        let d0 = class.retry_delay(0, base, max);
        let d2 = class.retry_delay(2, base, max);
        assert!(d0 >= Duration::from_millis(100) && d0 < Duration::from_millis(200));
        assert!(d2 >= Duration::from_millis(400) && d2 < Duration::from_millis(500));
        assert_eq!(class.retry_delay(10, base, max), max);
    }

    #[tokio::test]
    async fn test_with_retry_succeeds_first_try() {
        let result = with_retry("test", &fast_config(3), || async {
            Ok::<_, FairwayError>(42)
        }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_retry_non_retryable_fails_immediately() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = with_retry("test", &fast_config(3), || {
            let attempts = attempts_clone.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(FairwayError::Validation("bad club".into()))
            }
        }).await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retry_recovers_after_transient_errors() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = with_retry("test", &fast_config(3), || {
            let attempts = attempts_clone.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(FairwayError::Network("reset".into()))
                } else {
                    Ok(n)
                }
            }
        }).await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_exhausts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = with_retry("test", &fast_config(2), || {
            let attempts = attempts_clone.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(FairwayError::Timeout("slow".into()))
            }
        }).await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
