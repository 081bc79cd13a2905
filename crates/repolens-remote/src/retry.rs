//! Retry-with-backoff-and-timeout wrapper for remote operations.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use repolens_core::AnalyzeError;

use crate::metrics::{MetricsSink, OperationMetrics, OperationRecord, OperationStatus};

/// Retry behavior for one class of remote operation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Hard timeout per attempt.
    pub timeout: Duration,
    /// Maximum retries after the initial attempt.
    pub max_retries: u32,
    /// Base delay for exponential backoff: `backoff_base * 2^(n-1)`
    /// before retry `n`.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff_base: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with explicit values.
    pub fn new(timeout: Duration, max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            timeout,
            max_retries,
            backoff_base,
        }
    }
}

/// Generic retry executor for remote operations.
///
/// Every attempt is recorded in the process-wide [`OperationMetrics`]
/// store and forwarded to an optional [`MetricsSink`]. Errors whose
/// `is_retryable()` is false bypass retry and propagate immediately.
pub struct RetryExecutor {
    metrics: Arc<OperationMetrics>,
    sink: Option<Arc<dyn MetricsSink>>,
}

impl RetryExecutor {
    /// Create an executor with a fresh metrics store.
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(OperationMetrics::new()),
            sink: None,
        }
    }

    /// Create an executor over an existing metrics store.
    pub fn with_metrics(metrics: Arc<OperationMetrics>) -> Self {
        Self {
            metrics,
            sink: None,
        }
    }

    /// Attach an external metrics sink.
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The metrics store written by this executor.
    pub fn metrics(&self) -> &Arc<OperationMetrics> {
        &self.metrics
    }

    /// Run `operation` with retry, backoff and per-attempt timeout.
    ///
    /// Returns the first success, or the last observed error after
    /// `max_retries + 1` total attempts. A final timed-out attempt
    /// surfaces as [`AnalyzeError::Timeout`].
    pub async fn execute<T, F, Fut>(
        &self,
        operation_id: &str,
        policy: &RetryPolicy,
        mut operation: F,
    ) -> Result<T, AnalyzeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AnalyzeError>>,
    {
        let mut last_error: Option<AnalyzeError> = None;

        for attempt in 0..=policy.max_retries {
            let started = Instant::now();
            let outcome = tokio::time::timeout(policy.timeout, operation()).await;
            let duration = started.elapsed();

            match outcome {
                Ok(Ok(value)) => {
                    self.record(operation_id, started, duration, OperationStatus::Success, attempt, None);
                    return Ok(value);
                }
                Ok(Err(err)) if !err.is_retryable() => {
                    self.record(
                        operation_id,
                        started,
                        duration,
                        OperationStatus::Failed,
                        attempt,
                        Some(err.to_string()),
                    );
                    return Err(err);
                }
                Ok(Err(err)) => {
                    self.record(
                        operation_id,
                        started,
                        duration,
                        OperationStatus::Failed,
                        attempt,
                        Some(err.to_string()),
                    );
                    tracing::warn!(
                        operation = operation_id,
                        attempt,
                        error = %err,
                        "remote operation failed"
                    );
                    last_error = Some(err);
                }
                Err(_elapsed) => {
                    let err = AnalyzeError::Timeout {
                        operation: operation_id.to_string(),
                        timeout_ms: policy.timeout.as_millis() as u64,
                    };
                    self.record(
                        operation_id,
                        started,
                        duration,
                        OperationStatus::TimedOut,
                        attempt,
                        Some(err.to_string()),
                    );
                    tracing::warn!(operation = operation_id, attempt, "remote operation timed out");
                    last_error = Some(err);
                }
            }

            if attempt < policy.max_retries {
                let delay = policy.backoff_base * 2u32.saturating_pow(attempt);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| AnalyzeError::other("retries exhausted")))
    }

    fn record(
        &self,
        operation_id: &str,
        started_at: Instant,
        duration: Duration,
        status: OperationStatus,
        retry_count: u32,
        last_error: Option<String>,
    ) {
        let record = OperationRecord {
            operation_id: operation_id.to_string(),
            started_at,
            duration,
            status,
            retry_count,
            last_error,
        };
        if let Some(sink) = &self.sink {
            sink.record_attempt(&record);
        }
        self.metrics.record(record);
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(100), max_retries, Duration::from_millis(10))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_try_success() {
        let executor = RetryExecutor::new();
        let attempts = AtomicU32::new(0);

        let result = executor
            .execute("op", &quick_policy(3), || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, AnalyzeError>(42) }
            })
            .await
            .unwrap();

        assert_eq!(result, 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        let record = executor.metrics().get("op").unwrap();
        assert_eq!(record.status, OperationStatus::Success);
        assert_eq!(record.retry_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_failures() {
        // Fails max_retries - 1 times, then succeeds: success on
        // attempt max_retries.
        let executor = RetryExecutor::new();
        let attempts = AtomicU32::new(0);

        let result = executor
            .execute("op", &quick_policy(3), || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(AnalyzeError::transient("src", "flaky"))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_surface_last_error() {
        let executor = RetryExecutor::new();
        let attempts = AtomicU32::new(0);

        let err = executor
            .execute("op", &quick_policy(3), || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err::<u32, _>(AnalyzeError::transient("src", "down")) }
            })
            .await
            .unwrap_err();

        // max_retries + 1 total attempts.
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert!(matches!(err, AnalyzeError::TransientFetch { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_after_final_attempt() {
        let executor = RetryExecutor::new();

        let err = executor
            .execute("slow", &quick_policy(1), || async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, AnalyzeError>(0)
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzeError::Timeout { .. }));
        let record = executor.metrics().get("slow").unwrap();
        assert_eq!(record.status, OperationStatus::TimedOut);
        assert_eq!(record.retry_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_bypasses_retry() {
        let executor = RetryExecutor::new();
        let attempts = AtomicU32::new(0);

        let err = executor
            .execute("op", &quick_policy(5), || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<u32, _>(AnalyzeError::Auth {
                        message: "bad token".into(),
                    })
                }
            })
            .await
            .unwrap_err();

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(matches!(err, AnalyzeError::Auth { .. }));
    }
}
