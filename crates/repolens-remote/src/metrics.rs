//! Ephemeral per-operation metrics recorded by the retry executor.
//!
//! Records live for the process lifetime only; they are never
//! persisted. Consumers read through [`OperationMetrics::snapshot`] or
//! receive attempts through a [`MetricsSink`].

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Outcome of a single operation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    /// Attempt succeeded.
    Success,
    /// Attempt failed with an error.
    Failed,
    /// Attempt exceeded its timeout.
    TimedOut,
}

/// Record of the most recent attempt of one operation.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    /// Operation identity, e.g. `list:src:0`.
    pub operation_id: String,
    /// When the attempt started.
    pub started_at: Instant,
    /// How long the attempt took.
    pub duration: Duration,
    /// Attempt outcome.
    pub status: OperationStatus,
    /// How many retries preceded this attempt.
    pub retry_count: u32,
    /// Message of the last observed error, if any.
    pub last_error: Option<String>,
}

/// Process-wide store of operation records, keyed by operation id.
///
/// Written by the retry executor, read-only for everyone else.
#[derive(Debug, Default)]
pub struct OperationMetrics {
    records: DashMap<String, OperationRecord>,
}

impl OperationMetrics {
    /// Create an empty metrics store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attempt, replacing any earlier record for the same id.
    pub fn record(&self, record: OperationRecord) {
        self.records.insert(record.operation_id.clone(), record);
    }

    /// Look up the latest record for an operation id.
    pub fn get(&self, operation_id: &str) -> Option<OperationRecord> {
        self.records.get(operation_id).map(|r| r.clone())
    }

    /// Copy out all records.
    pub fn snapshot(&self) -> Vec<OperationRecord> {
        self.records.iter().map(|r| r.clone()).collect()
    }

    /// Number of operations tracked.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether no operations were recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total retries across all tracked operations.
    pub fn total_retries(&self) -> u64 {
        self.records.iter().map(|r| r.retry_count as u64).sum()
    }
}

/// External observability collaborator. Not required for correctness.
pub trait MetricsSink: Send + Sync {
    /// Receive one attempt record.
    fn record_attempt(&self, record: &OperationRecord);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, status: OperationStatus, retries: u32) -> OperationRecord {
        OperationRecord {
            operation_id: id.to_string(),
            started_at: Instant::now(),
            duration: Duration::from_millis(5),
            status,
            retry_count: retries,
            last_error: None,
        }
    }

    #[test]
    fn test_record_and_get() {
        let metrics = OperationMetrics::new();
        metrics.record(record("list:src:0", OperationStatus::Success, 0));

        let got = metrics.get("list:src:0").unwrap();
        assert_eq!(got.status, OperationStatus::Success);
        assert!(metrics.get("list:lib:0").is_none());
    }

    #[test]
    fn test_latest_record_wins() {
        let metrics = OperationMetrics::new();
        metrics.record(record("op", OperationStatus::Failed, 0));
        metrics.record(record("op", OperationStatus::Success, 2));

        assert_eq!(metrics.len(), 1);
        let got = metrics.get("op").unwrap();
        assert_eq!(got.status, OperationStatus::Success);
        assert_eq!(got.retry_count, 2);
        assert_eq!(metrics.total_retries(), 2);
    }
}
