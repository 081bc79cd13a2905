//! Analysis progress state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of an analysis. Complete and Error are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisStatus {
    /// Requested, no crawl work started yet.
    Pending,
    /// Crawl in progress.
    Analyzing,
    /// Finished successfully.
    Complete,
    /// Failed.
    Error,
}

impl AnalysisStatus {
    /// Check if this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

/// Phase of the analysis pipeline, for progress messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisPhase {
    Initializing,
    Crawling,
    Classifying,
    Finalizing,
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initializing => write!(f, "Initializing"),
            Self::Crawling => write!(f, "Crawling"),
            Self::Classifying => write!(f, "Classifying"),
            Self::Finalizing => write!(f, "Finalizing"),
        }
    }
}

/// Progress information for an ongoing or finished analysis.
///
/// `current` and `total` are monotonically non-decreasing; `total` may
/// grow during a crawl as more entries are discovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Current status.
    pub status: AnalysisStatus,
    /// Entries processed so far.
    pub current: u64,
    /// Entries discovered so far (grows during crawl).
    pub total: u64,
    /// Current pipeline phase.
    pub phase: AnalysisPhase,
    /// Human-readable progress message.
    pub message: String,
    /// Error message, set when status is Error.
    pub error: Option<String>,
    /// Estimated time remaining, when a rate is established.
    pub estimated_time_remaining: Option<Duration>,
    /// When the analysis started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the analysis reached a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Progress {
    /// Create initial pending progress.
    pub fn pending() -> Self {
        Self {
            status: AnalysisStatus::Pending,
            current: 0,
            total: 0,
            phase: AnalysisPhase::Initializing,
            message: "Analysis queued".to_string(),
            error: None,
            estimated_time_remaining: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Record crawl progress. Counters never move backwards and
    /// `current` is clamped to `total`.
    pub fn advance(&mut self, current: u64, total: u64, message: impl Into<String>) {
        if self.status == AnalysisStatus::Pending {
            self.status = AnalysisStatus::Analyzing;
            self.phase = AnalysisPhase::Crawling;
            self.started_at = Some(Utc::now());
        }
        self.total = self.total.max(total);
        self.current = self.current.max(current).min(self.total);
        self.message = message.into();
    }

    /// Mark the analysis complete.
    pub fn mark_complete(&mut self, message: impl Into<String>) {
        self.status = AnalysisStatus::Complete;
        self.phase = AnalysisPhase::Finalizing;
        self.current = self.total;
        self.message = message.into();
        self.estimated_time_remaining = None;
        self.completed_at = Some(Utc::now());
    }

    /// Mark the analysis failed.
    pub fn mark_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        self.status = AnalysisStatus::Error;
        self.message = format!("Analysis failed: {error}");
        self.error = Some(error);
        self.estimated_time_remaining = None;
        self.completed_at = Some(Utc::now());
    }

    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::pending()
    }
}

/// Estimate time remaining from elapsed time and counter state:
/// `elapsed / processed * (total - processed)`.
pub fn estimate_remaining(elapsed: Duration, processed: u64, total: u64) -> Option<Duration> {
    if processed == 0 || total <= processed {
        return None;
    }
    let per_item = elapsed.as_secs_f64() / processed as f64;
    Some(Duration::from_secs_f64(per_item * (total - processed) as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_initial_state() {
        let progress = Progress::pending();
        assert_eq!(progress.status, AnalysisStatus::Pending);
        assert!(!progress.status.is_terminal());
        assert_eq!(progress.percentage(), 0.0);
        assert!(progress.started_at.is_none());
    }

    #[test]
    fn test_advance_enters_analyzing() {
        let mut progress = Progress::pending();
        progress.advance(5, 20, "crawling src");
        assert_eq!(progress.status, AnalysisStatus::Analyzing);
        assert_eq!(progress.phase, AnalysisPhase::Crawling);
        assert!(progress.started_at.is_some());
        assert_eq!(progress.percentage(), 25.0);
    }

    #[test]
    fn test_counters_are_monotonic() {
        let mut progress = Progress::pending();
        progress.advance(10, 40, "a");
        progress.advance(5, 30, "b");
        assert_eq!(progress.current, 10);
        assert_eq!(progress.total, 40);
    }

    #[test]
    fn test_current_clamped_to_total() {
        let mut progress = Progress::pending();
        progress.advance(50, 40, "overshoot");
        assert_eq!(progress.current, 40);
    }

    #[test]
    fn test_terminal_states() {
        let mut progress = Progress::pending();
        progress.advance(3, 3, "done crawling");
        progress.mark_complete("Analysis complete");
        assert!(progress.status.is_terminal());
        assert!(progress.completed_at.is_some());

        let mut failed = Progress::pending();
        failed.mark_error("connection reset");
        assert_eq!(failed.status, AnalysisStatus::Error);
        assert_eq!(failed.error.as_deref(), Some("connection reset"));
        assert!(failed.message.contains("connection reset"));
    }

    #[test]
    fn test_estimate_remaining() {
        let est = estimate_remaining(Duration::from_secs(10), 10, 30).unwrap();
        assert_eq!(est, Duration::from_secs(20));
        assert!(estimate_remaining(Duration::from_secs(10), 0, 30).is_none());
        assert!(estimate_remaining(Duration::from_secs(10), 30, 30).is_none());
    }
}
