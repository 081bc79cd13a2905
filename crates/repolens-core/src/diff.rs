//! Differential analysis result types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::module::ModuleId;
use crate::node::ContentId;

/// Kind of change recorded for a file or module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Modified => write!(f, "modified"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// A single file-level change between two snapshots.
///
/// Change types are mutually exclusive per path: a path appears in at
/// most one FileChange per diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    /// Repository-relative path.
    pub path: CompactString,
    /// Kind of change.
    pub change_type: ChangeType,
    /// Content identity in the previous snapshot (deleted/modified).
    pub previous_hash: Option<ContentId>,
    /// Content identity in the current snapshot (added/modified).
    pub current_hash: Option<ContentId>,
    /// Size in the previous snapshot.
    pub previous_size: Option<u64>,
    /// Size in the current snapshot.
    pub current_size: Option<u64>,
    /// Module membership in the previous snapshot.
    pub previous_modules: Vec<CompactString>,
    /// Module membership in the current snapshot.
    pub current_modules: Vec<CompactString>,
}

/// A module-level change between two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleChange {
    /// Module identity.
    pub module_id: ModuleId,
    /// Module name.
    pub name: CompactString,
    /// Kind of change.
    pub change_type: ChangeType,
    /// Paths of member files that were added, modified or removed.
    pub affected_files: Vec<CompactString>,
}

/// Timing metrics for a diff computation.
///
/// Snapshot fetch counters stay zero when both snapshots were already
/// persisted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DiffMetrics {
    /// Wall-clock duration of the diff computation.
    pub diff_duration: Duration,
    /// Remote calls made to fetch the snapshots, if freshly fetched.
    pub snapshot_fetch_calls: u64,
    /// Duration spent fetching the snapshots, if freshly fetched.
    pub snapshot_fetch_duration: Duration,
}

/// Structural difference between two analyzed snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffResult {
    /// Commit of the current snapshot.
    pub commit_hash: CompactString,
    /// Commit of the previous snapshot.
    pub parent_commit: CompactString,
    /// When this diff was computed.
    pub timestamp: DateTime<Utc>,
    /// File-level changes.
    pub changes: Vec<FileChange>,
    /// Module-level changes.
    pub module_changes: Vec<ModuleChange>,
    /// Timing metrics.
    pub metrics: DiffMetrics,
}

impl DiffResult {
    /// Check if the diff recorded no changes at all.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.module_changes.is_empty()
    }

    /// Count file changes of one kind.
    pub fn count(&self, kind: ChangeType) -> usize {
        self.changes
            .iter()
            .filter(|c| c.change_type == kind)
            .count()
    }

    /// Compact summary line, `+a ~m -d` over file changes.
    pub fn summary(&self) -> String {
        format!(
            "+{} ~{} -{} ({} modules affected)",
            self.count(ChangeType::Added),
            self.count(ChangeType::Modified),
            self.count(ChangeType::Deleted),
            self.module_changes.len()
        )
    }
}
