//! Persisted analysis snapshot of one repository at one commit.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::coords::{AnalysisId, RepoCoordinates};
use crate::module::Module;
use crate::node::FileNode;
use crate::progress::{AnalysisStatus, Progress};

/// Timing and call-count metrics gathered while producing a snapshot.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Wall-clock duration of the crawl.
    pub crawl_duration: Duration,
    /// Number of remote API calls made.
    pub remote_calls: u64,
    /// Number of retried attempts.
    pub retries: u64,
    /// Number of batches emitted by the crawler.
    pub batches: u64,
}

/// Default snapshot cache lifetime.
const CACHE_TTL_HOURS: i64 = 24;

/// Result of analyzing one repository at one commit.
///
/// Mutated in place by the progress tracker during analysis; treated as
/// immutable once `progress.status` is Complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Analysis identity, `owner/repo@commit`.
    pub analysis_id: AnalysisId,
    /// Repository owner.
    pub owner: CompactString,
    /// Repository name.
    pub repo: CompactString,
    /// Commit analyzed.
    pub commit: CompactString,
    /// Root-level nodes of the analyzed tree, in discovery order.
    pub files: Vec<FileNode>,
    /// Modules produced by classification.
    pub modules: Vec<Module>,
    /// Progress state.
    pub progress: Progress,
    /// Performance metrics for the producing crawl.
    pub metrics: PerformanceMetrics,
    /// When this snapshot was created.
    pub created_at: DateTime<Utc>,
    /// When this snapshot's cache entry expires.
    pub cache_expiry: DateTime<Utc>,
}

impl Snapshot {
    /// Create a fresh pending snapshot for the given coordinates.
    pub fn pending(coords: &RepoCoordinates) -> Self {
        let now = Utc::now();
        Self {
            analysis_id: coords.analysis_id(),
            owner: coords.owner.clone(),
            repo: coords.repo.clone(),
            commit: coords.commit.clone(),
            files: Vec::new(),
            modules: Vec::new(),
            progress: Progress::pending(),
            metrics: PerformanceMetrics::default(),
            created_at: now,
            cache_expiry: now + chrono::Duration::hours(CACHE_TTL_HOURS),
        }
    }

    /// Repository key without the commit, `owner/repo`.
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Check whether analysis finished successfully.
    pub fn is_complete(&self) -> bool {
        self.progress.status == AnalysisStatus::Complete
    }

    /// Total number of leaf files in the snapshot.
    pub fn total_files(&self) -> u64 {
        self.files.iter().map(FileNode::file_count).sum()
    }

    /// Total size of all files in the snapshot.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(FileNode::total_size).sum()
    }

    /// Flatten the tree into a path-keyed index of leaf files.
    pub fn file_index(&self) -> HashMap<&str, &FileNode> {
        let mut index = HashMap::new();
        for root in &self.files {
            root.walk(&mut |node| {
                if node.is_file() {
                    index.insert(node.path.as_str(), node);
                }
            });
        }
        index
    }

    /// Find a module by its identity.
    pub fn module(&self, id: &crate::module::ModuleId) -> Option<&Module> {
        self.modules.iter().find(|m| &m.id == id)
    }
}
