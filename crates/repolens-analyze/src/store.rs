//! Snapshot persistence collaborator.

use std::future::Future;

use chrono::Utc;
use dashmap::DashMap;

use repolens_core::{AnalysisId, AnalyzeError, Snapshot};

/// Persistence collaborator for analysis snapshots.
///
/// The tracker saves the snapshot on every state transition; this store
/// is the canonical progress state both read paths serve from.
pub trait SnapshotStore: Send + Sync + 'static {
    /// Load the snapshot for an analysis id, if any.
    fn load(
        &self,
        id: &AnalysisId,
    ) -> impl Future<Output = Result<Option<Snapshot>, AnalyzeError>> + Send;

    /// Save (upsert) a snapshot.
    fn save(&self, snapshot: &Snapshot) -> impl Future<Output = Result<(), AnalyzeError>> + Send;

    /// Delete snapshots past their cache expiry, returning the count.
    fn delete_expired(&self) -> impl Future<Output = Result<usize, AnalyzeError>> + Send;
}

/// In-memory snapshot store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    inner: DashMap<AnalysisId, Snapshot>,
}

impl MemorySnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, id: &AnalysisId) -> Result<Option<Snapshot>, AnalyzeError> {
        Ok(self.inner.get(id).map(|s| s.clone()))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), AnalyzeError> {
        self.inner
            .insert(snapshot.analysis_id.clone(), snapshot.clone());
        Ok(())
    }

    async fn delete_expired(&self) -> Result<usize, AnalyzeError> {
        let now = Utc::now();
        let before = self.inner.len();
        self.inner.retain(|_, snapshot| snapshot.cache_expiry > now);
        Ok(before - self.inner.len())
    }
}
