//! Quota-governed retention of historical diff results.

use dashmap::DashMap;

use repolens_core::{AnalyzeError, DiffResult};

/// Plan tier of the repository owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanTier {
    Free,
    Pro,
    Enterprise,
}

/// Quota collaborator: how many historical diffs a tier may retain.
/// `None` means unbounded.
pub trait QuotaPolicy: Send + Sync {
    fn max_history(&self, tier: PlanTier) -> Option<usize>;
}

/// Default tier quotas: 1 / 3 / unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct TieredQuota;

impl QuotaPolicy for TieredQuota {
    fn max_history(&self, tier: PlanTier) -> Option<usize> {
        match tier {
            PlanTier::Free => Some(1),
            PlanTier::Pro => Some(3),
            PlanTier::Enterprise => None,
        }
    }
}

/// Per-repository history of diff results, capped by the quota policy.
///
/// Inserts follow an insert-then-prune discipline: the newest
/// `max_history` results by timestamp survive, oldest discarded first.
/// In strict mode a full history rejects new work before any diff
/// computation is attempted.
pub struct DiffHistory<Q = TieredQuota> {
    entries: DashMap<String, Vec<DiffResult>>,
    quota: Q,
    strict: bool,
}

impl<Q: QuotaPolicy> DiffHistory<Q> {
    /// Create a lenient history (insert-then-prune only).
    pub fn new(quota: Q) -> Self {
        Self {
            entries: DashMap::new(),
            quota,
            strict: false,
        }
    }

    /// Create a strict history that rejects inserts at capacity.
    pub fn strict(quota: Q) -> Self {
        Self {
            entries: DashMap::new(),
            quota,
            strict: true,
        }
    }

    /// Check capacity for a repository ahead of computing a new diff.
    ///
    /// Lenient histories always pass; strict histories surface
    /// [`AnalyzeError::QuotaExceeded`] when the tier's cap is reached.
    pub fn check_capacity(&self, repository: &str, tier: PlanTier) -> Result<(), AnalyzeError> {
        if !self.strict {
            return Ok(());
        }
        if let Some(limit) = self.quota.max_history(tier) {
            let stored = self.entries.get(repository).map_or(0, |e| e.len());
            if stored >= limit {
                return Err(AnalyzeError::QuotaExceeded {
                    repository: repository.to_string(),
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Record a diff result, pruning the oldest entries past the
    /// tier's cap.
    pub fn insert(
        &self,
        repository: &str,
        tier: PlanTier,
        diff: DiffResult,
    ) -> Result<(), AnalyzeError> {
        self.check_capacity(repository, tier)?;

        let mut entry = self.entries.entry(repository.to_string()).or_default();
        entry.push(diff);
        entry.sort_by_key(|d| d.timestamp);
        if let Some(limit) = self.quota.max_history(tier) {
            while entry.len() > limit {
                entry.remove(0);
            }
        }
        Ok(())
    }

    /// Retained diffs for a repository, newest first.
    pub fn history(&self, repository: &str) -> Vec<DiffResult> {
        self.entries
            .get(repository)
            .map(|entry| entry.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// The most recent diff for a repository.
    pub fn latest(&self, repository: &str) -> Option<DiffResult> {
        self.entries
            .get(repository)
            .and_then(|entry| entry.last().cloned())
    }

    /// Number of retained diffs for a repository.
    pub fn len(&self, repository: &str) -> usize {
        self.entries.get(repository).map_or(0, |e| e.len())
    }

    /// Check whether a repository has no retained diffs.
    pub fn is_empty(&self, repository: &str) -> bool {
        self.len(repository) == 0
    }
}

impl Default for DiffHistory<TieredQuota> {
    fn default() -> Self {
        Self::new(TieredQuota)
    }
}
