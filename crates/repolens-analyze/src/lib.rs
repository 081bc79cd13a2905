//! Analysis orchestration and differential engine for repolens.
//!
//! This crate drives full repository analyses and compares their
//! results over time.
//!
//! # Overview
//!
//! - **[`ProgressTracker`]**: the per-analysis state machine. Starts
//!   crawls, persists the snapshot on every transition, deduplicates
//!   concurrent requests for the same analysis id (single-flight), and
//!   serves progress over both pull and push adapters.
//! - **[`SnapshotStore`]**: persistence collaborator, with an
//!   in-memory implementation.
//! - **[`DifferentialEngine`]**: file- and module-level diffs between
//!   two completed snapshots.
//! - **[`DiffHistory`]**: plan-tier quota enforcement over retained
//!   diff results.
//!
//! # Progress monitoring
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use repolens_analyze::{ProgressTracker, ProgressEvent, MemorySnapshotStore};
//! # async fn demo<H: repolens_remote::RemoteHost>(tracker: ProgressTracker<H, MemorySnapshotStore>, id: repolens_core::AnalysisId) {
//! let mut events = tracker.subscribe(&id);
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         if let ProgressEvent::Progress(progress) = event {
//!             println!("{:.0}%", progress.percentage());
//!         }
//!     }
//! });
//! # }
//! ```

mod diff;
mod history;
mod store;
mod tracker;

pub use diff::DifferentialEngine;
pub use history::{DiffHistory, PlanTier, QuotaPolicy, TieredQuota};
pub use store::{MemorySnapshotStore, SnapshotStore};
pub use tracker::{AnalysisResult, ProgressEvent, ProgressTracker};

// Re-export core types for convenience
pub use repolens_core::{
    AnalysisId, AnalysisStatus, AnalyzeError, DiffResult, Progress, RepoCoordinates, Snapshot,
};

/// Default buffer size for progress broadcast channels.
pub const PROGRESS_CHANNEL_SIZE: usize = 100;
