//! Core types and traits for repolens.
//!
//! This crate provides the fundamental data structures used throughout
//! the repolens ecosystem: file nodes, snapshots, modules, progress
//! state, diff results, configuration and the error taxonomy.

mod config;
mod coords;
mod diff;
mod error;
mod module;
mod node;
mod progress;
mod snapshot;

pub use config::{CrawlConfig, CrawlConfigBuilder};
pub use coords::{AnalysisId, RepoCoordinates};
pub use diff::{ChangeType, DiffMetrics, DiffResult, FileChange, ModuleChange};
pub use error::AnalyzeError;
pub use module::{Module, ModuleId, ModuleMetrics};
pub use node::{ContentId, FileNode, NodeKind, NodeStatus};
pub use progress::{estimate_remaining, AnalysisPhase, AnalysisStatus, Progress};
pub use snapshot::{PerformanceMetrics, Snapshot};
