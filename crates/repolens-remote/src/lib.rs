//! Remote hosting API abstraction and retry execution for repolens.
//!
//! This crate provides the [`RemoteHost`] collaborator trait the
//! crawler talks to, the [`RetryExecutor`] wrapper that bounds every
//! remote call with timeout, retry and exponential backoff, and the
//! ephemeral [`OperationMetrics`] store for observability.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use repolens_remote::{RetryExecutor, RetryPolicy};
//! use repolens_core::AnalyzeError;
//!
//! # async fn demo() -> Result<(), AnalyzeError> {
//! let executor = RetryExecutor::new();
//! let policy = RetryPolicy::new(Duration::from_secs(30), 3, Duration::from_millis(500));
//!
//! executor
//!     .execute("list:src:0", &policy, || async {
//!         // remote fetch goes here
//!         Ok::<_, AnalyzeError>(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod host;
mod metrics;
mod retry;

pub use host::{DirectoryEntry, DirectoryPage, RemoteHost, RepositoryMetadata};
pub use metrics::{MetricsSink, OperationMetrics, OperationRecord, OperationStatus};
pub use retry::{RetryExecutor, RetryPolicy};

// Re-export core types for convenience
pub use repolens_core::{AnalyzeError, ContentId, NodeKind};
