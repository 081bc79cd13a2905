//! Repository tree crawling and module classification for repolens.
//!
//! This crate walks a remote repository's file tree page by page and
//! groups discovered files into logical modules.
//!
//! # Overview
//!
//! - **Progressive crawling**: [`start_crawl`] spawns a producer task
//!   and hands back a channel of [`CrawlEvent`]s, batching completed
//!   files as it goes.
//! - **Worklist traversal**: depth-first with an explicit stack, so
//!   deep trees cannot overflow the call stack.
//! - **Retry-wrapped fetches**: every remote listing goes through the
//!   `RetryExecutor` from `repolens-remote`.
//! - **Classification**: [`Classifier`] applies ordered glob rules and
//!   aggregates per-module metrics.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use repolens_core::{CrawlConfig, RepoCoordinates};
//! use repolens_crawl::{start_crawl, CrawlEvent};
//! use repolens_remote::RetryExecutor;
//!
//! # async fn demo(host: Arc<impl repolens_remote::RemoteHost>) {
//! let coords = RepoCoordinates::new("acme", "app", "abc123");
//! let mut rx = start_crawl(host, Arc::new(RetryExecutor::new()), coords, CrawlConfig::default());
//!
//! while let Some(event) = rx.recv().await {
//!     match event {
//!         CrawlEvent::Batch(batch) => println!("{} files so far", batch.processed),
//!         CrawlEvent::Complete(outcome) => println!("done: {:?}", outcome.stats),
//!         CrawlEvent::Error(err) => eprintln!("crawl failed: {err}"),
//!     }
//! }
//! # }
//! ```

mod classifier;
mod crawler;

pub use classifier::{default_rules, ClassificationRule, Classifier};
pub use crawler::{start_crawl, CrawlBatch, CrawlEvent, CrawlOutcome, CrawlStats};

// Re-export core types for convenience
pub use repolens_core::{CrawlConfig, FileNode, Module, RepoCoordinates};

/// Default channel buffer size for crawl events.
pub const CRAWL_CHANNEL_SIZE: usize = 100;
