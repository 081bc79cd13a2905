//! Crawl configuration types.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for repository crawl operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CrawlConfig {
    /// Number of completed files per emitted batch.
    #[builder(default = "50")]
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Directory entries requested per remote page.
    #[builder(default = "100")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Hard per-chunk timeout for one remote fetch.
    #[builder(default = "Duration::from_secs(30)")]
    #[serde(default = "default_chunk_timeout")]
    pub chunk_timeout: Duration,

    /// Maximum retries per remote fetch (total attempts = retries + 1).
    #[builder(default = "3")]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential retry backoff.
    #[builder(default = "Duration::from_millis(500)")]
    #[serde(default = "default_backoff_base")]
    pub backoff_base: Duration,

    /// Pacing delay between emitted batches (zero = none).
    #[builder(default = "Duration::ZERO")]
    #[serde(default)]
    pub pacing_delay: Duration,

    /// Maximum directory depth to crawl (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,
}

fn default_batch_size() -> usize {
    50
}

fn default_page_size() -> usize {
    100
}

fn default_chunk_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base() -> Duration {
    Duration::from_millis(500)
}

impl CrawlConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(batch_size) = self.batch_size {
            if batch_size == 0 {
                return Err("batch_size must be at least 1".to_string());
            }
        }
        if let Some(page_size) = self.page_size {
            if page_size == 0 {
                return Err("page_size must be at least 1".to_string());
            }
        }
        Ok(())
    }
}

impl CrawlConfig {
    /// Create a new crawl config builder.
    pub fn builder() -> CrawlConfigBuilder {
        CrawlConfigBuilder::default()
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            page_size: default_page_size(),
            chunk_timeout: default_chunk_timeout(),
            max_retries: default_max_retries(),
            backoff_base: default_backoff_base(),
            pacing_delay: Duration::ZERO,
            max_depth: None,
        }
    }
}
