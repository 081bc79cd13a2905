//! Progressive, paginated repository tree crawler.
//!
//! The crawl runs as a producer task communicating over a channel,
//! using an explicit worklist instead of recursion so pathological
//! trees cannot exhaust the call stack. Within one parent directory,
//! children are handled in discovery order and subdirectories are
//! finished depth-first before the parent completes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use repolens_core::{
    estimate_remaining, AnalyzeError, ContentId, CrawlConfig, FileNode, NodeKind, RepoCoordinates,
};
use repolens_remote::{DirectoryEntry, RemoteHost, RetryExecutor, RetryPolicy};

use crate::CRAWL_CHANNEL_SIZE;

/// One batch of files completed by the crawler.
#[derive(Debug, Clone)]
pub struct CrawlBatch {
    /// Files completed in this batch, in discovery order.
    pub files: Vec<FileNode>,
    /// Entries processed so far across the whole crawl.
    pub processed: u64,
    /// Entries discovered so far (grows as listings come in).
    pub discovered_total: u64,
    /// Time elapsed since the crawl started.
    pub elapsed: Duration,
    /// Estimated time remaining, once a rate is established.
    pub estimated_remaining: Option<Duration>,
}

/// Summary statistics for a finished crawl.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlStats {
    /// Leaf files discovered.
    pub total_files: u64,
    /// Directories discovered.
    pub total_dirs: u64,
    /// Successful remote listing calls.
    pub remote_calls: u64,
    /// Retried attempts recorded by the executor.
    pub retries: u64,
    /// Batches emitted.
    pub batches: u64,
    /// Wall-clock duration.
    pub duration: Duration,
}

/// Terminal payload of a successful crawl.
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Root-level nodes with subtrees attached.
    pub roots: Vec<FileNode>,
    /// Crawl statistics.
    pub stats: CrawlStats,
}

/// Events produced by a crawl.
#[derive(Debug)]
pub enum CrawlEvent {
    /// A batch of files completed.
    Batch(CrawlBatch),
    /// The crawl finished; carries the assembled tree.
    Complete(CrawlOutcome),
    /// The crawl aborted. Batches already emitted remain valid.
    Error(AnalyzeError),
}

/// Start a crawl of the repository tree at the given coordinates.
///
/// Produces a lazy, finite, non-restartable sequence of events: zero or
/// more `Batch` events followed by exactly one `Complete` or `Error`.
/// Dropping the receiver does not cancel the crawl.
pub fn start_crawl<H: RemoteHost>(
    host: Arc<H>,
    executor: Arc<RetryExecutor>,
    coords: RepoCoordinates,
    config: CrawlConfig,
) -> mpsc::Receiver<CrawlEvent> {
    let (tx, rx) = mpsc::channel(CRAWL_CHANNEL_SIZE);

    tokio::spawn(async move {
        let mut crawl = Crawl::new(host, executor, coords, config, tx.clone());
        match crawl.run().await {
            Ok(outcome) => {
                let _ = tx.send(CrawlEvent::Complete(outcome)).await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "crawl aborted");
                let _ = tx.send(CrawlEvent::Error(err)).await;
            }
        }
    });

    rx
}

/// One directory being assembled on the worklist.
struct Frame {
    dir: FileNode,
    pending: VecDeque<DirectoryEntry>,
    depth: u32,
}

struct Crawl<H> {
    host: Arc<H>,
    executor: Arc<RetryExecutor>,
    coords: RepoCoordinates,
    config: CrawlConfig,
    policy: RetryPolicy,
    tx: mpsc::Sender<CrawlEvent>,
    started: Instant,
    batch: Vec<FileNode>,
    processed: u64,
    discovered: u64,
    stats: CrawlStats,
}

impl<H: RemoteHost> Crawl<H> {
    fn new(
        host: Arc<H>,
        executor: Arc<RetryExecutor>,
        coords: RepoCoordinates,
        config: CrawlConfig,
        tx: mpsc::Sender<CrawlEvent>,
    ) -> Self {
        let policy = RetryPolicy::new(config.chunk_timeout, config.max_retries, config.backoff_base);
        Self {
            host,
            executor,
            coords,
            config,
            policy,
            tx,
            started: Instant::now(),
            batch: Vec::new(),
            processed: 0,
            discovered: 0,
            stats: CrawlStats::default(),
        }
    }

    async fn run(&mut self) -> Result<CrawlOutcome, AnalyzeError> {
        self.coords.validate()?;

        let root_entries = self.list_all_pages("").await?;
        let mut stack = vec![Frame {
            dir: FileNode::new_directory(ContentId::new("<root>"), ""),
            pending: root_entries,
            depth: 0,
        }];
        let mut roots = Vec::new();

        while let Some(frame) = stack.last_mut() {
            let Some(entry) = frame.pending.pop_front() else {
                // Directory exhausted: seal it and hand it to its parent.
                let mut done = stack.pop().expect("frame just observed");
                done.dir.seal();
                match stack.last_mut() {
                    Some(parent) => {
                        self.processed += 1;
                        parent.dir.children.push(done.dir);
                    }
                    // The virtual root is not a discovered entry.
                    None => roots = done.dir.children,
                }
                continue;
            };

            match entry.kind {
                NodeKind::File => {
                    let node = FileNode::new_file(entry.id, entry.path, entry.size);
                    self.stats.total_files += 1;
                    self.processed += 1;
                    self.batch.push(node.clone());
                    frame.dir.children.push(node);
                    if self.batch.len() >= self.config.batch_size {
                        self.flush_batch().await;
                    }
                }
                NodeKind::Directory => {
                    let depth = frame.depth + 1;
                    self.stats.total_dirs += 1;
                    let path = entry.path.clone();
                    let pending = if self.config.max_depth.is_some_and(|max| depth > max) {
                        VecDeque::new()
                    } else {
                        self.list_all_pages(&path).await?
                    };
                    stack.push(Frame {
                        dir: FileNode::new_directory(entry.id, path),
                        pending,
                        depth,
                    });
                }
            }
        }

        self.flush_batch().await;

        self.stats.retries = self.executor.metrics().total_retries();
        self.stats.duration = self.started.elapsed();
        Ok(CrawlOutcome {
            roots,
            stats: self.stats,
        })
    }

    /// Fetch every page of one directory listing through the retry
    /// executor, growing the discovered-total estimate per page.
    async fn list_all_pages(&mut self, path: &str) -> Result<VecDeque<DirectoryEntry>, AnalyzeError> {
        let mut entries = VecDeque::new();
        let mut page = 0u32;

        loop {
            let label = if path.is_empty() { "<root>" } else { path };
            let operation_id = format!("list:{label}:{page}");
            let host = &self.host;
            let coords = &self.coords;
            let page_size = self.config.page_size;

            let listing = self
                .executor
                .execute(&operation_id, &self.policy, || {
                    host.list_directory(&coords.owner, &coords.repo, path, page, page_size)
                })
                .await?;

            self.stats.remote_calls += 1;
            self.discovered += listing.entries.len() as u64;
            entries.extend(listing.entries);

            if !listing.has_more {
                return Ok(entries);
            }
            page += 1;
        }
    }

    /// Emit the pending batch, if any, and pace the next one.
    ///
    /// Send failures are ignored: a departed consumer does not cancel
    /// the crawl.
    async fn flush_batch(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        let files = std::mem::take(&mut self.batch);
        let elapsed = self.started.elapsed();
        self.stats.batches += 1;

        let batch = CrawlBatch {
            files,
            processed: self.processed,
            discovered_total: self.discovered,
            elapsed,
            estimated_remaining: estimate_remaining(elapsed, self.processed, self.discovered),
        };
        let _ = self.tx.send(CrawlEvent::Batch(batch)).await;

        if self.config.pacing_delay > Duration::ZERO {
            tokio::time::sleep(self.config.pacing_delay).await;
        }
    }
}
