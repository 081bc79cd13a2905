//! Analysis progress tracker and single-flight orchestration.
//!
//! The tracker owns the per-analysis state machine
//! (pending → analyzing → complete | error), persists the snapshot on
//! every transition, and serves the same state over two thin adapters:
//! a pull read of the persisted snapshot and a push broadcast of
//! progress events.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use repolens_core::{
    AnalysisId, AnalysisPhase, AnalyzeError, CrawlConfig, PerformanceMetrics, Progress,
    RepoCoordinates, Snapshot,
};
use repolens_crawl::{start_crawl, ClassificationRule, Classifier, CrawlEvent};
use repolens_remote::{RemoteHost, RetryExecutor};

use crate::store::SnapshotStore;
use crate::PROGRESS_CHANNEL_SIZE;

/// Progress events pushed to stream subscribers.
///
/// A terminal `Complete` or `Error` is the last event on a stream; the
/// channel closes afterwards.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Progress state changed.
    Progress(Progress),
    /// Analysis completed successfully.
    Complete(AnalysisId),
    /// Analysis failed.
    Error { id: AnalysisId, message: String },
}

/// Result shared between all callers awaiting one analysis.
pub type AnalysisResult = Result<Arc<Snapshot>, Arc<AnalyzeError>>;

type SharedAnalysis = Shared<BoxFuture<'static, AnalysisResult>>;
type EventChannels = Arc<DashMap<AnalysisId, broadcast::Sender<ProgressEvent>>>;

/// Orchestrates repository analyses with per-id single-flight
/// deduplication.
pub struct ProgressTracker<H, S> {
    host: Arc<H>,
    store: Arc<S>,
    executor: Arc<RetryExecutor>,
    config: CrawlConfig,
    rules: Vec<ClassificationRule>,
    inflight: Arc<DashMap<AnalysisId, SharedAnalysis>>,
    channels: EventChannels,
}

impl<H: RemoteHost, S: SnapshotStore> ProgressTracker<H, S> {
    /// Create a tracker over explicit collaborators.
    pub fn new(
        host: Arc<H>,
        store: Arc<S>,
        executor: Arc<RetryExecutor>,
        config: CrawlConfig,
        rules: Vec<ClassificationRule>,
    ) -> Self {
        Self {
            host,
            store,
            executor,
            config,
            rules,
            inflight: Arc::new(DashMap::new()),
            channels: Arc::new(DashMap::new()),
        }
    }

    /// Process an analysis request.
    ///
    /// An already-complete analysis returns its persisted snapshot
    /// without re-crawling. Concurrent calls for the same id join the
    /// in-flight task and observe the same terminal result.
    pub async fn process(&self, coords: RepoCoordinates) -> AnalysisResult {
        coords.validate().map_err(Arc::new)?;
        let id = coords.analysis_id();

        if let Some(snapshot) = self.store.load(&id).await.map_err(Arc::new)? {
            if snapshot.is_complete() {
                return Ok(Arc::new(snapshot));
            }
        }

        let task = match self.inflight.entry(id.clone()) {
            Entry::Occupied(occupied) => occupied.get().clone(),
            Entry::Vacant(vacant) => {
                let task = self.spawn_analysis(coords, id.clone());
                vacant.insert(task.clone());
                task
            }
        };
        task.await
    }

    /// Resolve the repository's head commit and process it.
    pub async fn process_head(&self, owner: &str, repo: &str) -> AnalysisResult {
        let metadata = self
            .host
            .repository_metadata(owner, repo)
            .await
            .map_err(Arc::new)?;
        self.process(RepoCoordinates::new(owner, repo, metadata.head_commit))
            .await
    }

    /// Subscribe to progress events for an analysis id (push adapter).
    ///
    /// Dropping the receiver never cancels the underlying crawl.
    pub fn subscribe(&self, id: &AnalysisId) -> broadcast::Receiver<ProgressEvent> {
        self.channels
            .entry(id.clone())
            .or_insert_with(|| broadcast::channel(PROGRESS_CHANNEL_SIZE).0)
            .subscribe()
    }

    /// Subscribe as a `Stream` of progress events.
    pub fn event_stream(&self, id: &AnalysisId) -> BroadcastStream<ProgressEvent> {
        BroadcastStream::new(self.subscribe(id))
    }

    /// Latest persisted progress for an analysis id (pull adapter).
    pub async fn progress(&self, id: &AnalysisId) -> Result<Progress, AnalyzeError> {
        match self.store.load(id).await? {
            Some(snapshot) => Ok(snapshot.progress),
            None => Err(AnalyzeError::not_found(format!("analysis {id}"))),
        }
    }

    /// Latest persisted snapshot for an analysis id.
    pub async fn snapshot(&self, id: &AnalysisId) -> Result<Snapshot, AnalyzeError> {
        match self.store.load(id).await? {
            Some(snapshot) => Ok(snapshot),
            None => Err(AnalyzeError::not_found(format!("analysis {id}"))),
        }
    }

    /// The retry executor used for remote calls, for metrics access.
    pub fn executor(&self) -> &Arc<RetryExecutor> {
        &self.executor
    }

    fn spawn_analysis(&self, coords: RepoCoordinates, id: AnalysisId) -> SharedAnalysis {
        let handle = tokio::spawn(run_analysis(
            Arc::clone(&self.host),
            Arc::clone(&self.store),
            Arc::clone(&self.executor),
            self.config.clone(),
            self.rules.clone(),
            Arc::clone(&self.channels),
            coords,
        ));
        let inflight = Arc::clone(&self.inflight);

        async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_error) => Err(Arc::new(AnalyzeError::other(format!(
                    "analysis task failed: {join_error}"
                )))),
            };
            inflight.remove(&id);
            result
        }
        .boxed()
        .shared()
    }
}

/// Drive one analysis from pending to a terminal state.
async fn run_analysis<H: RemoteHost, S: SnapshotStore>(
    host: Arc<H>,
    store: Arc<S>,
    executor: Arc<RetryExecutor>,
    config: CrawlConfig,
    rules: Vec<ClassificationRule>,
    channels: EventChannels,
    coords: RepoCoordinates,
) -> AnalysisResult {
    let id = coords.analysis_id();
    let mut snapshot = Snapshot::pending(&coords);

    if let Err(err) = store.save(&snapshot).await {
        return fail(&store, &channels, snapshot, err).await;
    }
    emit(&channels, &id, ProgressEvent::Progress(snapshot.progress.clone()));

    tracing::info!(analysis = %id, "analysis started");
    let mut classifier = Classifier::new(rules);
    let mut rx = start_crawl(host, executor, coords, config);

    let mut outcome = None;
    while let Some(event) = rx.recv().await {
        match event {
            CrawlEvent::Batch(mut batch) => {
                classifier.classify(&mut batch.files);
                snapshot.progress.advance(
                    batch.processed,
                    batch.discovered_total,
                    format!(
                        "Crawled {} of {} discovered entries",
                        batch.processed, batch.discovered_total
                    ),
                );
                snapshot.progress.estimated_time_remaining = batch.estimated_remaining;
                if let Err(err) = store.save(&snapshot).await {
                    return fail(&store, &channels, snapshot, err).await;
                }
                emit(&channels, &id, ProgressEvent::Progress(snapshot.progress.clone()));
            }
            CrawlEvent::Complete(crawl_outcome) => outcome = Some(crawl_outcome),
            CrawlEvent::Error(err) => {
                return fail(&store, &channels, snapshot, err).await;
            }
        }
    }

    let Some(outcome) = outcome else {
        let err = AnalyzeError::other("crawl ended without a terminal event");
        return fail(&store, &channels, snapshot, err).await;
    };

    snapshot.progress.phase = AnalysisPhase::Classifying;
    let mut roots = outcome.roots;
    classifier.apply(&mut roots);
    snapshot.files = roots;
    snapshot.modules = classifier.finalize();
    snapshot.metrics = PerformanceMetrics {
        crawl_duration: outcome.stats.duration,
        remote_calls: outcome.stats.remote_calls,
        retries: outcome.stats.retries,
        batches: outcome.stats.batches,
    };
    snapshot.progress.mark_complete(format!(
        "Analyzed {} files into {} modules",
        snapshot.total_files(),
        snapshot.modules.len()
    ));

    if let Err(err) = store.save(&snapshot).await {
        return fail(&store, &channels, snapshot, err).await;
    }

    tracing::info!(analysis = %id, files = snapshot.total_files(), "analysis complete");
    emit(&channels, &id, ProgressEvent::Complete(id.clone()));
    channels.remove(&id);
    Ok(Arc::new(snapshot))
}

/// Persist the error state, report it, and close the stream.
async fn fail<S: SnapshotStore>(
    store: &Arc<S>,
    channels: &EventChannels,
    mut snapshot: Snapshot,
    err: AnalyzeError,
) -> AnalysisResult {
    let id = snapshot.analysis_id.clone();
    snapshot.progress.mark_error(err.to_string());
    // Best effort: the original error is what callers need to see.
    let _ = store.save(&snapshot).await;

    tracing::warn!(analysis = %id, error = %err, "analysis failed");
    emit(
        channels,
        &id,
        ProgressEvent::Error {
            id: id.clone(),
            message: err.to_string(),
        },
    );
    channels.remove(&id);
    Err(Arc::new(err))
}

fn emit(channels: &EventChannels, id: &AnalysisId, event: ProgressEvent) {
    // No subscriber is fine; the producer never assumes a listener.
    if let Some(tx) = channels.get(id) {
        let _ = tx.send(event);
    }
}
