//! Concurrent orchestration: one fetch task per keyword, a bounded
//! enrichment queue, and a fixed pool of enrichment workers.
//!
//! ```text
//!  keyword tasks ──admit──▶ JobLedger
//!       │
//!       └──▶ mpsc::channel(queue_capacity) ──▶ N enrichment workers ──▶ JobHandle
//!                                                   │
//!  all stages ──ProgressEvent──▶ reporter ──watch──▶ pollers
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use scout_adapters::AdapterRegistry;
use scout_core::EnrichedCreator;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{JobRequest, PipelineConfig};
use crate::enrichment::{EnrichmentPool, EnrichmentSettings};
use crate::error::PipelineError;
use crate::fetch::{FetchContext, Handoff};
use crate::job::{finish, prepare, DeadlineGuard, JobSetup};
use crate::ledger::{JobLedger, MetricsSnapshot};
use crate::progress::{JobProgress, KeywordState, ProgressEvent};
use crate::report::{JobOutput, JobReport, KeywordOutcome, StopReason};

#[derive(Clone)]
pub struct ParallelPipeline {
    registry: AdapterRegistry,
    config: PipelineConfig,
}

impl ParallelPipeline {
    #[must_use]
    pub fn new(registry: AdapterRegistry, config: PipelineConfig) -> Self {
        Self { registry, config }
    }

    /// Start a job and return immediately with a handle to its output.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns configuration errors (invalid request, unregistered platform)
    /// before anything is spawned.
    pub fn spawn(&self, request: JobRequest) -> Result<JobHandle, PipelineError> {
        self.spawn_with_cancel(request, CancellationToken::new())
    }

    /// Like [`ParallelPipeline::spawn`], stopping early when `cancel` fires.
    /// Creators already admitted are still delivered, unenriched.
    ///
    /// # Errors
    ///
    /// Same as [`ParallelPipeline::spawn`].
    pub fn spawn_with_cancel(
        &self,
        request: JobRequest,
        cancel: CancellationToken,
    ) -> Result<JobHandle, PipelineError> {
        let setup = prepare(&self.registry, &self.config, &request)?;
        let progress = setup.reporter.updates.clone();
        let ledger = Arc::clone(&setup.ledger);
        let (output_tx, output_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(orchestrate(
            setup,
            self.config.clone(),
            request,
            output_tx,
            cancel.clone(),
        ));

        Ok(JobHandle {
            creators: output_rx,
            progress,
            cancel,
            ledger,
            task,
        })
    }

    /// Run a job to completion and collect everything it emits.
    ///
    /// # Errors
    ///
    /// Configuration errors, or [`PipelineError::Task`] if the orchestrator
    /// task panicked.
    pub async fn run(&self, request: JobRequest) -> Result<JobOutput, PipelineError> {
        self.spawn(request)?.collect().await
    }
}

/// Live view of a running job.
///
/// Creators stream out of [`JobHandle::next_creator`] as soon as they leave
/// enrichment; [`JobHandle::progress`] and [`JobHandle::metrics`] can be read
/// at any time.
pub struct JobHandle {
    creators: mpsc::UnboundedReceiver<EnrichedCreator>,
    progress: watch::Receiver<JobProgress>,
    cancel: CancellationToken,
    ledger: Arc<JobLedger>,
    task: JoinHandle<JobReport>,
}

impl JobHandle {
    pub async fn next_creator(&mut self) -> Option<EnrichedCreator> {
        self.creators.recv().await
    }

    /// Latest published progress snapshot.
    #[must_use]
    pub fn progress(&self) -> JobProgress {
        self.progress.borrow().clone()
    }

    /// Receiver that is notified on every progress change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<JobProgress> {
        self.progress.clone()
    }

    /// Counters read straight from the ledger, ahead of progress events.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ledger.snapshot()
    }

    #[must_use]
    pub fn total_api_calls(&self) -> u64 {
        self.ledger.total_api_calls()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drain all remaining creators and wait for the final report.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Task`] if the orchestrator task panicked.
    pub async fn collect(mut self) -> Result<JobOutput, PipelineError> {
        let mut creators = Vec::new();
        while let Some(creator) = self.creators.recv().await {
            creators.push(creator);
        }
        let report = self.finish().await?;
        Ok(JobOutput { creators, report })
    }

    /// Wait for the final report. Creators not yet read stay buffered.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Task`] if the orchestrator task panicked.
    pub async fn finish(self) -> Result<JobReport, PipelineError> {
        self.task
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))
    }
}

async fn orchestrate(
    setup: JobSetup,
    config: PipelineConfig,
    request: JobRequest,
    output: mpsc::UnboundedSender<EnrichedCreator>,
    cancel: CancellationToken,
) -> JobReport {
    let JobSetup {
        adapter,
        ledger,
        reporter,
    } = setup;
    let events = reporter.sink.clone();
    let stop = cancel.child_token();
    let deadline = DeadlineGuard::arm(stop.clone(), config.runtime_cap);

    info!(
        platform = %request.platform,
        keywords = request.keywords.len(),
        target = request.target_results,
        workers = config.max_parallel_enrichments,
        queue_capacity = config.enrichment_queue_capacity,
        "starting parallel job"
    );
    events.emit(ProgressEvent::Started);

    let (queue_tx, queue_rx) = mpsc::channel(config.enrichment_queue_capacity);
    let pool = Arc::new(EnrichmentPool::new(
        Arc::clone(&adapter),
        EnrichmentSettings::for_job(&config, &request),
        Arc::clone(&ledger),
        events.clone(),
    ));
    let mut workers = pool.spawn_workers(queue_rx, output, stop.clone());
    drop(pool);

    let ctx = Arc::new(FetchContext {
        adapter,
        config,
        ledger: Arc::clone(&ledger),
        events: events.clone(),
        stop: stop.clone(),
    });
    let mut fetchers = JoinSet::new();
    for keyword in request.keywords.iter() {
        events.emit(ProgressEvent::KeywordDispatched {
            keyword: keyword.to_owned(),
        });
        let ctx = Arc::clone(&ctx);
        let queue = queue_tx.clone();
        let keyword = keyword.to_owned();
        fetchers.spawn(async move { ctx.run_keyword(&keyword, Handoff::Queue(&queue)).await });
    }
    drop(queue_tx);
    drop(ctx);

    let mut by_keyword: HashMap<String, KeywordOutcome> = HashMap::new();
    while let Some(joined) = fetchers.join_next().await {
        match joined {
            Ok(outcome) => {
                by_keyword.insert(outcome.keyword.clone(), outcome);
            }
            Err(e) => warn!(error = %e, "keyword task aborted"),
        }
    }

    // The queue is closed once every fetch task has dropped its sender, so
    // workers drain what is left and exit.
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "enrichment worker aborted");
        }
    }

    // A keyword missing here had its task panic before it could settle.
    let outcomes: Vec<KeywordOutcome> = request
        .keywords
        .iter()
        .map(|kw| {
            by_keyword.remove(kw).unwrap_or_else(|| {
                let reason = "keyword task aborted".to_owned();
                events.emit(ProgressEvent::KeywordFailed {
                    keyword: kw.to_owned(),
                    reason: reason.clone(),
                });
                KeywordOutcome {
                    keyword: kw.to_owned(),
                    state: KeywordState::Failed,
                    stop_reason: StopReason::Failed,
                    pages_fetched: 0,
                    creators_admitted: 0,
                    error: Some(reason),
                }
            })
        })
        .collect();

    let deadline_hit = deadline.fired();
    drop(deadline);
    drop(events);
    finish(&ledger, reporter, outcomes, deadline_hit, cancel.is_cancelled()).await
}
