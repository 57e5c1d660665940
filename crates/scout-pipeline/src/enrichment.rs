//! Bio enrichment: one bounded lookup per admitted creator.
//!
//! Enrichment is best-effort. A lookup that fails or times out yields the
//! creator unenriched; it never drops the creator or fails the job.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use scout_adapters::PlatformAdapter;
use scout_core::{CreatorSummary, EnrichedCreator};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{JobRequest, PipelineConfig};
use crate::ledger::JobLedger;
use crate::progress::{EventSink, ProgressEvent};

#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    pub enabled: bool,
    pub max_parallel: usize,
    pub timeout: Duration,
}

impl EnrichmentSettings {
    #[must_use]
    pub fn for_job(config: &PipelineConfig, request: &JobRequest) -> Self {
        Self {
            enabled: request.enable_bio_enrichment,
            max_parallel: config.max_parallel_enrichments.max(1),
            timeout: config.bio_enrichment_timeout,
        }
    }
}

pub struct EnrichmentPool {
    adapter: Arc<dyn PlatformAdapter>,
    settings: EnrichmentSettings,
    ledger: Arc<JobLedger>,
    events: EventSink,
}

impl EnrichmentPool {
    #[must_use]
    pub fn new(
        adapter: Arc<dyn PlatformAdapter>,
        settings: EnrichmentSettings,
        ledger: Arc<JobLedger>,
        events: EventSink,
    ) -> Self {
        Self {
            adapter,
            settings,
            ledger,
            events,
        }
    }

    /// Run one bounded bio lookup and merge whatever it returns.
    pub async fn enrich_one(&self, creator: &CreatorSummary) -> EnrichedCreator {
        let mut enriched = EnrichedCreator::unenriched(creator.clone());
        if !self.settings.enabled {
            return enriched;
        }

        self.ledger.record_enrichment_call();
        self.events.emit(ProgressEvent::ApiCalls { count: 1 });

        let call = tokio::time::timeout(self.settings.timeout, self.adapter.enrich_bio(creator));
        match call.await {
            Ok(Ok(lookup)) if lookup.is_empty() => {
                debug!(creator = %enriched.key(), "bio lookup came back empty");
            }
            Ok(Ok(lookup)) => {
                if enriched.merge_lookup(lookup.bio.as_deref(), &lookup.emails) {
                    self.ledger.record_enrichment_success();
                } else {
                    debug!(creator = %enriched.key(), "bio lookup returned nothing new");
                }
            }
            Ok(Err(e)) => {
                warn!(creator = %enriched.key(), error = %e, "bio enrichment failed");
            }
            Err(_) => {
                let timeout_ms =
                    u64::try_from(self.settings.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(creator = %enriched.key(), timeout_ms, "bio enrichment timed out");
            }
        }
        enriched
    }

    /// Enrich unless `stop` fires first, in which case the creator passes
    /// through unenriched.
    async fn enrich_or_skip(
        &self,
        creator: CreatorSummary,
        stop: &CancellationToken,
    ) -> EnrichedCreator {
        if stop.is_cancelled() {
            return EnrichedCreator::unenriched(creator);
        }
        let outcome = tokio::select! {
            biased;
            () = stop.cancelled() => None,
            enriched = self.enrich_one(&creator) => Some(enriched),
        };
        outcome.unwrap_or_else(|| EnrichedCreator::unenriched(creator))
    }

    fn record_emit(&self, creator: &EnrichedCreator) {
        self.ledger.record_emitted();
        self.events.emit(ProgressEvent::CreatorEmitted {
            key: creator.key(),
            bio_enriched: creator.bio_enriched,
        });
    }

    /// Enrich a batch with at most `max_parallel` lookups in flight.
    /// Output order follows completion, not input.
    pub async fn enrich_all(
        &self,
        creators: Vec<CreatorSummary>,
        stop: &CancellationToken,
    ) -> Vec<EnrichedCreator> {
        let enriched: Vec<EnrichedCreator> = stream::iter(creators)
            .map(|creator| self.enrich_or_skip(creator, stop))
            .buffer_unordered(self.settings.max_parallel)
            .collect()
            .await;
        for creator in &enriched {
            self.record_emit(creator);
        }
        enriched
    }

    /// Spawn `max_parallel` workers draining `queue` into `output`.
    ///
    /// Workers exit once the queue is closed and empty. Each returns the
    /// number of creators it forwarded.
    pub fn spawn_workers(
        self: &Arc<Self>,
        queue: mpsc::Receiver<CreatorSummary>,
        output: mpsc::UnboundedSender<EnrichedCreator>,
        stop: CancellationToken,
    ) -> JoinSet<usize> {
        let queue = Arc::new(Mutex::new(queue));
        let mut workers = JoinSet::new();
        for worker_id in 0..self.settings.max_parallel {
            let pool = Arc::clone(self);
            let queue = Arc::clone(&queue);
            let output = output.clone();
            let stop = stop.clone();
            workers.spawn(async move { pool.worker_loop(worker_id, queue, output, stop).await });
        }
        workers
    }

    async fn worker_loop(
        &self,
        worker_id: usize,
        queue: Arc<Mutex<mpsc::Receiver<CreatorSummary>>>,
        output: mpsc::UnboundedSender<EnrichedCreator>,
        stop: CancellationToken,
    ) -> usize {
        let mut forwarded = 0usize;
        loop {
            let next = queue.lock().await.recv().await;
            let Some(creator) = next else {
                break;
            };
            let enriched = self.enrich_or_skip(creator, &stop).await;
            self.record_emit(&enriched);
            if output.send(enriched).is_err() {
                debug!(worker_id, "creator consumer dropped; discarding output");
            }
            forwarded += 1;
        }
        debug!(worker_id, forwarded, "enrichment worker finished");
        forwarded
    }
}
