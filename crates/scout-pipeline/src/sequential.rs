//! Keyword-by-keyword orchestration: fetch everything, then enrich.

use std::sync::Arc;

use scout_adapters::AdapterRegistry;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{JobRequest, PipelineConfig};
use crate::enrichment::{EnrichmentPool, EnrichmentSettings};
use crate::error::PipelineError;
use crate::fetch::{FetchContext, Handoff};
use crate::job::{finish, prepare, DeadlineGuard};
use crate::progress::ProgressEvent;
use crate::report::JobOutput;

/// Runs keywords one after another on the calling task.
///
/// Dedup, capping, retries and the deadline behave exactly as in
/// [`crate::ParallelPipeline`]; only scheduling differs.
#[derive(Clone)]
pub struct SequentialPipeline {
    registry: AdapterRegistry,
    config: PipelineConfig,
}

impl SequentialPipeline {
    #[must_use]
    pub fn new(registry: AdapterRegistry, config: PipelineConfig) -> Self {
        Self { registry, config }
    }

    /// # Errors
    ///
    /// Returns configuration errors before any fetch is made. Keyword and
    /// enrichment failures are reported in the returned [`JobOutput`].
    pub async fn run(&self, request: JobRequest) -> Result<JobOutput, PipelineError> {
        self.run_with_cancel(request, CancellationToken::new()).await
    }

    /// # Errors
    ///
    /// Same as [`SequentialPipeline::run`].
    pub async fn run_with_cancel(
        &self,
        request: JobRequest,
        cancel: CancellationToken,
    ) -> Result<JobOutput, PipelineError> {
        let setup = prepare(&self.registry, &self.config, &request)?;
        let events = setup.reporter.sink.clone();
        let stop = cancel.child_token();
        let deadline = DeadlineGuard::arm(stop.clone(), self.config.runtime_cap);

        info!(
            platform = %request.platform,
            keywords = request.keywords.len(),
            target = request.target_results,
            "starting sequential job"
        );
        events.emit(ProgressEvent::Started);

        let ctx = FetchContext {
            adapter: Arc::clone(&setup.adapter),
            config: self.config.clone(),
            ledger: Arc::clone(&setup.ledger),
            events: events.clone(),
            stop: stop.clone(),
        };
        let mut admitted = Vec::new();
        let mut outcomes = Vec::with_capacity(request.keywords.len());
        for keyword in request.keywords.iter() {
            events.emit(ProgressEvent::KeywordDispatched {
                keyword: keyword.to_owned(),
            });
            outcomes.push(ctx.run_keyword(keyword, Handoff::Collect(&mut admitted)).await);
        }

        let pool = EnrichmentPool::new(
            setup.adapter,
            EnrichmentSettings::for_job(&self.config, &request),
            Arc::clone(&setup.ledger),
            events,
        );
        let creators = pool.enrich_all(admitted, &stop).await;

        let deadline_hit = deadline.fired();
        drop(deadline);
        drop(ctx);
        drop(pool);
        let report = finish(
            &setup.ledger,
            setup.reporter,
            outcomes,
            deadline_hit,
            cancel.is_cancelled(),
        )
        .await;
        Ok(JobOutput { creators, report })
    }
}
