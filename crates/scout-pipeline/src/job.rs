//! Setup and teardown shared by both orchestrations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scout_adapters::{AdapterError, AdapterRegistry, PlatformAdapter};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{JobRequest, PipelineConfig};
use crate::error::PipelineError;
use crate::ledger::JobLedger;
use crate::progress::{spawn_reporter, ProgressEvent, Reporter};
use crate::report::{classify, JobReport, KeywordOutcome};

pub(crate) struct JobSetup {
    pub(crate) adapter: Arc<dyn PlatformAdapter>,
    pub(crate) ledger: Arc<JobLedger>,
    pub(crate) reporter: Reporter,
}

/// Validate inputs and resolve the adapter before any work is spawned, so
/// configuration problems surface as errors rather than as a failed job.
pub(crate) fn prepare(
    registry: &AdapterRegistry,
    config: &PipelineConfig,
    request: &JobRequest,
) -> Result<JobSetup, PipelineError> {
    config.validate()?;
    request.validate()?;
    let adapter = registry.get(request.platform)?;
    if adapter.platform() != request.platform {
        return Err(PipelineError::Adapter(AdapterError::Unregistered(
            request.platform,
        )));
    }

    let target = request.target_results as usize;
    Ok(JobSetup {
        adapter,
        ledger: Arc::new(JobLedger::new(target, config.target_overshoot_pct)),
        reporter: spawn_reporter(target),
    })
}

/// Cancels `stop` once `cap` elapses. Disarmed on drop.
pub(crate) struct DeadlineGuard {
    fired: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl DeadlineGuard {
    pub(crate) fn arm(stop: CancellationToken, cap: Duration) -> Self {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let task = tokio::spawn(async move {
            tokio::select! {
                () = stop.cancelled() => {}
                () = tokio::time::sleep(cap) => {
                    let cap_ms = u64::try_from(cap.as_millis()).unwrap_or(u64::MAX);
                    warn!(cap_ms, "job runtime cap reached; stopping");
                    flag.store(true, Ordering::Release);
                    stop.cancel();
                }
            }
        });
        Self { fired, task }
    }

    pub(crate) fn fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Drop for DeadlineGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Classify the job, publish the terminal event and wait for the reporter.
pub(crate) async fn finish(
    ledger: &JobLedger,
    reporter: Reporter,
    outcomes: Vec<KeywordOutcome>,
    deadline_hit: bool,
    cancelled: bool,
) -> JobReport {
    let metrics = ledger.snapshot();
    let (status, failure_reason) = classify(
        metrics.creators_found,
        ledger.target(),
        &outcomes,
        deadline_hit || cancelled,
    );

    let Reporter {
        sink,
        updates,
        task,
    } = reporter;
    sink.emit(ProgressEvent::Finished {
        status,
        failure_reason: failure_reason.clone(),
    });
    drop(sink);
    let progress = match task.await {
        Ok(progress) => progress,
        Err(e) => {
            warn!(error = %e, "progress reporter task failed");
            updates.borrow().clone()
        }
    };

    info!(
        status = %status,
        creators_found = metrics.creators_found,
        total_api_calls = metrics.total_api_calls,
        elapsed_ms = metrics.elapsed_ms,
        deadline_hit,
        cancelled,
        "job finished"
    );

    JobReport {
        status,
        failure_reason,
        deadline_hit,
        cancelled,
        progress,
        metrics,
        keywords: outcomes,
    }
}
