//! Final job outcome and status classification.

use scout_core::EnrichedCreator;
use serde::Serialize;

use crate::error::PipelineError;
use crate::ledger::MetricsSnapshot;
use crate::progress::{JobProgress, JobStatus, KeywordState};

/// Why a keyword's fetch loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The provider returned no further cursor.
    Exhausted,
    ContinuationCap,
    /// The job-wide target was met.
    TargetReached,
    /// Deadline or caller cancellation.
    Stopped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordOutcome {
    pub keyword: String,
    pub state: KeywordState,
    pub stop_reason: StopReason,
    pub pages_fetched: u32,
    pub creators_admitted: usize,
    pub error: Option<String>,
}

impl KeywordOutcome {
    #[must_use]
    pub fn failed(&self) -> bool {
        self.state == KeywordState::Failed
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub status: JobStatus,
    pub failure_reason: Option<String>,
    pub deadline_hit: bool,
    pub cancelled: bool,
    pub progress: JobProgress,
    pub metrics: MetricsSnapshot,
    pub keywords: Vec<KeywordOutcome>,
}

impl JobReport {
    /// Turn an `error` status into [`PipelineError::TotalFailure`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::TotalFailure`] when the job found nothing and
    /// at least one keyword failed.
    pub fn into_result(self) -> Result<Self, PipelineError> {
        if self.status == JobStatus::Error {
            return Err(PipelineError::TotalFailure {
                reason: self
                    .failure_reason
                    .unwrap_or_else(|| "all keywords failed".to_owned()),
            });
        }
        Ok(self)
    }
}

/// Creators collected from a finished job together with its report.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutput {
    pub creators: Vec<EnrichedCreator>,
    pub report: JobReport,
}

/// Classify a finished job.
///
/// - `completed`: target met, no keyword failed, and the job ran to its end.
/// - `error`: nothing found and at least one keyword failed.
/// - `partial`: everything else, including a deadline or cancellation that
///   fired after the target was met.
///
/// The failure reason is the first failed keyword's error in keyword order.
pub(crate) fn classify(
    creators_found: usize,
    target: usize,
    outcomes: &[KeywordOutcome],
    stopped_early: bool,
) -> (JobStatus, Option<String>) {
    let first_failure = outcomes
        .iter()
        .find(|o| o.failed())
        .map(|o| match &o.error {
            Some(e) => format!("keyword \"{}\": {e}", o.keyword),
            None => format!("keyword \"{}\" failed", o.keyword),
        });

    let status = match (creators_found, &first_failure) {
        (0, Some(_)) => JobStatus::Error,
        (found, None) if found >= target && !stopped_early => JobStatus::Completed,
        _ => JobStatus::Partial,
    };
    (status, first_failure)
}
