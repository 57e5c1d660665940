//! Job progress: events, the pure tracker, and the reporter task.
//!
//! Workers never touch the progress snapshot directly. They send
//! [`ProgressEvent`]s over an unbounded channel to one reporter task, which
//! folds them through a [`ProgressTracker`] and publishes the result on a
//! `watch` channel for any number of pollers.

use std::collections::{BTreeMap, HashSet};

use scout_core::CreatorKey;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const FOUND_WEIGHT: f64 = 70.0;
const KEYWORD_WEIGHT: f64 = 30.0;
const RUNNING_PERCENT_CAP: u8 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Partial,
    Error,
}

impl JobStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Partial | JobStatus::Error
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Partial => "partial",
            JobStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordState {
    Dispatched,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started,
    KeywordDispatched { keyword: String },
    CreatorAdmitted { key: CreatorKey },
    CreatorEmitted { key: CreatorKey, bio_enriched: bool },
    KeywordCompleted { keyword: String },
    KeywordFailed { keyword: String, reason: String },
    ApiCalls { count: u64 },
    Finished {
        status: JobStatus,
        failure_reason: Option<String>,
    },
}

/// Snapshot published to pollers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobProgress {
    pub status: JobStatus,
    pub target_results: usize,
    pub creators_found: usize,
    pub creators_enriched: usize,
    pub creators_emitted: usize,
    pub keywords_dispatched: usize,
    pub keywords_completed: usize,
    pub keywords_failed: usize,
    pub percent_complete: u8,
    pub total_api_calls: u64,
    pub failure_reason: Option<String>,
    pub keywords: BTreeMap<String, KeywordState>,
}

impl JobProgress {
    #[must_use]
    pub fn pending(target_results: usize) -> Self {
        Self {
            status: JobStatus::Pending,
            target_results,
            creators_found: 0,
            creators_enriched: 0,
            creators_emitted: 0,
            keywords_dispatched: 0,
            keywords_completed: 0,
            keywords_failed: 0,
            percent_complete: 0,
            total_api_calls: 0,
            failure_reason: None,
            keywords: BTreeMap::new(),
        }
    }
}

/// Folds [`ProgressEvent`]s into a [`JobProgress`].
///
/// Counters only grow, `percent_complete` never decreases, and an emitted
/// creator is only counted if its admission was seen first, so
/// `creators_enriched <= creators_emitted <= creators_found` always holds.
/// Events after a terminal status are ignored.
#[derive(Debug)]
pub struct ProgressTracker {
    progress: JobProgress,
    awaiting_emit: HashSet<CreatorKey>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(target_results: usize) -> Self {
        Self {
            progress: JobProgress::pending(target_results),
            awaiting_emit: HashSet::new(),
        }
    }

    #[must_use]
    pub fn progress(&self) -> &JobProgress {
        &self.progress
    }

    pub fn apply(&mut self, event: ProgressEvent) {
        if self.progress.status.is_terminal() {
            return;
        }
        let p = &mut self.progress;
        match event {
            ProgressEvent::Started => p.status = JobStatus::Running,
            ProgressEvent::KeywordDispatched { keyword } => {
                if p.keywords.insert(keyword, KeywordState::Dispatched).is_none() {
                    p.keywords_dispatched += 1;
                }
            }
            ProgressEvent::CreatorAdmitted { key } => {
                if self.awaiting_emit.insert(key) {
                    p.creators_found += 1;
                }
            }
            ProgressEvent::CreatorEmitted { key, bio_enriched } => {
                if self.awaiting_emit.remove(&key) {
                    p.creators_emitted += 1;
                    if bio_enriched {
                        p.creators_enriched += 1;
                    }
                } else {
                    tracing::warn!(creator = %key, "emit for a creator that was never admitted");
                }
            }
            ProgressEvent::KeywordCompleted { keyword } => {
                Self::settle(p, keyword, KeywordState::Completed);
            }
            ProgressEvent::KeywordFailed { keyword, reason } => {
                if Self::settle(p, keyword, KeywordState::Failed) && p.failure_reason.is_none() {
                    p.failure_reason = Some(reason);
                }
            }
            ProgressEvent::ApiCalls { count } => p.total_api_calls += count,
            ProgressEvent::Finished {
                status,
                failure_reason,
            } => {
                p.status = status;
                if failure_reason.is_some() {
                    p.failure_reason = failure_reason;
                }
            }
        }
        self.recompute_percent();
    }

    /// Move a dispatched keyword to a settled state. Returns `false` if the
    /// keyword was unknown or already settled.
    fn settle(p: &mut JobProgress, keyword: String, state: KeywordState) -> bool {
        match p.keywords.get_mut(&keyword) {
            Some(current) if *current == KeywordState::Dispatched => {
                *current = state;
                if state == KeywordState::Failed {
                    p.keywords_failed += 1;
                } else {
                    p.keywords_completed += 1;
                }
                true
            }
            Some(_) => false,
            None => {
                tracing::warn!(keyword = %keyword, "settled a keyword that was never dispatched");
                false
            }
        }
    }

    fn recompute_percent(&mut self) {
        let p = &mut self.progress;
        let percent = if p.status.is_terminal() {
            100
        } else {
            #[allow(clippy::cast_precision_loss)]
            let found_ratio = if p.target_results == 0 {
                0.0
            } else {
                (p.creators_found as f64 / p.target_results as f64).min(1.0)
            };
            #[allow(clippy::cast_precision_loss)]
            let keyword_ratio = if p.keywords_dispatched == 0 {
                0.0
            } else {
                (p.keywords_completed + p.keywords_failed) as f64 / p.keywords_dispatched as f64
            };
            let raw = FOUND_WEIGHT * found_ratio + KEYWORD_WEIGHT * keyword_ratio;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let raw = raw.floor().clamp(0.0, 100.0) as u8;
            raw.min(RUNNING_PERCENT_CAP)
        };
        p.percent_complete = p.percent_complete.max(percent);
    }
}

/// Cloneable sending side of a job's progress channel.
///
/// Sends never fail from the worker's point of view: once the reporter is
/// gone, events are dropped.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl EventSink {
    pub fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

pub(crate) struct Reporter {
    pub(crate) sink: EventSink,
    pub(crate) updates: watch::Receiver<JobProgress>,
    pub(crate) task: JoinHandle<JobProgress>,
}

/// Start the reporter task for a job.
///
/// The task ends after applying a terminal [`ProgressEvent::Finished`] or
/// when every [`EventSink`] has been dropped, returning the final snapshot.
pub(crate) fn spawn_reporter(target_results: usize) -> Reporter {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (updates_tx, updates) = watch::channel(JobProgress::pending(target_results));

    let task = tokio::spawn(async move {
        let mut tracker = ProgressTracker::new(target_results);
        while let Some(event) = rx.recv().await {
            tracker.apply(event);
            updates_tx.send_replace(tracker.progress().clone());
            if tracker.progress().status.is_terminal() {
                break;
            }
        }
        tracker.progress().clone()
    });

    Reporter {
        sink: EventSink { tx },
        updates,
        task,
    }
}

#[cfg(test)]
mod tests {
    use scout_core::Platform;

    use super::*;

    fn key(id: &str) -> CreatorKey {
        CreatorKey {
            platform: Platform::Tiktok,
            external_id: id.to_string(),
        }
    }

    fn dispatched(tracker: &mut ProgressTracker, keywords: &[&str]) {
        tracker.apply(ProgressEvent::Started);
        for kw in keywords {
            tracker.apply(ProgressEvent::KeywordDispatched {
                keyword: (*kw).to_string(),
            });
        }
    }

    #[test]
    fn percent_weights_found_and_keywords() {
        let mut tracker = ProgressTracker::new(10);
        dispatched(&mut tracker, &["a", "b"]);
        for i in 0..5 {
            tracker.apply(ProgressEvent::CreatorAdmitted {
                key: key(&i.to_string()),
            });
        }
        tracker.apply(ProgressEvent::KeywordCompleted {
            keyword: "a".into(),
        });
        // 70 * 0.5 + 30 * 0.5
        assert_eq!(tracker.progress().percent_complete, 50);
    }

    #[test]
    fn percent_caps_at_99_until_terminal() {
        let mut tracker = ProgressTracker::new(1);
        dispatched(&mut tracker, &["a"]);
        tracker.apply(ProgressEvent::CreatorAdmitted { key: key("1") });
        tracker.apply(ProgressEvent::KeywordCompleted {
            keyword: "a".into(),
        });
        assert_eq!(tracker.progress().percent_complete, 99);

        tracker.apply(ProgressEvent::Finished {
            status: JobStatus::Completed,
            failure_reason: None,
        });
        assert_eq!(tracker.progress().percent_complete, 100);
        assert_eq!(tracker.progress().status, JobStatus::Completed);
    }

    #[test]
    fn percent_never_decreases_when_more_keywords_dispatch() {
        let mut tracker = ProgressTracker::new(100);
        dispatched(&mut tracker, &["a"]);
        tracker.apply(ProgressEvent::KeywordCompleted {
            keyword: "a".into(),
        });
        let before = tracker.progress().percent_complete;
        tracker.apply(ProgressEvent::KeywordDispatched {
            keyword: "b".into(),
        });
        assert!(tracker.progress().percent_complete >= before);
    }

    #[test]
    fn emits_without_admission_are_ignored() {
        let mut tracker = ProgressTracker::new(10);
        dispatched(&mut tracker, &["a"]);
        tracker.apply(ProgressEvent::CreatorEmitted {
            key: key("ghost"),
            bio_enriched: true,
        });
        assert_eq!(tracker.progress().creators_emitted, 0);
        assert_eq!(tracker.progress().creators_enriched, 0);
    }

    #[test]
    fn enriched_never_exceeds_found() {
        let mut tracker = ProgressTracker::new(10);
        dispatched(&mut tracker, &["a"]);
        tracker.apply(ProgressEvent::CreatorAdmitted { key: key("1") });
        for _ in 0..3 {
            tracker.apply(ProgressEvent::CreatorEmitted {
                key: key("1"),
                bio_enriched: true,
            });
        }
        let p = tracker.progress();
        assert_eq!(p.creators_found, 1);
        assert_eq!(p.creators_enriched, 1);
    }

    #[test]
    fn first_keyword_failure_is_kept() {
        let mut tracker = ProgressTracker::new(10);
        dispatched(&mut tracker, &["a", "b"]);
        tracker.apply(ProgressEvent::KeywordFailed {
            keyword: "a".into(),
            reason: "first".into(),
        });
        tracker.apply(ProgressEvent::KeywordFailed {
            keyword: "b".into(),
            reason: "second".into(),
        });
        let p = tracker.progress();
        assert_eq!(p.keywords_failed, 2);
        assert_eq!(p.failure_reason.as_deref(), Some("first"));
        assert_eq!(p.keywords["a"], KeywordState::Failed);
    }

    #[test]
    fn events_after_terminal_status_are_ignored() {
        let mut tracker = ProgressTracker::new(10);
        dispatched(&mut tracker, &["a"]);
        tracker.apply(ProgressEvent::Finished {
            status: JobStatus::Partial,
            failure_reason: None,
        });
        tracker.apply(ProgressEvent::CreatorAdmitted { key: key("late") });
        assert_eq!(tracker.progress().creators_found, 0);
        assert_eq!(tracker.progress().status, JobStatus::Partial);
    }

    #[tokio::test]
    async fn reporter_publishes_and_returns_final_snapshot() {
        let reporter = spawn_reporter(2);
        let mut updates = reporter.updates.clone();
        reporter.sink.emit(ProgressEvent::Started);
        reporter.sink.emit(ProgressEvent::KeywordDispatched {
            keyword: "a".into(),
        });
        reporter.sink.emit(ProgressEvent::Finished {
            status: JobStatus::Partial,
            failure_reason: None,
        });
        let final_progress = reporter.task.await.unwrap();
        assert_eq!(final_progress.status, JobStatus::Partial);
        assert_eq!(final_progress.percent_complete, 100);

        assert_eq!(updates.borrow_and_update().status, JobStatus::Partial);
    }
}
