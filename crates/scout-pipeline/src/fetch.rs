//! Per-keyword fetch loop shared by both orchestrations.

use std::sync::Arc;

use scout_adapters::{retry_with_backoff, AdapterError, FetchedPage, PlatformAdapter};
use scout_core::CreatorSummary;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::cursor::FetchCursor;
use crate::ledger::{Admission, JobLedger};
use crate::progress::{EventSink, KeywordState, ProgressEvent};
use crate::report::{KeywordOutcome, StopReason};

pub(crate) struct FetchContext {
    pub(crate) adapter: Arc<dyn PlatformAdapter>,
    pub(crate) config: PipelineConfig,
    pub(crate) ledger: Arc<JobLedger>,
    pub(crate) events: EventSink,
    pub(crate) stop: CancellationToken,
}

/// Where admitted creators go.
pub(crate) enum Handoff<'a> {
    /// Bounded enrichment queue; a full queue blocks the fetch loop.
    Queue(&'a mpsc::Sender<CreatorSummary>),
    Collect(&'a mut Vec<CreatorSummary>),
}

impl Handoff<'_> {
    /// Returns `false` once the receiving side has gone away.
    async fn push(&mut self, creator: CreatorSummary) -> bool {
        match self {
            Handoff::Queue(tx) => tx.send(creator).await.is_ok(),
            Handoff::Collect(out) => {
                out.push(creator);
                true
            }
        }
    }
}

impl FetchContext {
    /// One page with timeout and bounded retries. Every attempt is charged to
    /// the ledger: a failed attempt as one call, a success as the page's own
    /// count.
    async fn fetch_page(
        &self,
        keyword: &str,
        cursor: Option<&str>,
    ) -> Result<FetchedPage, AdapterError> {
        let adapter = self.adapter.as_ref();
        let timeout = self.config.fetch_timeout;
        retry_with_backoff(
            self.config.fetch_max_retries,
            self.config.fetch_backoff_base_ms,
            move || async move {
                let attempt = tokio::time::timeout(timeout, adapter.fetch_page(keyword, cursor));
                let result = match attempt.await {
                    Ok(result) => result,
                    Err(_) => Err(AdapterError::Timeout {
                        operation: format!("fetch_page \"{keyword}\""),
                        after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    }),
                };
                let calls = result.as_ref().map_or(1, |page| page.api_calls_used);
                self.ledger.record_fetch_calls(calls);
                self.events.emit(ProgressEvent::ApiCalls {
                    count: u64::from(calls),
                });
                result
            },
        )
        .await
    }

    /// Fetch pages for `keyword` until it is exhausted, capped, the target is
    /// met, the job is stopped, or a page fails after retries.
    ///
    /// Emits exactly one settle event (`KeywordCompleted` or `KeywordFailed`).
    pub(crate) async fn run_keyword(
        &self,
        keyword: &str,
        mut handoff: Handoff<'_>,
    ) -> KeywordOutcome {
        let mut cursor = FetchCursor::start();
        let mut admitted = 0usize;

        let stop_reason = 'pages: loop {
            if self.stop.is_cancelled() {
                break StopReason::Stopped;
            }
            if self.ledger.target_reached() {
                break StopReason::TargetReached;
            }
            if !cursor.may_fetch(self.config.max_continuation_runs) {
                break StopReason::ContinuationCap;
            }

            let token = cursor.token().map(str::to_owned);
            let fetched = tokio::select! {
                biased;
                () = self.stop.cancelled() => None,
                result = self.fetch_page(keyword, token.as_deref()) => Some(result),
            };
            let Some(result) = fetched else {
                break StopReason::Stopped;
            };

            let page = match result {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        keyword,
                        page = cursor.pages_fetched() + 1,
                        error = %e,
                        "keyword fetch failed"
                    );
                    let reason = e.to_string();
                    self.events.emit(ProgressEvent::KeywordFailed {
                        keyword: keyword.to_owned(),
                        reason: reason.clone(),
                    });
                    return KeywordOutcome {
                        keyword: keyword.to_owned(),
                        state: KeywordState::Failed,
                        stop_reason: StopReason::Failed,
                        pages_fetched: cursor.pages_fetched(),
                        creators_admitted: admitted,
                        error: Some(reason),
                    };
                }
            };

            let fetched_count = page.creators.len();
            cursor.advance(page.next_cursor);
            let novel = match self.ledger.admit_page(page.creators) {
                Admission::Admitted(novel) => novel,
                Admission::Closed => break StopReason::TargetReached,
            };
            debug!(
                keyword,
                page = cursor.pages_fetched(),
                fetched = fetched_count,
                novel = novel.len(),
                "page admitted"
            );

            for creator in novel {
                self.events.emit(ProgressEvent::CreatorAdmitted { key: creator.key() });
                admitted += 1;
                if !handoff.push(creator).await {
                    break 'pages StopReason::Stopped;
                }
            }

            if cursor.is_exhausted() {
                break StopReason::Exhausted;
            }
        };

        info!(
            keyword,
            pages = cursor.pages_fetched(),
            admitted,
            stop_reason = ?stop_reason,
            "keyword finished"
        );
        self.events.emit(ProgressEvent::KeywordCompleted {
            keyword: keyword.to_owned(),
        });
        KeywordOutcome {
            keyword: keyword.to_owned(),
            state: KeywordState::Completed,
            stop_reason,
            pages_fetched: cursor.pages_fetched(),
            creators_admitted: admitted,
            error: None,
        }
    }
}
