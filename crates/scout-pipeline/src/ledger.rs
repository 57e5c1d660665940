//! Shared job state: the creator identity set and cost counters.
//!
//! Every fetch task admits pages through [`JobLedger::admit_page`], which is
//! the single point where de-duplication and target capping happen. The
//! check-and-insert for a whole page runs under one lock, so no creator can
//! be admitted twice even when keywords race on overlapping results.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use scout_core::{CreatorKey, CreatorSummary};
use serde::Serialize;
use tokio::time::Instant;

/// Result of offering a fetched page to the ledger.
#[derive(Debug)]
pub enum Admission {
    /// Creators not seen before in this job, in page order.
    Admitted(Vec<CreatorSummary>),
    /// The target was already met; nothing further is admitted.
    Closed,
}

/// Point-in-time cost and throughput figures for a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_api_calls: u64,
    pub fetch_api_calls: u64,
    pub enrichment_api_calls: u64,
    pub bio_enrichments_attempted: u64,
    pub bio_enrichments_succeeded: u64,
    pub creators_found: usize,
    pub creators_emitted: u64,
    pub elapsed_ms: u64,
    pub creators_per_second: f64,
}

#[derive(Debug)]
pub struct JobLedger {
    target: usize,
    ceiling: usize,
    seen: Mutex<HashSet<CreatorKey>>,
    found: AtomicUsize,
    fetch_api_calls: AtomicU64,
    enrichment_api_calls: AtomicU64,
    bio_attempted: AtomicU64,
    bio_succeeded: AtomicU64,
    emitted: AtomicU64,
    started: Instant,
}

impl JobLedger {
    /// `overshoot_pct` bounds how far a whole page may carry the found count
    /// past `target`; pages that would exceed it are truncated at `target`.
    #[must_use]
    pub fn new(target: usize, overshoot_pct: u32) -> Self {
        let slack = target.saturating_mul(overshoot_pct as usize) / 100;
        Self {
            target,
            ceiling: target.saturating_add(slack),
            seen: Mutex::new(HashSet::new()),
            found: AtomicUsize::new(0),
            fetch_api_calls: AtomicU64::new(0),
            enrichment_api_calls: AtomicU64::new(0),
            bio_attempted: AtomicU64::new(0),
            bio_succeeded: AtomicU64::new(0),
            emitted: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    #[must_use]
    pub fn creators_found(&self) -> usize {
        self.found.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn target_reached(&self) -> bool {
        self.creators_found() >= self.target
    }

    /// Admit the novel creators of one fetched page.
    ///
    /// Duplicates (within the page or against earlier pages) are dropped.
    /// If keeping every novel creator would push the found count past the
    /// overshoot ceiling, only enough to reach the target exactly are kept.
    pub fn admit_page(&self, creators: Vec<CreatorSummary>) -> Admission {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        let found = seen.len();
        if found >= self.target {
            return Admission::Closed;
        }

        let mut page_keys = HashSet::new();
        let mut novel: Vec<CreatorSummary> = creators
            .into_iter()
            .filter(|c| {
                let key = c.key();
                !seen.contains(&key) && page_keys.insert(key)
            })
            .collect();

        if found + novel.len() > self.ceiling {
            novel.truncate(self.target - found);
        }
        for creator in &novel {
            seen.insert(creator.key());
        }
        self.found.store(seen.len(), Ordering::Release);
        Admission::Admitted(novel)
    }

    pub fn record_fetch_calls(&self, calls: u32) {
        self.fetch_api_calls
            .fetch_add(u64::from(calls), Ordering::Relaxed);
    }

    pub fn record_enrichment_call(&self) {
        self.enrichment_api_calls.fetch_add(1, Ordering::Relaxed);
        self.bio_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enrichment_success(&self) {
        self.bio_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_emitted(&self) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn total_api_calls(&self) -> u64 {
        self.fetch_api_calls.load(Ordering::Relaxed)
            + self.enrichment_api_calls.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let fetch_api_calls = self.fetch_api_calls.load(Ordering::Relaxed);
        let enrichment_api_calls = self.enrichment_api_calls.load(Ordering::Relaxed);
        let creators_found = self.creators_found();
        let elapsed = self.started.elapsed();
        let secs = elapsed.as_secs_f64();
        #[allow(clippy::cast_precision_loss)]
        let creators_per_second = if secs > 0.0 {
            creators_found as f64 / secs
        } else {
            0.0
        };

        MetricsSnapshot {
            total_api_calls: fetch_api_calls + enrichment_api_calls,
            fetch_api_calls,
            enrichment_api_calls,
            bio_enrichments_attempted: self.bio_attempted.load(Ordering::Relaxed),
            bio_enrichments_succeeded: self.bio_succeeded.load(Ordering::Relaxed),
            creators_found,
            creators_emitted: self.emitted.load(Ordering::Relaxed),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            creators_per_second,
        }
    }
}
