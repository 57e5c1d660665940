//! Fan-out creator discovery and enrichment pipeline.
//!
//! A job takes a [`JobRequest`] (platform, keyword set, target result count)
//! and produces de-duplicated [`scout_core::EnrichedCreator`] records plus a
//! final [`JobReport`]. Two orchestrations share the same building blocks:
//!
//! - [`ParallelPipeline`]: one fetch task per keyword feeding a bounded
//!   enrichment queue drained by a fixed worker pool; creators stream out
//!   through a [`JobHandle`] as soon as they leave enrichment.
//! - [`SequentialPipeline`]: fetch every keyword in order, then enrich.
//!   Used for small jobs and as the reference for the parallel path.
//!
//! Shared state is confined to the [`JobLedger`] (identity set + counters);
//! progress flows as [`ProgressEvent`]s to a single reporter task that
//! publishes [`JobProgress`] snapshots for pollers.

pub mod config;
pub mod cursor;
pub mod enrichment;
pub mod error;
pub mod expansion;
pub mod ledger;
pub mod parallel;
pub mod progress;
pub mod report;
pub mod sequential;

mod fetch;
mod job;

pub use config::{JobRequest, PipelineConfig};
pub use cursor::FetchCursor;
pub use enrichment::{EnrichmentPool, EnrichmentSettings};
pub use error::PipelineError;
pub use expansion::{expand_keywords, KeywordExpander, TemplateExpander};
pub use ledger::{Admission, JobLedger, MetricsSnapshot};
pub use parallel::{JobHandle, ParallelPipeline};
pub use progress::{JobProgress, JobStatus, KeywordState, ProgressEvent, ProgressTracker};
pub use report::{JobOutput, JobReport, KeywordOutcome, StopReason};
pub use sequential::SequentialPipeline;
