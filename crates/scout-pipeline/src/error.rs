use scout_adapters::AdapterError;
use scout_core::ConfigError;
use thiserror::Error;

/// Errors surfaced to the caller of a job.
///
/// Only configuration problems (raised before any work starts) and total
/// failure propagate as errors; per-keyword and per-creator failures are
/// absorbed into the job's report.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid job request: {0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("adapter unavailable: {0}")]
    Adapter(#[from] AdapterError),

    #[error("job failed before finding any creators: {reason}")]
    TotalFailure { reason: String },

    #[error("keyword expansion failed: {0}")]
    Expansion(String),

    #[error("pipeline task failed: {0}")]
    Task(String),
}
