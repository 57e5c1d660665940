//! Runtime settings and job inputs.

use std::time::Duration;

use scout_core::{AppConfig, KeywordSet, Platform};

use crate::error::PipelineError;

/// Timeouts, parallelism caps and cost bounds applied to every job.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub fetch_timeout: Duration,
    pub bio_enrichment_timeout: Duration,
    pub max_parallel_enrichments: usize,
    pub enrichment_queue_capacity: usize,
    /// Extra pages allowed per keyword after the first.
    pub max_continuation_runs: u32,
    /// Job-scoped deadline; expiry ends the run with `partial` status.
    pub runtime_cap: Duration,
    pub fetch_max_retries: u32,
    pub fetch_backoff_base_ms: u64,
    /// How far past the target a whole page may carry the found count.
    pub target_overshoot_pct: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(15),
            bio_enrichment_timeout: Duration::from_secs(8),
            max_parallel_enrichments: 5,
            enrichment_queue_capacity: 200,
            max_continuation_runs: 10,
            runtime_cap: Duration::from_secs(600),
            fetch_max_retries: 2,
            fetch_backoff_base_ms: 500,
            target_overshoot_pct: 10,
        }
    }
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            fetch_timeout: Duration::from_millis(config.fetch_timeout_ms),
            bio_enrichment_timeout: Duration::from_millis(config.bio_enrichment_timeout_ms),
            max_parallel_enrichments: config.max_parallel_enrichments,
            enrichment_queue_capacity: config.enrichment_queue_capacity,
            max_continuation_runs: config.max_continuation_runs,
            runtime_cap: Duration::from_millis(config.runtime_cap_ms),
            fetch_max_retries: config.fetch_max_retries,
            fetch_backoff_base_ms: config.fetch_backoff_base_ms,
            target_overshoot_pct: config.target_overshoot_pct,
        }
    }
}

impl PipelineConfig {
    pub(crate) fn validate(&self) -> Result<(), PipelineError> {
        if self.max_parallel_enrichments == 0 {
            return Err(PipelineError::InvalidRequest(
                "max_parallel_enrichments must be at least 1".to_owned(),
            ));
        }
        if self.enrichment_queue_capacity == 0 {
            return Err(PipelineError::InvalidRequest(
                "enrichment_queue_capacity must be at least 1".to_owned(),
            ));
        }
        if self.runtime_cap.is_zero() {
            return Err(PipelineError::InvalidRequest(
                "runtime_cap must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Inputs for one discovery job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub platform: Platform,
    pub keywords: KeywordSet,
    pub target_results: u32,
    pub enable_bio_enrichment: bool,
}

impl JobRequest {
    #[must_use]
    pub fn new(platform: Platform, keywords: KeywordSet, target_results: u32) -> Self {
        Self {
            platform,
            keywords,
            target_results,
            enable_bio_enrichment: true,
        }
    }

    #[must_use]
    pub fn with_bio_enrichment(mut self, enabled: bool) -> Self {
        self.enable_bio_enrichment = enabled;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PipelineError> {
        if self.target_results == 0 {
            return Err(PipelineError::InvalidRequest(
                "target_results must be at least 1".to_owned(),
            ));
        }
        if self.keywords.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "at least one keyword is required".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> KeywordSet {
        KeywordSet::new(["fitness"], 8).unwrap()
    }

    #[test]
    fn zero_target_is_rejected() {
        let request = JobRequest::new(Platform::Tiktok, keywords(), 0);
        assert!(matches!(
            request.validate(),
            Err(PipelineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn bio_enrichment_defaults_on() {
        let request = JobRequest::new(Platform::Tiktok, keywords(), 100);
        assert!(request.enable_bio_enrichment);
        assert!(!request.with_bio_enrichment(false).enable_bio_enrichment);
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let config = PipelineConfig {
            max_parallel_enrichments: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(PipelineConfig::default().validate().is_ok());
    }
}
