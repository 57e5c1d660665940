use crate::creators::Platform;

#[derive(Clone)]
pub struct AppConfig {
    pub search_api_url: String,
    pub search_api_key: Option<String>,
    pub log_level: String,
    pub enabled_platforms: Vec<Platform>,
    pub http_timeout_secs: u64,
    pub fetch_timeout_ms: u64,
    pub bio_enrichment_timeout_ms: u64,
    pub max_parallel_enrichments: usize,
    pub enable_bio_enrichment: bool,
    pub max_continuation_runs: u32,
    pub runtime_cap_ms: u64,
    pub max_keywords: usize,
    pub enrichment_queue_capacity: usize,
    pub fetch_max_retries: u32,
    pub fetch_backoff_base_ms: u64,
    pub page_size: u32,
    pub target_overshoot_pct: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("search_api_url", &self.search_api_url)
            .field(
                "search_api_key",
                &self.search_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("log_level", &self.log_level)
            .field("enabled_platforms", &self.enabled_platforms)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("fetch_timeout_ms", &self.fetch_timeout_ms)
            .field("bio_enrichment_timeout_ms", &self.bio_enrichment_timeout_ms)
            .field("max_parallel_enrichments", &self.max_parallel_enrichments)
            .field("enable_bio_enrichment", &self.enable_bio_enrichment)
            .field("max_continuation_runs", &self.max_continuation_runs)
            .field("runtime_cap_ms", &self.runtime_cap_ms)
            .field("max_keywords", &self.max_keywords)
            .field("enrichment_queue_capacity", &self.enrichment_queue_capacity)
            .field("fetch_max_retries", &self.fetch_max_retries)
            .field("fetch_backoff_base_ms", &self.fetch_backoff_base_ms)
            .field("page_size", &self.page_size)
            .field("target_overshoot_pct", &self.target_overshoot_pct)
            .finish()
    }
}
