#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scout_adapters::{AdapterError, AdapterRegistry, BioLookup, FetchedPage, PlatformAdapter};
use scout_core::{CreatorSummary, EnrichedCreator, KeywordSet, Platform};
use scout_pipeline::{JobRequest, PipelineConfig};

/// What the mock provider returns for one keyword.
#[derive(Debug, Clone)]
pub enum Script {
    /// Fixed pages of creator ids; the last page has no next cursor.
    Pages(Vec<Vec<u32>>),
    /// Unlimited pages of `per_page` fresh ids starting at `first_id`.
    Endless { first_id: u32, per_page: u32 },
    /// Every fetch fails with a non-retryable error.
    Broken,
    /// The first `failures` fetches fail with a 503, then `Pages`.
    Flaky { failures: u32, pages: Vec<Vec<u32>> },
}

pub struct MockAdapter {
    platform: Platform,
    scripts: HashMap<String, Script>,
    fetch_delay: Duration,
    bio_delay: Duration,
    failing_bios: HashSet<String>,
    flaky_remaining: Mutex<HashMap<String, u32>>,
    pub fetch_calls: AtomicU32,
    pub bio_calls: AtomicU32,
    bios_in_flight: AtomicUsize,
    pub max_bios_in_flight: AtomicUsize,
}

impl MockAdapter {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            scripts: HashMap::new(),
            fetch_delay: Duration::ZERO,
            bio_delay: Duration::ZERO,
            failing_bios: HashSet::new(),
            flaky_remaining: Mutex::new(HashMap::new()),
            fetch_calls: AtomicU32::new(0),
            bio_calls: AtomicU32::new(0),
            bios_in_flight: AtomicUsize::new(0),
            max_bios_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn script(mut self, keyword: &str, script: Script) -> Self {
        if let Script::Flaky { failures, .. } = &script {
            self.flaky_remaining
                .lock()
                .unwrap()
                .insert(keyword.to_owned(), *failures);
        }
        self.scripts.insert(keyword.to_owned(), script);
        self
    }

    pub fn fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn bio_delay(mut self, delay: Duration) -> Self {
        self.bio_delay = delay;
        self
    }

    pub fn failing_bios<I: IntoIterator<Item = u32>>(mut self, ids: I) -> Self {
        self.failing_bios = ids.into_iter().map(|i| i.to_string()).collect();
        self
    }

    pub fn fetches(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn bios(&self) -> u32 {
        self.bio_calls.load(Ordering::SeqCst)
    }

    fn creator(&self, id: u32, keyword: &str) -> CreatorSummary {
        CreatorSummary {
            platform: self.platform,
            external_id: id.to_string(),
            username: format!("creator{id}"),
            display_name: Some(format!("Creator {id}")),
            follower_count: u64::from(id) * 10,
            verified: false,
            bio: String::new(),
            content: vec![],
            matched_keyword: keyword.to_owned(),
        }
    }

    fn fixed_page(&self, keyword: &str, pages: &[Vec<u32>], index: usize) -> FetchedPage {
        let ids = pages.get(index).cloned().unwrap_or_default();
        FetchedPage {
            creators: ids.into_iter().map(|i| self.creator(i, keyword)).collect(),
            next_cursor: (index + 1 < pages.len()).then(|| format!("p{}", index + 1)),
            api_calls_used: 1,
        }
    }
}

#[async_trait]
impl PlatformAdapter for MockAdapter {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch_page(
        &self,
        keyword: &str,
        cursor: Option<&str>,
    ) -> Result<FetchedPage, AdapterError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.fetch_delay).await;

        let index: usize = cursor
            .and_then(|c| c.strip_prefix('p'))
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);

        match self.scripts.get(keyword) {
            None => Ok(FetchedPage {
                api_calls_used: 1,
                ..FetchedPage::default()
            }),
            Some(Script::Pages(pages)) => Ok(self.fixed_page(keyword, pages, index)),
            Some(Script::Endless { first_id, per_page }) => {
                let start = first_id + u32::try_from(index).unwrap() * per_page;
                Ok(FetchedPage {
                    creators: (start..start + per_page)
                        .map(|i| self.creator(i, keyword))
                        .collect(),
                    next_cursor: Some(format!("p{}", index + 1)),
                    api_calls_used: 1,
                })
            }
            Some(Script::Broken) => Err(AdapterError::UnexpectedStatus {
                status: 403,
                url: format!("mock://search/{keyword}"),
            }),
            Some(Script::Flaky { pages, .. }) => {
                {
                    let mut remaining = self.flaky_remaining.lock().unwrap();
                    let left = remaining.entry(keyword.to_owned()).or_insert(0);
                    if *left > 0 {
                        *left -= 1;
                        return Err(AdapterError::UnexpectedStatus {
                            status: 503,
                            url: format!("mock://search/{keyword}"),
                        });
                    }
                }
                Ok(self.fixed_page(keyword, pages, index))
            }
        }
    }

    async fn enrich_bio(&self, creator: &CreatorSummary) -> Result<BioLookup, AdapterError> {
        self.bio_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.bios_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_bios_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.bio_delay).await;
        self.bios_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_bios.contains(&creator.external_id) {
            return Err(AdapterError::Provider("profile lookup failed".into()));
        }
        Ok(BioLookup {
            bio: Some(format!("Hi, I'm {}", creator.username)),
            emails: vec![format!("{}@mail.example", creator.username)],
        })
    }
}

pub fn registry(adapter: &Arc<MockAdapter>) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::clone(adapter) as Arc<dyn PlatformAdapter>);
    registry
}

pub fn config() -> PipelineConfig {
    PipelineConfig {
        fetch_backoff_base_ms: 1,
        ..PipelineConfig::default()
    }
}

pub fn request(keywords: &[&str], target: u32) -> JobRequest {
    JobRequest::new(
        Platform::Tiktok,
        KeywordSet::new(keywords.iter().copied(), 8).unwrap(),
        target,
    )
}

pub fn ids(range: std::ops::Range<u32>) -> Vec<u32> {
    range.collect()
}

/// Pages of `per_page` consecutive ids covering `range`.
pub fn paged(range: std::ops::Range<u32>, per_page: usize) -> Vec<Vec<u32>> {
    ids(range).chunks(per_page).map(<[u32]>::to_vec).collect()
}

pub fn external_ids(creators: &[EnrichedCreator]) -> Vec<String> {
    let mut ids: Vec<String> = creators
        .iter()
        .map(|c| c.summary.external_id.clone())
        .collect();
    ids.sort();
    ids
}

pub fn assert_unique(creators: &[EnrichedCreator]) {
    let keys: HashSet<_> = creators.iter().map(EnrichedCreator::key).collect();
    assert_eq!(keys.len(), creators.len(), "duplicate creators emitted");
}
