//! The contract every platform adapter implements.

use async_trait::async_trait;
use scout_core::{CreatorSummary, Platform};

use crate::error::AdapterError;

/// One page of normalized search results for a keyword.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub creators: Vec<CreatorSummary>,
    /// Cursor for the next page; `None` means the keyword is exhausted.
    pub next_cursor: Option<String>,
    /// External calls spent producing this page.
    pub api_calls_used: u32,
}

/// Result of a secondary bio lookup. Both fields may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BioLookup {
    pub bio: Option<String>,
    pub emails: Vec<String>,
}

impl BioLookup {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bio.as_deref().is_none_or(|b| b.trim().is_empty()) && self.emails.is_empty()
    }
}

/// Adapter for one social platform's content-search provider.
///
/// Implementations hold no per-job state and must tolerate concurrent calls
/// for different keywords. Exhaustion is reported as `Ok` with
/// `next_cursor == None`; failures are reported as `Err` and classified by
/// [`AdapterError::is_transient`] so the caller can decide whether to retry.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch one page of creators for `keyword`, starting at `cursor`
    /// (`None` for the first page).
    async fn fetch_page(
        &self,
        keyword: &str,
        cursor: Option<&str>,
    ) -> Result<FetchedPage, AdapterError>;

    /// Look up bio text and contact emails for a creator.
    async fn enrich_bio(&self, creator: &CreatorSummary) -> Result<BioLookup, AdapterError>;
}
