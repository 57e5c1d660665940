use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Half-life used when decaying content age into a recency score.
const RECENCY_HALF_LIFE_DAYS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Tiktok,
    Instagram,
    Youtube,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Tiktok, Platform::Instagram, Platform::Youtube];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Tiktok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Youtube => "youtube",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiktok" => Ok(Platform::Tiktok),
            "instagram" | "ig" => Ok(Platform::Instagram),
            "youtube" | "yt" => Ok(Platform::Youtube),
            other => Err(ConfigError::UnknownPlatform(other.to_string())),
        }
    }
}

/// Identity of a creator within one job: `(platform, external id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatorKey {
    pub platform: Platform,
    pub external_id: String,
}

impl std::fmt::Display for CreatorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.platform, self.external_id)
    }
}

/// A post or video attributed to a creator, with engagement statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub url: Option<String>,
    pub caption: Option<String>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub posted_at: Option<DateTime<Utc>>,
}

impl ContentItem {
    /// Total interactions (likes + comments).
    #[must_use]
    pub fn engagement(&self) -> u64 {
        self.likes.saturating_add(self.comments)
    }
}

/// Normalized creator record produced by a platform adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorSummary {
    pub platform: Platform,
    pub external_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub follower_count: u64,
    pub verified: bool,
    /// Raw bio text as returned by the search provider. May be empty.
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub content: Vec<ContentItem>,
    /// Keyword whose fetch surfaced this creator.
    pub matched_keyword: String,
}

impl CreatorSummary {
    #[must_use]
    pub fn key(&self) -> CreatorKey {
        CreatorKey {
            platform: self.platform,
            external_id: self.external_id.clone(),
        }
    }

    #[must_use]
    pub fn latest_post_at(&self) -> Option<DateTime<Utc>> {
        self.content.iter().filter_map(|c| c.posted_at).max()
    }

    /// Recency score in `(0.0, 1.0]` from the age of the newest content item,
    /// halving every 30 days. Creators without timestamped content score `0.0`.
    #[must_use]
    pub fn recency_score(&self, now: DateTime<Utc>) -> f64 {
        let Some(latest) = self.latest_post_at() else {
            return 0.0;
        };
        #[allow(clippy::cast_precision_loss)]
        let age_days = ((now - latest).num_seconds().max(0) as f64) / 86_400.0;
        0.5_f64.powf(age_days / RECENCY_HALF_LIFE_DAYS)
    }

    /// Mean engagement across content items, 0 when there is no content.
    #[must_use]
    pub fn average_engagement(&self) -> u64 {
        if self.content.is_empty() {
            return 0;
        }
        let total = self
            .content
            .iter()
            .map(ContentItem::engagement)
            .fold(0u64, u64::saturating_add);
        total / self.content.len() as u64
    }
}

/// A creator after the bio-enrichment stage.
///
/// Enrichment only ever adds data: the fetched summary is preserved and
/// `emails` is a union of anything discovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCreator {
    #[serde(flatten)]
    pub summary: CreatorSummary,
    pub bio_enriched: bool,
    #[serde(default)]
    pub emails: Vec<String>,
}

impl EnrichedCreator {
    /// Wrap a summary that skipped or failed enrichment.
    #[must_use]
    pub fn unenriched(summary: CreatorSummary) -> Self {
        Self {
            summary,
            bio_enriched: false,
            emails: Vec::new(),
        }
    }

    #[must_use]
    pub fn key(&self) -> CreatorKey {
        self.summary.key()
    }

    /// Merge the result of a bio lookup into this record.
    ///
    /// A non-empty looked-up bio replaces an empty or shorter fetched bio;
    /// emails are unioned case-insensitively in discovery order. Returns `true`
    /// when the lookup contributed bio text or at least one email.
    pub fn merge_lookup(&mut self, bio: Option<&str>, emails: &[String]) -> bool {
        let mut contributed = false;

        if let Some(bio) = bio.map(str::trim).filter(|b| !b.is_empty()) {
            contributed = true;
            if bio.len() >= self.summary.bio.trim().len() {
                self.summary.bio = bio.to_string();
            }
        }

        let mut seen: HashSet<String> = self.emails.iter().map(|e| e.to_lowercase()).collect();
        for email in emails {
            let normalized = email.trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            contributed = true;
            if seen.insert(normalized.clone()) {
                self.emails.push(normalized);
            }
        }

        if contributed {
            self.bio_enriched = true;
        }
        contributed
    }
}
