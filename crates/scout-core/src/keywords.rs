//! Keyword sets and target-result tiers for discovery jobs.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Ordered, de-duplicated, capped list of search keywords for one job.
///
/// Construction trims whitespace, drops blanks, removes case-insensitive
/// duplicates (first occurrence wins) and truncates to `max_keywords`.
/// The set is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Build a keyword set from raw user or expansion input.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKeywords`] if `max_keywords` is zero or
    /// no non-blank keyword remains.
    pub fn new<I, S>(raw: I, max_keywords: usize) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if max_keywords == 0 {
            return Err(ConfigError::InvalidKeywords(
                "keyword cap must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut keywords = Vec::new();
        for kw in raw {
            let kw = kw.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
            if kw.is_empty() || !seen.insert(kw.to_lowercase()) {
                continue;
            }
            keywords.push(kw);
            if keywords.len() == max_keywords {
                break;
            }
        }

        if keywords.is_empty() {
            return Err(ConfigError::InvalidKeywords(
                "at least one non-blank keyword is required".to_string(),
            ));
        }

        Ok(Self { keywords })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }
}

impl<'a> IntoIterator for &'a KeywordSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.keywords.iter()
    }
}

/// Supported result-count tiers offered to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetTier {
    Small,
    Medium,
    Large,
}

impl TargetTier {
    pub const ALL: [TargetTier; 3] = [TargetTier::Small, TargetTier::Medium, TargetTier::Large];

    #[must_use]
    pub fn results(self) -> u32 {
        match self {
            TargetTier::Small => 100,
            TargetTier::Medium => 500,
            TargetTier::Large => 1000,
        }
    }
}

impl FromStr for TargetTier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "100" => Ok(TargetTier::Small),
            "500" => Ok(TargetTier::Medium),
            "1000" => Ok(TargetTier::Large),
            other => Err(ConfigError::InvalidEnvVar {
                var: "target".to_string(),
                reason: format!("\"{other}\" is not one of 100, 500, 1000"),
            }),
        }
    }
}
