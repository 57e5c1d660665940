//! Seed-keyword expansion into a capped [`KeywordSet`].

use async_trait::async_trait;
use scout_core::KeywordSet;
use tracing::warn;

use crate::error::PipelineError;

const DEFAULT_TEMPLATES: &[&str] = &[
    "{seed}",
    "{seed} creator",
    "{seed} influencer",
    "{seed} tips",
    "{seed} tutorial",
    "{seed} routine",
    "{seed} review",
    "{seed} challenge",
    "best {seed}",
    "{seed} for beginners",
];

/// Produces related search keywords for a seed term.
#[async_trait]
pub trait KeywordExpander: Send + Sync {
    /// Up to `limit` candidate keywords. Candidates may repeat the seed or
    /// each other; callers de-duplicate.
    async fn expand(&self, seed: &str, limit: usize) -> Result<Vec<String>, PipelineError>;
}

/// Offline expander that fills `{seed}` into fixed phrase templates.
#[derive(Debug, Clone)]
pub struct TemplateExpander {
    templates: Vec<String>,
}

impl Default for TemplateExpander {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATES.iter().map(|t| (*t).to_owned()))
    }
}

impl TemplateExpander {
    pub fn new<I: IntoIterator<Item = String>>(templates: I) -> Self {
        Self {
            templates: templates.into_iter().collect(),
        }
    }
}

#[async_trait]
impl KeywordExpander for TemplateExpander {
    async fn expand(&self, seed: &str, limit: usize) -> Result<Vec<String>, PipelineError> {
        Ok(self
            .templates
            .iter()
            .map(|t| t.replace("{seed}", seed))
            .take(limit)
            .collect())
    }
}

/// Expand `seed` into at most `max_keywords` keywords, seed first.
///
/// An expander failure degrades to the seed alone.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] if the seed is blank or
/// `max_keywords` is zero.
pub async fn expand_keywords(
    expander: &dyn KeywordExpander,
    seed: &str,
    max_keywords: usize,
) -> Result<KeywordSet, PipelineError> {
    let seed_only = KeywordSet::new([seed], max_keywords)?;
    let candidates = match expander.expand(seed.trim(), max_keywords).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(seed, error = %e, "keyword expansion failed; using seed only");
            return Ok(seed_only);
        }
    };
    let all = std::iter::once(seed.to_owned()).chain(candidates);
    Ok(KeywordSet::new(all, max_keywords)?)
}
