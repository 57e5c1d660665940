//! Shared domain types and configuration for the creator discovery pipeline.

pub mod app_config;
pub mod config;
pub mod creators;
pub mod keywords;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use creators::{ContentItem, CreatorKey, CreatorSummary, EnrichedCreator, Platform};
pub use keywords::{KeywordSet, TargetTier};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("unknown platform \"{0}\"")]
    UnknownPlatform(String),

    #[error("invalid keyword set: {0}")]
    InvalidKeywords(String),
}
