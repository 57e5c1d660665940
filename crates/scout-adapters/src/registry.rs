//! Startup-time map from [`Platform`] to adapter implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use scout_core::{AppConfig, Platform};

use crate::adapter::PlatformAdapter;
use crate::error::AdapterError;
use crate::search_api::{build_http_client, SearchApiAdapter};

/// Adapters keyed by the platform they serve.
///
/// Built once at startup; jobs resolve their adapter through [`Self::get`]
/// before any work begins so an unsupported platform fails fast.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<Platform, Arc<dyn PlatformAdapter>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build HTTP search-provider adapters for every enabled platform.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::MissingCredentials`] if `SCOUT_SEARCH_API_KEY` is unset.
    /// - [`AdapterError::InvalidBaseUrl`] if the provider URL is malformed.
    /// - [`AdapterError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AdapterError> {
        let mut registry = Self::new();
        let Some(api_key) = config.search_api_key.as_deref() else {
            return Err(AdapterError::MissingCredentials {
                platform: config
                    .enabled_platforms
                    .first()
                    .copied()
                    .unwrap_or(Platform::Tiktok),
                env_var: "SCOUT_SEARCH_API_KEY",
            });
        };

        let client = build_http_client(config.http_timeout_secs)?;
        for &platform in &config.enabled_platforms {
            let adapter = SearchApiAdapter::with_client(
                client.clone(),
                platform,
                &config.search_api_url,
                api_key,
                config.page_size,
            )?;
            registry.register(Arc::new(adapter));
        }

        tracing::debug!(
            platforms = ?registry.platforms(),
            "registered search-provider adapters"
        );
        Ok(registry)
    }

    /// Register an adapter under its own platform key, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn PlatformAdapter>) {
        self.adapters.insert(adapter.platform(), adapter);
    }

    /// Resolve the adapter for `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Unregistered`] if no adapter serves `platform`.
    pub fn get(&self, platform: Platform) -> Result<Arc<dyn PlatformAdapter>, AdapterError> {
        self.adapters
            .get(&platform)
            .cloned()
            .ok_or(AdapterError::Unregistered(platform))
    }

    #[must_use]
    pub fn platforms(&self) -> Vec<Platform> {
        self.adapters.keys().copied().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
