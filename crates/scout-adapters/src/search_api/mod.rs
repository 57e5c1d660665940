//! HTTP adapter for the JSON content-search provider.

mod normalize;
mod types;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use scout_core::{CreatorSummary, Platform};
use serde::de::DeserializeOwned;

use crate::adapter::{BioLookup, FetchedPage, PlatformAdapter};
use crate::email::extract_emails;
use crate::error::AdapterError;

use types::{ProfileResponse, SearchResponse};

const USER_AGENT: &str = "creator-scout/0.1 (discovery)";

/// Adapter for one platform served by the content-search provider.
///
/// Each call issues exactly one HTTP request; retries are the caller's
/// concern. The underlying `reqwest::Client` is cheap to clone, so one client
/// is shared by the adapters of every platform.
#[derive(Clone)]
pub struct SearchApiAdapter {
    client: Client,
    platform: Platform,
    base_url: Url,
    api_key: String,
    page_size: u32,
}

impl SearchApiAdapter {
    /// Creates an adapter with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Http`] if the client cannot be constructed or
    /// [`AdapterError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        platform: Platform,
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        page_size: u32,
    ) -> Result<Self, AdapterError> {
        Self::with_client(
            build_http_client(timeout_secs)?,
            platform,
            base_url,
            api_key,
            page_size,
        )
    }

    /// Creates an adapter sharing an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidBaseUrl`] if `base_url` does not parse
    /// as an absolute URL that can carry path segments.
    pub fn with_client(
        client: Client,
        platform: Platform,
        base_url: &str,
        api_key: &str,
        page_size: u32,
    ) -> Result<Self, AdapterError> {
        // Normalise to exactly one trailing slash so path segments append
        // rather than replace the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| AdapterError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(AdapterError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "URL cannot carry path segments".to_owned(),
            });
        }

        Ok(Self {
            client,
            platform,
            base_url: parsed,
            api_key: api_key.to_owned(),
            page_size: page_size.max(1),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AdapterError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| AdapterError::InvalidBaseUrl {
                    url: self.base_url.to_string(),
                    reason: "URL cannot carry path segments".to_owned(),
                })?;
            path.pop_if_empty().push("v1").push(self.platform.as_str());
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn search_url(&self, keyword: &str, cursor: Option<&str>) -> Result<Url, AdapterError> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut()
            .append_pair("keyword", keyword)
            .append_pair("limit", &self.page_size.to_string());
        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("cursor", cursor);
        }
        Ok(url)
    }

    fn profile_url(&self, username: &str) -> Result<Url, AdapterError> {
        self.endpoint(&["profiles", username])
    }

    /// Issues a GET and maps the response status to typed errors.
    ///
    /// Returns `Ok(None)` on 404 when `not_found_is_empty` is set.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
        not_found_is_empty: bool,
    ) -> Result<Option<T>, AdapterError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(5);
            return Err(AdapterError::RateLimited {
                platform: self.platform,
                retry_after_secs,
            });
        }

        if status == StatusCode::NOT_FOUND {
            if not_found_is_empty {
                return Ok(None);
            }
            return Err(AdapterError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(AdapterError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body)
            .map(Some)
            .map_err(|e| AdapterError::Deserialize {
                context: context.to_owned(),
                source: e,
            })
    }
}

#[async_trait]
impl PlatformAdapter for SearchApiAdapter {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch_page(
        &self,
        keyword: &str,
        cursor: Option<&str>,
    ) -> Result<FetchedPage, AdapterError> {
        let url = self.search_url(keyword, cursor)?;
        let context = format!("{} search page for \"{keyword}\"", self.platform);
        let response: SearchResponse = self
            .get_json(url, &context, false)
            .await?
            .ok_or_else(|| AdapterError::Provider(format!("empty response for {context}")))?;

        let creators = normalize::creators_from_page(self.platform, keyword, &response);
        let next_cursor = normalize::next_cursor(&response);
        tracing::debug!(
            platform = %self.platform,
            keyword,
            items = response.items.len(),
            creators = creators.len(),
            has_next = next_cursor.is_some(),
            "fetched search page"
        );

        Ok(FetchedPage {
            creators,
            next_cursor,
            api_calls_used: 1,
        })
    }

    async fn enrich_bio(&self, creator: &CreatorSummary) -> Result<BioLookup, AdapterError> {
        let url = self.profile_url(&creator.username)?;
        let context = format!("{} profile for {}", self.platform, creator.username);
        let Some(profile) = self.get_json::<ProfileResponse>(url, &context, true).await? else {
            return Ok(BioLookup::default());
        };

        let bio = profile
            .bio
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_owned);

        let mut emails = Vec::new();
        if let Some(explicit) = profile.email.as_deref() {
            emails.extend(extract_emails(explicit));
        }
        for text in [bio.as_deref(), Some(creator.bio.as_str()), profile.external_url.as_deref()]
            .into_iter()
            .flatten()
        {
            for email in extract_emails(text) {
                if !emails.contains(&email) {
                    emails.push(email);
                }
            }
        }

        Ok(BioLookup { bio, emails })
    }
}

/// Builds the shared HTTP client used by provider adapters.
///
/// # Errors
///
/// Returns [`AdapterError::Http`] if the TLS backend cannot be initialised.
pub fn build_http_client(timeout_secs: u64) -> Result<Client, AdapterError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .build()?)
}
