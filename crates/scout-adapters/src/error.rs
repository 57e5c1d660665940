use scout_core::Platform;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: String, after_ms: u64 },

    #[error("rate limited by {platform} provider (retry after {retry_after_secs}s)")]
    RateLimited {
        platform: Platform,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("missing credentials for {platform} adapter: set {env_var}")]
    MissingCredentials {
        platform: Platform,
        env_var: &'static str,
    },

    #[error("no adapter registered for platform {0}")]
    Unregistered(Platform),

    #[error("invalid provider base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("provider error: {0}")]
    Provider(String),
}

impl AdapterError {
    /// Returns `true` for conditions worth retrying after a backoff delay.
    ///
    /// Retriable: timeouts, 429, network-level failures and 5xx responses.
    /// Everything else (404, other 4xx, malformed bodies, configuration
    /// problems) returns the same result on retry and is propagated at once.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            AdapterError::Timeout { .. } | AdapterError::RateLimited { .. } => true,
            AdapterError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            AdapterError::UnexpectedStatus { status, .. } => *status >= 500,
            AdapterError::Deserialize { .. }
            | AdapterError::NotFound { .. }
            | AdapterError::MissingCredentials { .. }
            | AdapterError::Unregistered(_)
            | AdapterError::InvalidBaseUrl { .. }
            | AdapterError::Provider(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_and_rate_limits_are_transient() {
        assert!(AdapterError::Timeout {
            operation: "fetch_page".to_owned(),
            after_ms: 100,
        }
        .is_transient());
        assert!(AdapterError::RateLimited {
            platform: Platform::Tiktok,
            retry_after_secs: 1,
        }
        .is_transient());
    }

    #[test]
    fn server_errors_are_transient_client_errors_are_not() {
        let server = AdapterError::UnexpectedStatus {
            status: 503,
            url: "https://x".to_owned(),
        };
        let client = AdapterError::UnexpectedStatus {
            status: 403,
            url: "https://x".to_owned(),
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
    }

    #[test]
    fn configuration_errors_are_not_transient() {
        let err = AdapterError::MissingCredentials {
            platform: Platform::Instagram,
            env_var: "SCOUT_SEARCH_API_KEY",
        };
        assert!(!err.is_transient());
        assert!(!AdapterError::Unregistered(Platform::Youtube).is_transient());
    }

    #[test]
    fn deserialize_errors_are_not_transient() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AdapterError::Deserialize {
            context: "search page".to_owned(),
            source,
        };
        assert!(!err.is_transient());
    }
}
