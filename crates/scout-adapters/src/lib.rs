//! Platform adapters for creator discovery.
//!
//! Every supported social platform is reached through a [`PlatformAdapter`]:
//! one call fetches a page of creators for a keyword, another looks up a
//! creator's bio for contact details. Adapters are registered by
//! [`scout_core::Platform`] in an [`AdapterRegistry`] built at startup.

pub mod adapter;
pub mod email;
pub mod error;
pub mod registry;
pub mod retry;
pub mod search_api;

pub use adapter::{BioLookup, FetchedPage, PlatformAdapter};
pub use email::extract_emails;
pub use error::AdapterError;
pub use registry::AdapterRegistry;
pub use retry::retry_with_backoff;
pub use search_api::SearchApiAdapter;
