//! Wire types for the content-search provider.
//!
//! ## Search: `GET {base}/v1/{platform}/search?keyword=..&limit=..[&cursor=..]`
//!
//! ```json
//! {
//!   "items": [{
//!     "id": "7301", "url": "https://...", "caption": "leg day",
//!     "stats": { "views": 1200, "likes": 80, "comments": 4 },
//!     "created_at": "2024-05-01T12:00:00Z",
//!     "author": { "id": "55", "username": "fitjane", "display_name": "Jane",
//!                 "followers": 48000, "verified": false, "bio": "..." }
//!   }],
//!   "next_cursor": "opaque",
//!   "has_more": true
//! }
//! ```
//!
//! Items are content (posts/videos), not creators: several items on a page
//! may share an author. `next_cursor` may be absent or empty on the last
//! page; `has_more: false` also ends pagination even when a cursor is sent.
//!
//! ## Profile: `GET {base}/v1/{platform}/profiles/{username}`
//!
//! ```json
//! { "username": "fitjane", "bio": "...", "email": "jane@x.com", "external_url": "..." }
//! ```
//!
//! A 404 means the provider has no profile record; that is not an error.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
    pub next_cursor: Option<String>,
    /// Absent on older provider versions; pagination then follows the cursor.
    pub has_more: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: String,
    pub url: Option<String>,
    pub caption: Option<String>,
    #[serde(default)]
    pub stats: ItemStats,
    pub created_at: Option<DateTime<Utc>>,
    pub author: Option<Author>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemStats {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
}

#[derive(Debug, Deserialize)]
pub struct Author {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub verified: bool,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    pub bio: Option<String>,
    pub email: Option<String>,
    pub external_url: Option<String>,
}
