//! Conversion from provider search items to [`CreatorSummary`] records.

use std::collections::HashMap;

use scout_core::{ContentItem, CreatorSummary, Platform};

use super::types::{SearchItem, SearchResponse};

/// Group a page's content items by author, preserving first-seen author order.
///
/// Items without an author, or whose author has a blank id, are dropped.
/// The most complete author record wins for profile fields: the largest
/// follower count and the longest bio seen on the page.
pub(super) fn creators_from_page(
    platform: Platform,
    keyword: &str,
    response: &SearchResponse,
) -> Vec<CreatorSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut by_author: HashMap<String, CreatorSummary> = HashMap::new();

    for item in &response.items {
        let Some(author) = item.author.as_ref() else {
            tracing::debug!(item = %item.id, "search item has no author; skipping");
            continue;
        };
        let author_id = author.id.trim();
        if author_id.is_empty() {
            continue;
        }

        let creator = by_author.entry(author_id.to_string()).or_insert_with(|| {
            order.push(author_id.to_string());
            CreatorSummary {
                platform,
                external_id: author_id.to_string(),
                username: author.username.trim().to_string(),
                display_name: author
                    .display_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string),
                follower_count: author.followers,
                verified: author.verified,
                bio: String::new(),
                content: Vec::new(),
                matched_keyword: keyword.to_string(),
            }
        });

        creator.follower_count = creator.follower_count.max(author.followers);
        creator.verified |= author.verified;
        if let Some(bio) = author.bio.as_deref().map(str::trim) {
            if bio.len() > creator.bio.len() {
                creator.bio = bio.to_string();
            }
        }
        creator.content.push(content_item(item));
    }

    order
        .into_iter()
        .filter_map(|id| by_author.remove(&id))
        .collect()
}

fn content_item(item: &SearchItem) -> ContentItem {
    ContentItem {
        id: item.id.clone(),
        url: item.url.clone(),
        caption: item.caption.clone(),
        views: item.stats.views,
        likes: item.stats.likes,
        comments: item.stats.comments,
        posted_at: item.created_at,
    }
}

/// The cursor for the next page, or `None` when the provider signals the end.
pub(super) fn next_cursor(response: &SearchResponse) -> Option<String> {
    if response.has_more == Some(false) {
        return None;
    }
    response
        .next_cursor
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn page(value: serde_json::Value) -> SearchResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn groups_items_by_author_in_first_seen_order() {
        let response = page(json!({
            "items": [
                {"id": "v1", "stats": {"likes": 3}, "author": {"id": "b", "username": "bee"}},
                {"id": "v2", "author": {"id": "a", "username": "ay"}},
                {"id": "v3", "author": {"id": "b", "username": "bee"}}
            ],
            "next_cursor": "c2"
        }));
        let creators = creators_from_page(Platform::Tiktok, "fitness", &response);
        assert_eq!(creators.len(), 2);
        assert_eq!(creators[0].external_id, "b");
        assert_eq!(creators[0].content.len(), 2);
        assert_eq!(creators[0].content[0].likes, 3);
        assert_eq!(creators[1].external_id, "a");
        assert!(creators.iter().all(|c| c.matched_keyword == "fitness"));
    }

    #[test]
    fn keeps_largest_follower_count_and_longest_bio() {
        let response = page(json!({
            "items": [
                {"id": "v1", "author": {"id": "a", "username": "ay", "followers": 10, "bio": "hi"}},
                {"id": "v2", "author": {"id": "a", "username": "ay", "followers": 99, "bio": "hi there, biz: a@b.co", "verified": true}}
            ]
        }));
        let creators = creators_from_page(Platform::Instagram, "yoga", &response);
        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0].follower_count, 99);
        assert_eq!(creators[0].bio, "hi there, biz: a@b.co");
        assert!(creators[0].verified);
    }

    #[test]
    fn drops_items_without_usable_author() {
        let response = page(json!({
            "items": [
                {"id": "v1"},
                {"id": "v2", "author": {"id": "  ", "username": "ghost"}}
            ]
        }));
        assert!(creators_from_page(Platform::Youtube, "x", &response).is_empty());
    }

    #[test]
    fn next_cursor_respects_has_more_false() {
        let response = page(json!({"items": [], "next_cursor": "c9", "has_more": false}));
        assert!(next_cursor(&response).is_none());
    }

    #[test]
    fn next_cursor_treats_blank_as_exhausted() {
        let response = page(json!({"items": [], "next_cursor": ""}));
        assert!(next_cursor(&response).is_none());
        let response = page(json!({"items": [], "next_cursor": "abc", "has_more": true}));
        assert_eq!(next_cursor(&response).as_deref(), Some("abc"));
    }
}
