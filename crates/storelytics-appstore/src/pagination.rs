//! Next-page detection for the review feed.
//!
//! Each feed page carries a `link` list of `{"attributes": {"rel", "href"}}`
//! objects. A `rel == "next"` entry means the feed claims another page exists.
//! The feed keeps advertising `next` past its last real page, so callers
//! also stop when a page adds no new reviews.

use crate::types::FeedLink;

/// Returns `true` if any link has relation `next`.
#[must_use]
pub fn has_next_link(links: &[FeedLink]) -> bool {
    links.iter().any(|link| {
        link.attributes
            .as_ref()
            .and_then(|a| a.rel.as_deref())
            .is_some_and(|rel| rel.eq_ignore_ascii_case("next"))
    })
}
