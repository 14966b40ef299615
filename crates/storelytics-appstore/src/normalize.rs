//! Projection of wire records into the shared domain types.

use storelytics_core::{AppDetails, RawReview};

use crate::types::{FeedEntry, LookupResult};

/// Converts a feed entry into a [`RawReview`].
///
/// Returns `None` for entries without a rating (feed metadata rows), without
/// an id, or with a rating that is not an integer in `1..=5`.
#[must_use]
pub fn normalize_entry(entry: &FeedEntry) -> Option<RawReview> {
    let rating = entry
        .rating_label()?
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|r| (1..=5).contains(r))?;
    let review_id = entry.id_label().filter(|id| !id.trim().is_empty())?;

    Some(RawReview {
        review_id,
        rating,
        title: entry.title_label(),
        content: entry.content_label(),
        updated: entry.updated_label(),
        version: entry.version_label(),
        author: entry.author_label(),
    })
}

/// Projects a lookup hit into [`AppDetails`]. A missing price means free.
#[must_use]
pub fn normalize_app(result: &LookupResult) -> AppDetails {
    AppDetails {
        app_id: result.track_id,
        name: result.track_name.clone(),
        bundle_id: result.bundle_id.clone(),
        genres: result.genres.clone(),
        genre_ids: result.genre_ids.clone(),
        rating: result.average_user_rating,
        rating_count: result.user_rating_count,
        price: result.price.unwrap_or(0.0),
        locales: result.language_codes_iso2a.clone(),
        release_date: result.release_date.clone(),
        last_update: result.current_version_release_date.clone(),
        seller: result.seller_name.clone(),
        url: result.track_view_url.clone(),
    }
}
