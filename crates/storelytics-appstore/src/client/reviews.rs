//! Paginated, deduplicating review collection for `AppStoreClient`.

use std::collections::HashSet;
use std::time::Duration;

use storelytics_core::{CollectionMeta, RawReview};

use crate::error::AppStoreError;
use crate::normalize::normalize_entry;
use crate::pagination::has_next_link;

use super::AppStoreClient;
use super::MAX_PAGES;

/// Reviews gathered by one [`AppStoreClient::fetch_reviews_paged`] run.
#[derive(Debug, Clone, Default)]
pub struct ReviewBatch {
    pub items: Vec<RawReview>,
    pub meta: CollectionMeta,
}

impl AppStoreClient {
    /// Walks the review feed from page 1, collecting up to `limit` distinct
    /// reviews.
    ///
    /// Stops, in order of precedence, when:
    /// 1. `limit` reviews are held (mid-page if needed),
    /// 2. the page has no `rel="next"` link,
    /// 3. the page added no review id that was not already seen.
    ///
    /// `inter_page_delay_ms` is slept only when another page will be
    /// requested. `0` disables it.
    ///
    /// **Partial results**: each page is retried on transient errors. If page 1
    /// still fails the error is returned. A failure on any later page ends the
    /// walk and the reviews gathered so far are returned as a success.
    /// `meta.pages_fetched` counts that failing page too.
    ///
    /// # Errors
    ///
    /// Propagates the page-1 error from [`Self::fetch_feed_page`].
    pub async fn fetch_reviews_paged(
        &self,
        app_id: &str,
        country: &str,
        limit: usize,
        inter_page_delay_ms: u64,
    ) -> Result<ReviewBatch, AppStoreError> {
        let mut items: Vec<RawReview> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut pages_fetched = 0u32;

        if limit == 0 {
            return Ok(ReviewBatch::default());
        }

        'pages: for page in 1..=MAX_PAGES {
            pages_fetched += 1;
            let feed = match self.fetch_feed_page(app_id, country, page).await {
                Ok(feed) => feed,
                Err(e) if page == 1 => {
                    tracing::error!(app_id, country, error = %e, "first review page failed");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        app_id,
                        country,
                        page,
                        collected = items.len(),
                        error = %e,
                        "review page failed, keeping partial results"
                    );
                    break;
                }
            };

            let mut added_this_page = 0usize;
            for entry in feed.entries() {
                let Some(review) = normalize_entry(&entry) else {
                    continue;
                };
                if seen.insert(review.review_id.clone()) {
                    items.push(review);
                    added_this_page += 1;
                    if items.len() >= limit {
                        break 'pages;
                    }
                }
            }

            tracing::debug!(app_id, country, page, added_this_page, "review page parsed");

            if !has_next_link(&feed.links()) || added_this_page == 0 {
                break;
            }

            if page < MAX_PAGES && inter_page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(inter_page_delay_ms)).await;
            }
        }

        tracing::info!(
            app_id,
            country,
            pages_fetched,
            collected = items.len(),
            "review collection finished"
        );

        let meta = CollectionMeta {
            pages_fetched,
            total_collected: items.len(),
        };
        Ok(ReviewBatch { items, meta })
    }
}
