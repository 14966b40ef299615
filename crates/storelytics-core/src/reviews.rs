use serde::{Deserialize, Serialize};

/// One customer review as it arrived from the feed.
///
/// `review_id` is the feed's entry id and the dedup key across pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReview {
    #[serde(rename = "reviewId", default)]
    pub review_id: String,
    /// Star rating in `1..=5`. `0` marks a record with no usable rating.
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Feed timestamp, usually RFC 3339.
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl RawReview {
    /// Title and content joined by a single space, skipping absent parts.
    #[must_use]
    pub fn full_text(&self) -> String {
        [self.title.as_deref(), self.content.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A review after text normalization and tokenization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReview {
    #[serde(rename = "reviewId")]
    pub review_id: String,
    pub clean_text: String,
    pub tokens: Vec<String>,
    pub token_count: usize,
}

/// Diagnostics for one paginated collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMeta {
    /// Every page request attempted, including a final failing one.
    pub pages_fetched: u32,
    pub total_collected: usize,
}
