//! Wire shapes for the catalog lookup endpoint and the customer-review feed.
//!
//! The feed is RSS rendered as JSON: every scalar is wrapped in a
//! `{"label": ...}` object, and `entry`/`link` collapse to a bare object when
//! there is exactly one of them. Both shapes are normalized to a `Vec` here so
//! nothing downstream has to care.

use serde::{Deserialize, Deserializer};

/// Response of `GET /lookup?id=..&country=..`.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponse {
    #[serde(rename = "resultCount", default)]
    pub result_count: u64,
    #[serde(default)]
    pub results: Vec<LookupResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub track_id: Option<u64>,
    pub track_name: Option<String>,
    pub bundle_id: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub genre_ids: Vec<String>,
    pub average_user_rating: Option<f64>,
    pub user_rating_count: Option<u64>,
    pub price: Option<f64>,
    #[serde(rename = "languageCodesISO2A", default)]
    pub language_codes_iso2a: Vec<String>,
    pub release_date: Option<String>,
    pub current_version_release_date: Option<String>,
    pub seller_name: Option<String>,
    pub track_view_url: Option<String>,
}

/// Top level of one review-feed page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub feed: Feed,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feed {
    /// Raw entries. Kept untyped so a single malformed entry cannot fail the
    /// whole page; see [`Feed::entries`].
    #[serde(default, deserialize_with = "one_or_many")]
    pub entry: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub link: Vec<serde_json::Value>,
}

impl Feed {
    /// Entries that match the review shape. Anything else is dropped.
    #[must_use]
    pub fn entries(&self) -> Vec<FeedEntry> {
        self.entry
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect()
    }

    #[must_use]
    pub fn links(&self) -> Vec<FeedLink> {
        self.link
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect()
    }
}

/// A `{"label": "..."}` scalar wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub label: Option<String>,
}

impl Label {
    fn text(label: Option<&Label>) -> Option<String> {
        label.and_then(|l| l.label.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedAuthor {
    #[serde(default)]
    pub name: Option<Label>,
}

/// One feed entry. The first entry of page 1 is often the app itself and
/// carries no `im:rating`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedEntry {
    #[serde(rename = "im:rating", default)]
    pub rating: Option<Label>,
    #[serde(default)]
    pub id: Option<Label>,
    #[serde(default)]
    pub title: Option<Label>,
    #[serde(default)]
    pub content: Option<Label>,
    #[serde(default)]
    pub updated: Option<Label>,
    #[serde(rename = "im:version", default)]
    pub version: Option<Label>,
    #[serde(default)]
    pub author: Option<FeedAuthor>,
}

impl FeedEntry {
    #[must_use]
    pub fn rating_label(&self) -> Option<String> {
        Label::text(self.rating.as_ref())
    }

    #[must_use]
    pub fn id_label(&self) -> Option<String> {
        Label::text(self.id.as_ref())
    }

    #[must_use]
    pub fn title_label(&self) -> Option<String> {
        Label::text(self.title.as_ref())
    }

    #[must_use]
    pub fn content_label(&self) -> Option<String> {
        Label::text(self.content.as_ref())
    }

    #[must_use]
    pub fn updated_label(&self) -> Option<String> {
        Label::text(self.updated.as_ref())
    }

    #[must_use]
    pub fn version_label(&self) -> Option<String> {
        Label::text(self.version.as_ref())
    }

    #[must_use]
    pub fn author_label(&self) -> Option<String> {
        Label::text(self.author.as_ref().and_then(|a| a.name.as_ref()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedLink {
    #[serde(default)]
    pub attributes: Option<LinkAttributes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkAttributes {
    #[serde(default)]
    pub rel: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Accepts a list, a single object, or `null`, and always yields a `Vec`.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<OneOrMany<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(match value {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}
