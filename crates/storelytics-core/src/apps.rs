use serde::{Deserialize, Serialize};

/// Catalog metadata for a single app, projected from the lookup response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDetails {
    pub app_id: Option<u64>,
    pub name: Option<String>,
    pub bundle_id: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub genre_ids: Vec<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    /// Missing prices are reported as `0.0` (free).
    pub price: f64,
    #[serde(default)]
    pub locales: Vec<String>,
    pub release_date: Option<String>,
    pub last_update: Option<String>,
    pub seller: Option<String>,
    pub url: Option<String>,
}
