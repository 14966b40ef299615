//! HTTP client for the catalog lookup endpoint and the review feed.

mod reviews;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use storelytics_core::AppDetails;

use crate::error::AppStoreError;
use crate::normalize::normalize_app;
use crate::rate_limit::retry_with_backoff;
use crate::types::{Feed, FeedResponse, LookupResponse};

pub use reviews::ReviewBatch;

/// Hard stop for the page loop in case the feed never stops advertising a
/// next page and keeps returning new ids.
pub(super) const MAX_PAGES: u32 = 100;

/// Client for the public app catalog.
///
/// Every request carries the configured `User-Agent`. Transient errors
/// (network failures, 429, 5xx) are retried with exponential backoff up to
/// `max_retries` additional attempts.
pub struct AppStoreClient {
    pub(super) client: Client,
    base_url: String,
    /// Maximum number of retry attempts after the first failure.
    pub(super) max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub(super) backoff_base_ms: u64,
}

impl AppStoreClient {
    /// Creates a client rooted at `base_url` (e.g. `https://itunes.apple.com`).
    ///
    /// # Errors
    ///
    /// - [`AppStoreError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`AppStoreError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, AppStoreError> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        reqwest::Url::parse(&base_url).map_err(|e| AppStoreError::InvalidBaseUrl {
            base_url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Looks up catalog metadata for one app in one storefront.
    ///
    /// Returns `Ok(None)` when the catalog reports zero results.
    ///
    /// # Errors
    ///
    /// Returns [`AppStoreError`] on transport failures (after retries),
    /// non-2xx statuses, or an undecodable body.
    pub async fn lookup_app(
        &self,
        app_id: &str,
        country: &str,
    ) -> Result<Option<AppDetails>, AppStoreError> {
        let url = self.lookup_url(app_id, country)?;
        let response: LookupResponse = self
            .get_json(&url, &format!("lookup for app {app_id} ({country})"))
            .await?;

        if response.result_count == 0 {
            tracing::info!(app_id, country, "catalog lookup returned no results");
            return Ok(None);
        }
        Ok(response.results.first().map(normalize_app))
    }

    /// Fetches one page (1-based) of the most-recent review feed.
    ///
    /// # Errors
    ///
    /// Returns [`AppStoreError`] on transport failures (after retries),
    /// non-2xx statuses, or a body that is not JSON.
    pub async fn fetch_feed_page(
        &self,
        app_id: &str,
        country: &str,
        page: u32,
    ) -> Result<Feed, AppStoreError> {
        let url = self.feed_url(app_id, country, page)?;
        let response: FeedResponse = self
            .get_json(&url, &format!("review feed page {page} for app {app_id}"))
            .await?;
        Ok(response.feed)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        context: &str,
    ) -> Result<T, AppStoreError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.to_owned();
            async move {
                let response = self.client.get(&url).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(AppStoreError::RateLimited { retry_after_secs });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(AppStoreError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(AppStoreError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| AppStoreError::Deserialize {
                    context: context.to_owned(),
                    source: e,
                })
            }
        })
        .await
    }

    fn lookup_url(&self, app_id: &str, country: &str) -> Result<String, AppStoreError> {
        let mut url = self.parse_url(&format!("{}/lookup", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("id", app_id)
            .append_pair("country", country);
        Ok(url.to_string())
    }

    fn feed_url(&self, app_id: &str, country: &str, page: u32) -> Result<String, AppStoreError> {
        let raw = format!(
            "{}/{country}/rss/customerreviews/id={app_id}/sortBy=mostRecent/page={page}/json",
            self.base_url
        );
        Ok(self.parse_url(&raw)?.to_string())
    }

    fn parse_url(&self, raw: &str) -> Result<reqwest::Url, AppStoreError> {
        reqwest::Url::parse(raw).map_err(|e| AppStoreError::InvalidBaseUrl {
            base_url: self.base_url.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
