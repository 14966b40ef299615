//! Orchestration of collection, cleaning, scoring, and insight generation.

mod analyze;
mod collect;

use std::path::PathBuf;

use storelytics_appstore::{AppStoreClient, ReviewBatch};
use storelytics_core::{clean_app_id, validate_country_code, AppConfig, AppDetails, RawReview};

use crate::error::PipelineError;
use crate::insights::InsightMapper;
use crate::scorer::SentimentScorer;

pub use analyze::{AnalyzeMeta, AnalyzeReport, AnalyzeRequest, DebugInfo};
pub use collect::{
    AnalysisStub, CollectData, CollectMeta, CollectReport, CollectRequest, LangDistribution,
    ReviewSummary,
};

/// Largest review limit accepted by either operation.
pub const MAX_REVIEW_LIMIT: usize = 2000;

/// Reviews fetched by the fixed-size listing operation.
pub const LISTING_LIMIT: usize = 100;

/// Knobs the pipeline needs from process configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Pause between review-feed pages. `0` disables it.
    pub inter_page_delay_ms: u64,
    /// Where `save_raw` snapshots are appended.
    pub data_dir: PathBuf,
    /// When set, snapshot writes run in the background and the operation
    /// returns without waiting for them.
    pub detach_snapshots: bool,
}

/// Request-scoped operations over shared, read-only collaborators.
///
/// Holds no per-request state; wrap in an `Arc` to share across handlers.
pub struct ReviewPipeline {
    client: AppStoreClient,
    scorer: SentimentScorer,
    mapper: InsightMapper,
    settings: PipelineSettings,
}

impl ReviewPipeline {
    #[must_use]
    pub fn new(
        client: AppStoreClient,
        scorer: SentimentScorer,
        mapper: InsightMapper,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            client,
            scorer,
            mapper,
            settings,
        }
    }

    /// Builds a pipeline with a catalog client and default scorer and mapper
    /// from process configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Internal`] if the catalog base URL is unusable.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let client = AppStoreClient::new(
            &config.catalog_base_url,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_ms,
        )?;
        Ok(Self::new(
            client,
            SentimentScorer::new(),
            InsightMapper::new(),
            PipelineSettings {
                inter_page_delay_ms: config.inter_page_delay_ms,
                data_dir: config.data_dir.clone(),
                detach_snapshots: true,
            },
        ))
    }

    /// Waits for snapshot writes before returning, for short-lived callers.
    #[must_use]
    pub fn with_attached_snapshots(mut self) -> Self {
        self.settings.detach_snapshots = false;
        self
    }

    /// Catalog metadata for one app.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for a malformed id or country.
    /// - [`PipelineError::NotFound`] when the catalog has no such app.
    /// - [`PipelineError::Upstream`] when the catalog cannot be reached.
    pub async fn app_info(&self, app_id: &str, country: &str) -> Result<AppDetails, PipelineError> {
        let app_id = clean_app_id(app_id)?;
        let country = validate_country_code(country)?;
        self.lookup_existing(&app_id, &country).await
    }

    /// The most recent reviews for one app, capped at [`LISTING_LIMIT`].
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for a malformed id or country.
    /// - [`PipelineError::NotFound`] when the feed has no reviews.
    /// - [`PipelineError::Upstream`] when the first feed page fails.
    pub async fn recent_reviews(
        &self,
        app_id: &str,
        country: &str,
    ) -> Result<Vec<RawReview>, PipelineError> {
        let app_id = clean_app_id(app_id)?;
        let country = validate_country_code(country)?;
        let batch = self.collect_reviews(&app_id, &country, LISTING_LIMIT).await?;
        Ok(batch.items)
    }

    async fn lookup_existing(
        &self,
        app_id: &str,
        country: &str,
    ) -> Result<AppDetails, PipelineError> {
        self.client
            .lookup_app(app_id, country)
            .await?
            .ok_or_else(|| PipelineError::app_not_found(app_id, country))
    }

    /// Walks the feed and treats an empty result as "no reviews".
    async fn collect_reviews(
        &self,
        app_id: &str,
        country: &str,
        limit: usize,
    ) -> Result<ReviewBatch, PipelineError> {
        let batch = self
            .client
            .fetch_reviews_paged(app_id, country, limit, self.settings.inter_page_delay_ms)
            .await
            .map_err(|e| {
                tracing::warn!(app_id, country, error = %e, "review collection failed");
                PipelineError::from(e)
            })?;
        if batch.items.is_empty() {
            return Err(PipelineError::reviews_not_found(app_id, country));
        }
        Ok(batch)
    }
}

pub(crate) fn validate_review_limit(limit: usize) -> Result<usize, PipelineError> {
    if (1..=MAX_REVIEW_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(PipelineError::validation(format!(
            "review_limit must be between 1 and {MAX_REVIEW_LIMIT}, got {limit}"
        )))
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn elapsed_ms(started: std::time::Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
