//! The collect-and-preprocess operation.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use storelytics_appstore::append_snapshot;
use storelytics_core::{clean_app_id, validate_country_code, AppDetails, CleanReview, RawReview};

use super::{elapsed_ms, validate_review_limit, ReviewPipeline};
use crate::error::PipelineError;
use crate::text::{clean_text, detect_language, summarize_stars, tokenize_en};
use crate::types::round_to;

/// Raw and clean review lists in the report are capped at this length.
const SAMPLE_LIMIT: usize = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct CollectRequest {
    pub app_id: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_review_limit")]
    pub review_limit: usize,
    #[serde(default)]
    pub keep_emojis: bool,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    /// Reviews with fewer tokens get no clean record.
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,
    #[serde(default)]
    pub save_raw: bool,
}

impl CollectRequest {
    /// A request with every optional field at its default.
    #[must_use]
    pub fn for_app(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            country: default_country(),
            review_limit: default_review_limit(),
            keep_emojis: false,
            lowercase: true,
            min_tokens: default_min_tokens(),
            save_raw: false,
        }
    }
}

pub(super) fn default_country() -> String {
    "us".to_owned()
}

pub(super) fn default_review_limit() -> usize {
    300
}

fn default_true() -> bool {
    true
}

fn default_min_tokens() -> usize {
    3
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectReport {
    pub status: &'static str,
    pub meta: CollectMeta,
    pub app_info: AppDetails,
    pub summary: ReviewSummary,
    pub data: CollectData,
    pub analysis_stub: AnalysisStub,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectMeta {
    pub app_id: String,
    pub country: String,
    pub collected_reviews: usize,
    pub pages_fetched: u32,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewSummary {
    pub mean_star: Option<f64>,
    pub by_star: BTreeMap<String, usize>,
    pub lang_distribution: LangDistribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LangDistribution {
    pub en: f64,
    pub other: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectData {
    pub raw_reviews: Vec<RawReview>,
    pub clean_reviews: Vec<CleanReview>,
}

/// Placeholder for analysis results; always serialized as nulls.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStub {
    pub sentiment: Option<serde_json::Value>,
    pub topics: Option<serde_json::Value>,
    pub insights: Option<serde_json::Value>,
}

impl ReviewPipeline {
    /// Looks the app up, walks its review feed, cleans every review, and
    /// summarizes ratings and language mix.
    ///
    /// With `save_raw` the raw reviews are appended to a dated JSONL file,
    /// in the background unless snapshots are attached. A failed write is
    /// logged and does not affect the report.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for bad input, before any request.
    /// - [`PipelineError::NotFound`] when the app or its reviews are absent.
    /// - [`PipelineError::Upstream`] when the catalog or first feed page fails.
    pub async fn collect_and_preprocess(
        &self,
        req: &CollectRequest,
    ) -> Result<CollectReport, PipelineError> {
        let started = Instant::now();
        let app_id = clean_app_id(&req.app_id)?;
        let country = validate_country_code(&req.country)?;
        let limit = validate_review_limit(req.review_limit)?;

        let app_info = self.lookup_existing(&app_id, &country).await?;
        let batch = self.collect_reviews(&app_id, &country, limit).await?;

        let clean = preprocess(&batch.items, req.keep_emojis, req.lowercase, req.min_tokens);
        let (mean_star, by_star) = summarize_stars(&batch.items);
        let lang_distribution = language_distribution(&clean);

        if req.save_raw {
            let write = self.spawn_snapshot(&app_id, &country, batch.items.clone());
            if !self.settings.detach_snapshots {
                if let Err(e) = write.await {
                    tracing::warn!(error = %e, "raw review snapshot task failed");
                }
            }
        }

        tracing::info!(
            app_id = %app_id,
            country = %country,
            collected = batch.meta.total_collected,
            cleaned = clean.len(),
            "collect-and-preprocess finished"
        );

        Ok(CollectReport {
            status: "ok",
            meta: CollectMeta {
                app_id,
                country,
                collected_reviews: batch.meta.total_collected,
                pages_fetched: batch.meta.pages_fetched,
                processing_time_ms: elapsed_ms(started),
            },
            app_info,
            summary: ReviewSummary {
                mean_star,
                by_star,
                lang_distribution,
            },
            data: CollectData {
                raw_reviews: batch.items.into_iter().take(SAMPLE_LIMIT).collect(),
                clean_reviews: clean.into_iter().take(SAMPLE_LIMIT).collect(),
            },
            analysis_stub: AnalysisStub::default(),
        })
    }

    fn spawn_snapshot(
        &self,
        app_id: &str,
        country: &str,
        items: Vec<RawReview>,
    ) -> tokio::task::JoinHandle<()> {
        let dir = self.settings.data_dir.clone();
        let app_id = app_id.to_owned();
        let country = country.to_owned();
        let date = chrono::Utc::now().date_naive();
        tokio::task::spawn_blocking(move || {
            match append_snapshot(&dir, &app_id, &country, date, &items) {
                Ok(path) => {
                    tracing::info!(path = %path.display(), count = items.len(), "raw reviews saved");
                }
                Err(e) => tracing::warn!(
                    app_id = %app_id,
                    country = %country,
                    error = %e,
                    "raw review snapshot failed"
                ),
            }
        })
    }
}

/// Cleans and tokenizes each review, dropping those under `min_tokens`.
pub(crate) fn preprocess(
    items: &[RawReview],
    keep_emojis: bool,
    lowercase: bool,
    min_tokens: usize,
) -> Vec<CleanReview> {
    items
        .iter()
        .filter_map(|review| {
            let clean_text = clean_text(&review.full_text(), keep_emojis, lowercase);
            let tokens = tokenize_en(&clean_text);
            (tokens.len() >= min_tokens).then(|| CleanReview {
                review_id: review.review_id.clone(),
                token_count: tokens.len(),
                clean_text,
                tokens,
            })
        })
        .collect()
}

/// Share of clean reviews detected as English, and the remainder.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn language_distribution(clean: &[CleanReview]) -> LangDistribution {
    let en = clean
        .iter()
        .filter(|c| detect_language(&c.clean_text) == "en")
        .count();
    let share = en as f64 / clean.len().max(1) as f64;
    LangDistribution {
        en: round_to(share, 3),
        other: round_to(1.0 - share, 3),
    }
}
