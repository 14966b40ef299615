//! The analyze operation: sentiment, negative phrases, and insights.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use storelytics_core::{clean_app_id, validate_country_code, RawReview};

use super::collect::{default_country, default_review_limit};
use super::{elapsed_ms, validate_review_limit, ReviewPipeline};
use crate::error::PipelineError;
use crate::phrases::extract_negative_phrases;
use crate::scorer::SentimentScorer;
use crate::sentiment::{analyze_sentiment, negative_reviews};
use crate::types::{Insight, NegativePhrase, RecencyCutoffs, SentimentOverview, Thresholds, Weights};

/// Batches smaller than this are flagged as low-sample in the debug block.
const LOW_SAMPLE_THRESHOLD: usize = 50;

const MAX_TOP_K: usize = 100;
const MAX_NGRAM: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub app_id: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_review_limit")]
    pub review_limit: usize,
    #[serde(default = "default_model")]
    pub sentiment_model: String,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: Vec<usize>,
    #[serde(default = "default_min_df")]
    pub min_df: usize,
    #[serde(default = "default_top_k")]
    pub top_k_phrases: usize,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default = "default_cutoffs")]
    pub recency_cutoffs_days: Vec<i64>,
    /// Caller-supplied reviews. When non-empty, no catalog request is made.
    #[serde(default)]
    pub reviews_override: Option<Vec<serde_json::Value>>,
}

impl AnalyzeRequest {
    /// A request with every optional field at its default.
    #[must_use]
    pub fn for_app(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            country: default_country(),
            review_limit: default_review_limit(),
            sentiment_model: default_model(),
            ngram_range: default_ngram_range(),
            min_df: default_min_df(),
            top_k_phrases: default_top_k(),
            weights: Weights::default(),
            recency_cutoffs_days: default_cutoffs(),
            reviews_override: None,
        }
    }
}

fn default_model() -> String {
    SentimentScorer::MODEL.to_owned()
}

fn default_ngram_range() -> Vec<usize> {
    vec![1, 2]
}

fn default_min_df() -> usize {
    2
}

fn default_top_k() -> usize {
    20
}

fn default_cutoffs() -> Vec<i64> {
    let defaults = RecencyCutoffs::default();
    vec![defaults.recent, defaults.stale]
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeReport {
    pub status: &'static str,
    pub meta: AnalyzeMeta,
    pub sentiment_overview: SentimentOverview,
    pub top_negative_phrases: Vec<NegativePhrase>,
    pub insights: Vec<Insight>,
    pub debug: DebugInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeMeta {
    pub app_id: String,
    pub country: String,
    pub analyzed: usize,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    pub model: &'static str,
    pub thresholds: Thresholds,
    pub low_sample: bool,
    pub no_negative_signal: bool,
}

/// Validated, typed view of an [`AnalyzeRequest`].
#[derive(Debug)]
struct AnalyzeParams {
    country: String,
    ngram_range: (usize, usize),
    min_df: usize,
    top_k: usize,
    weights: Weights,
    cutoffs: RecencyCutoffs,
    source: ReviewSource,
}

#[derive(Debug)]
enum ReviewSource {
    Override(Vec<RawReview>),
    Collect { app_id: String, limit: usize },
}

impl AnalyzeRequest {
    fn validate(&self) -> Result<AnalyzeParams, PipelineError> {
        let country = validate_country_code(&self.country)?;

        if self.sentiment_model != SentimentScorer::MODEL {
            return Err(PipelineError::validation(format!(
                "unsupported sentiment_model '{}', expected '{}'",
                self.sentiment_model,
                SentimentScorer::MODEL
            )));
        }

        let ngram_range = match self.ngram_range.as_slice() {
            &[lo, hi] if lo >= 1 && lo <= hi && hi <= MAX_NGRAM => (lo, hi),
            other => {
                return Err(PipelineError::validation(format!(
                    "ngram_range must be [min, max] with 1 <= min <= max <= {MAX_NGRAM}, got {other:?}"
                )))
            }
        };

        if self.min_df == 0 {
            return Err(PipelineError::validation("min_df must be at least 1"));
        }
        if !(1..=MAX_TOP_K).contains(&self.top_k_phrases) {
            return Err(PipelineError::validation(format!(
                "top_k_phrases must be between 1 and {MAX_TOP_K}, got {}",
                self.top_k_phrases
            )));
        }
        if !(self.weights.text.is_finite() && self.weights.stars.is_finite()) {
            return Err(PipelineError::validation("weights must be finite numbers"));
        }

        let cutoffs = match self.recency_cutoffs_days.as_slice() {
            &[recent, stale] if (0..=stale).contains(&recent) => {
                RecencyCutoffs { recent, stale }
            }
            other => {
                return Err(PipelineError::validation(format!(
                    "recency_cutoffs_days must be [recent, stale] with 0 <= recent <= stale, got {other:?}"
                )))
            }
        };

        let source = match self.reviews_override.as_deref() {
            Some(records) if !records.is_empty() => {
                ReviewSource::Override(parse_override(records)?)
            }
            _ => ReviewSource::Collect {
                app_id: clean_app_id(&self.app_id)?,
                limit: validate_review_limit(self.review_limit)?,
            },
        };

        Ok(AnalyzeParams {
            country,
            ngram_range,
            min_df: self.min_df,
            top_k: self.top_k_phrases,
            weights: self.weights,
            cutoffs,
            source,
        })
    }
}

/// Reads caller-supplied review records, requiring a star rating in `1..=5`.
fn parse_override(records: &[serde_json::Value]) -> Result<Vec<RawReview>, PipelineError> {
    records
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let review: RawReview = serde_json::from_value(value.clone()).map_err(|e| {
                PipelineError::validation(format!("reviews_override[{i}] is not a review: {e}"))
            })?;
            if !(1..=5).contains(&review.rating) {
                return Err(PipelineError::validation(format!(
                    "reviews_override[{i}] rating must be between 1 and 5"
                )));
            }
            Ok(review)
        })
        .collect()
}

impl ReviewPipeline {
    /// Scores reviews, extracts phrases from the negative ones, and maps the
    /// strongest phrases to prioritized insights.
    ///
    /// Reviews come from `reviews_override` when it is non-empty, otherwise
    /// from the catalog feed. With an override the `app_id` is echoed as-is.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for bad parameters, before any request.
    /// - [`PipelineError::NotFound`] when the feed has no reviews.
    /// - [`PipelineError::Upstream`] when the first feed page fails.
    pub async fn analyze(&self, req: &AnalyzeRequest) -> Result<AnalyzeReport, PipelineError> {
        let started = Instant::now();
        let params = req.validate()?;

        let (app_id, reviews) = match params.source {
            ReviewSource::Override(reviews) => (req.app_id.clone(), reviews),
            ReviewSource::Collect { app_id, limit } => {
                let batch = self.collect_reviews(&app_id, &params.country, limit).await?;
                (app_id, batch.items)
            }
        };

        let thresholds = Thresholds::default();
        let analysis = analyze_sentiment(&self.scorer, &reviews, params.weights, thresholds);
        let negatives = negative_reviews(&reviews, &analysis.scores, thresholds);
        let phrases =
            extract_negative_phrases(&negatives, params.ngram_range, params.min_df, params.top_k);
        let insights =
            self.mapper
                .generate_insights(&phrases, &negatives, params.cutoffs, chrono::Utc::now());

        tracing::info!(
            app_id = %app_id,
            country = %params.country,
            analyzed = reviews.len(),
            negatives = negatives.len(),
            phrases = phrases.len(),
            "analysis finished"
        );

        Ok(AnalyzeReport {
            status: "ok",
            meta: AnalyzeMeta {
                app_id,
                country: params.country,
                analyzed: reviews.len(),
                processing_time_ms: elapsed_ms(started),
            },
            sentiment_overview: analysis.overview,
            debug: DebugInfo {
                model: SentimentScorer::MODEL,
                thresholds,
                low_sample: reviews.len() < LOW_SAMPLE_THRESHOLD,
                no_negative_signal: negatives.is_empty(),
            },
            top_negative_phrases: phrases,
            insights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> AnalyzeRequest {
        serde_json::from_value(body).unwrap()
    }

    fn message(err: PipelineError) -> String {
        assert_eq!(err.code(), "validation_error");
        err.to_string()
    }

    #[test]
    fn defaults_validate() {
        let params = request(json!({"app_id": "1566419183"})).validate().unwrap();
        assert_eq!(params.country, "us");
        assert_eq!(params.ngram_range, (1, 2));
        assert_eq!(params.min_df, 2);
        assert_eq!(params.top_k, 20);
        assert_eq!(params.cutoffs, RecencyCutoffs::default());
        assert!(matches!(
            params.source,
            ReviewSource::Collect { ref app_id, limit: 300 } if app_id == "1566419183"
        ));
    }

    #[test]
    fn for_app_matches_serde_defaults() {
        let built = AnalyzeRequest::for_app("1566419183");
        let parsed = request(json!({"app_id": "1566419183"}));
        assert_eq!(built.ngram_range, parsed.ngram_range);
        assert_eq!(built.recency_cutoffs_days, parsed.recency_cutoffs_days);
        assert_eq!(built.sentiment_model, parsed.sentiment_model);
    }

    #[test]
    fn rejects_unknown_model() {
        let err = request(json!({"app_id": "1566419183", "sentiment_model": "bert"}))
            .validate()
            .unwrap_err();
        assert!(message(err).contains("sentiment_model"));
    }

    #[test]
    fn rejects_bad_ngram_ranges() {
        for range in [json!([0, 2]), json!([2, 1]), json!([1, 4]), json!([1])] {
            let err = request(json!({"app_id": "1566419183", "ngram_range": range}))
                .validate()
                .unwrap_err();
            assert!(message(err).contains("ngram_range"));
        }
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        let cases = [
            (json!({"app_id": "1566419183", "min_df": 0}), "min_df"),
            (json!({"app_id": "1566419183", "top_k_phrases": 0}), "top_k_phrases"),
            (json!({"app_id": "1566419183", "top_k_phrases": 101}), "top_k_phrases"),
            (json!({"app_id": "1566419183", "review_limit": 0}), "review_limit"),
            (json!({"app_id": "1566419183", "review_limit": 2001}), "review_limit"),
            (
                json!({"app_id": "1566419183", "recency_cutoffs_days": [365, 90]}),
                "recency_cutoffs_days",
            ),
            (
                json!({"app_id": "1566419183", "recency_cutoffs_days": [30]}),
                "recency_cutoffs_days",
            ),
        ];
        for (body, field) in cases {
            let err = request(body).validate().unwrap_err();
            assert!(message(err).contains(field), "expected {field} error");
        }
    }

    #[test]
    fn bad_country_rejected_even_with_override() {
        let err = request(json!({
            "app_id": "anything",
            "country": "usa",
            "reviews_override": [{"reviewId": "1", "rating": 1, "content": "bad"}]
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn override_skips_app_id_validation() {
        let params = request(json!({
            "app_id": "not-an-id",
            "reviews_override": [{"reviewId": "1", "rating": 2, "title": "Meh"}]
        }))
        .validate()
        .unwrap();
        match params.source {
            ReviewSource::Override(reviews) => {
                assert_eq!(reviews.len(), 1);
                assert_eq!(reviews[0].rating, 2);
            }
            ReviewSource::Collect { .. } => panic!("expected override source"),
        }
    }

    #[test]
    fn empty_override_falls_back_to_collection() {
        let err = request(json!({"app_id": "not-an-id", "reviews_override": []}))
            .validate()
            .unwrap_err();
        assert!(message(err).contains("numeric"));
    }

    #[test]
    fn override_records_need_a_rating() {
        let err = request(json!({
            "app_id": "x",
            "reviews_override": [{"reviewId": "1", "content": "no stars"}]
        }))
        .validate()
        .unwrap_err();
        assert!(message(err).contains("reviews_override[0]"));

        let err = request(json!({
            "app_id": "x",
            "reviews_override": [{"reviewId": "1", "rating": "five"}]
        }))
        .validate()
        .unwrap_err();
        assert!(message(err).contains("reviews_override[0]"));
    }
}
