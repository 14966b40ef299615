//! Review analysis for storelytics.
//!
//! Normalizes review text, scores sentiment with a lexicon model blended with
//! star ratings, mines salient phrases from negative reviews, and turns them
//! into ranked product insights. [`ReviewPipeline`] composes these stages with
//! the catalog client into the collect-and-preprocess and analyze operations.

pub mod error;
pub mod insights;
pub mod phrases;
pub mod pipeline;
pub mod scorer;
pub mod sentiment;
pub mod text;
pub mod types;

mod stopwords;
mod tfidf;

pub use error::PipelineError;
pub use insights::InsightMapper;
pub use phrases::extract_negative_phrases;
pub use pipeline::{
    AnalyzeReport, AnalyzeRequest, CollectReport, CollectRequest, PipelineSettings,
    ReviewPipeline,
};
pub use scorer::SentimentScorer;
pub use sentiment::{analyze_sentiment, negative_reviews, SentimentAnalysis};
pub use text::{clean_text, detect_language, summarize_stars, tokenize_en};
pub use types::{
    Classification, Impact, Insight, NegativePhrase, RecencyCutoffs, ScoredReview,
    SentimentOverview, Thresholds, Weights,
};
