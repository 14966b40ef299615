//! Combined text-and-star sentiment for a batch of reviews.

use storelytics_core::RawReview;

use crate::scorer::SentimentScorer;
use crate::types::{round_to, Classification, ScoredReview, SentimentOverview, Thresholds, Weights};

/// Per-review scores and classes, in input order, plus the batch overview.
#[derive(Debug, Clone, Default)]
pub struct SentimentAnalysis {
    pub scores: Vec<f64>,
    pub classifications: Vec<Classification>,
    pub overview: SentimentOverview,
}

/// Scores every review as `weights.text * polarity + weights.stars * (rating - 3) / 2`
/// and classifies it against `thresholds`.
///
/// An empty batch yields an all-zero overview.
#[must_use]
pub fn analyze_sentiment(
    scorer: &SentimentScorer,
    reviews: &[RawReview],
    weights: Weights,
    thresholds: Thresholds,
) -> SentimentAnalysis {
    let mut scores = Vec::with_capacity(reviews.len());
    let mut classifications = Vec::with_capacity(reviews.len());

    for review in reviews {
        let text = review.full_text();
        let text_score = if text.trim().is_empty() {
            0.0
        } else {
            scorer.polarity(&text)
        };
        let star_score = (f64::from(review.rating) - 3.0) / 2.0;
        let combined = weights.text * text_score + weights.stars * star_score;

        scores.push(combined);
        classifications.push(thresholds.classify(combined));
    }

    let overview = overview(reviews, &classifications);
    SentimentAnalysis {
        scores,
        classifications,
        overview,
    }
}

/// Reviews whose combined score is below `thresholds.neg` **or** whose
/// rating is 2 stars or fewer.
///
/// The rating clause catches low-star reviews whose text the lexicon cannot
/// read, such as non-English content. `scores` pairs with `reviews` by index.
#[must_use]
pub fn negative_reviews(
    reviews: &[RawReview],
    scores: &[f64],
    thresholds: Thresholds,
) -> Vec<ScoredReview> {
    reviews
        .iter()
        .zip(scores)
        .filter(|&(review, &score)| score < thresholds.neg || review.rating <= 2)
        .map(|(review, &score)| ScoredReview {
            review: review.clone(),
            sentiment_score: score,
            classification: thresholds.classify(score),
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn overview(reviews: &[RawReview], classes: &[Classification]) -> SentimentOverview {
    if classes.is_empty() {
        return SentimentOverview::default();
    }
    let total = classes.len() as f64;
    let share = |class: Classification| {
        round_to(classes.iter().filter(|&&c| c == class).count() as f64 / total, 3)
    };
    let star_sum: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();

    SentimentOverview {
        pos: share(Classification::Pos),
        neu: share(Classification::Neu),
        neg: share(Classification::Neg),
        mean_star: round_to(star_sum / total, 2),
    }
}
