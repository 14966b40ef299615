//! Value types shared by the scoring, phrase, and insight stages.

use serde::{Deserialize, Serialize};
use storelytics_core::RawReview;

/// Blend of lexicon polarity and star rating in the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub text: f64,
    pub stars: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            text: 0.6,
            stars: 0.4,
        }
    }
}

/// Classification cut points on the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub neg: f64,
    pub pos: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            neg: -0.2,
            pos: 0.2,
        }
    }
}

impl Thresholds {
    /// Strictly below `neg` is negative, strictly above `pos` is positive.
    #[must_use]
    pub fn classify(&self, score: f64) -> Classification {
        if score < self.neg {
            Classification::Neg
        } else if score > self.pos {
            Classification::Pos
        } else {
            Classification::Neu
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Pos,
    Neu,
    Neg,
}

/// Class proportions (3 decimals) and mean star (2 decimals).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentOverview {
    pub pos: f64,
    pub neu: f64,
    pub neg: f64,
    pub mean_star: f64,
}

/// A review with its combined sentiment score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredReview {
    #[serde(flatten)]
    pub review: RawReview,
    pub sentiment_score: f64,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativePhrase {
    pub phrase: String,
    pub score: f64,
    pub count: usize,
    /// Fraction of negative reviews containing the phrase, in `[0, 1]`.
    pub share_neg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    #[must_use]
    pub fn from_severity(severity: f64) -> Self {
        if severity > 0.5 {
            Self::High
        } else if severity > 0.2 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// 1-based, lower is more important.
    pub priority: usize,
    pub area: String,
    pub issue: String,
    pub why: String,
    pub action: String,
    pub impact: Impact,
}

/// Day boundaries for recency weighting: within `recent` days weighs 1.0,
/// within `stale` days 0.7, older 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyCutoffs {
    pub recent: i64,
    pub stale: i64,
}

impl Default for RecencyCutoffs {
    fn default() -> Self {
        Self {
            recent: 90,
            stale: 365,
        }
    }
}

impl RecencyCutoffs {
    #[must_use]
    pub fn weight(&self, days_ago: i64) -> f64 {
        if days_ago <= self.recent {
            1.0
        } else if days_ago <= self.stale {
            0.7
        } else {
            0.5
        }
    }
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_uses_strict_bounds() {
        let t = Thresholds::default();
        assert_eq!(t.classify(-0.2), Classification::Neu);
        assert_eq!(t.classify(-0.21), Classification::Neg);
        assert_eq!(t.classify(0.2), Classification::Neu);
        assert_eq!(t.classify(0.2001), Classification::Pos);
    }

    #[test]
    fn asymmetric_thresholds() {
        let t = Thresholds { neg: -0.5, pos: 0.1 };
        assert_eq!(t.classify(-0.3), Classification::Neu);
        assert_eq!(t.classify(0.15), Classification::Pos);
    }

    #[test]
    fn impact_bands() {
        assert_eq!(Impact::from_severity(0.51), Impact::High);
        assert_eq!(Impact::from_severity(0.5), Impact::Medium);
        assert_eq!(Impact::from_severity(0.2), Impact::Low);
        assert_eq!(Impact::from_severity(0.0), Impact::Low);
    }

    #[test]
    fn recency_weight_bands() {
        let c = RecencyCutoffs::default();
        assert!((c.weight(0) - 1.0).abs() < f64::EPSILON);
        assert!((c.weight(90) - 1.0).abs() < f64::EPSILON);
        assert!((c.weight(91) - 0.7).abs() < f64::EPSILON);
        assert!((c.weight(366) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn scored_review_flattens_raw_fields() {
        let scored = ScoredReview {
            review: serde_json::from_str(r#"{"reviewId":"9","rating":1,"content":"Ads"}"#).unwrap(),
            sentiment_score: -0.4,
            classification: Classification::Neg,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["reviewId"], "9");
        assert_eq!(json["classification"], "neg");
    }
}
