//! Turns ranked negative phrases into prioritized, actionable insights.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::types::{Impact, Insight, NegativePhrase, RecencyCutoffs, ScoredReview};

/// At most this many phrases become insights.
const MAX_INSIGHTS: usize = 5;

const AD_ACTION: &str = "Reduce interstitial frequency, add ad-free plan";
const PRICING_ACTION: &str = "Open basic features, add free trial, transparent pricing";
const STABILITY_ACTION: &str = "Bug fixes, crash reporting, canary releases";
const PERFORMANCE_ACTION: &str = "Performance optimization, caching improvements";
const FEATURE_ACTION: &str = "Add/improve key features, conduct UX testing";
const USABILITY_ACTION: &str = "Improve UX, conduct usability testing";

const DEFAULT_AREA: &str = "General";
const DEFAULT_ACTION: &str = "Investigate the issue, gather additional information";

/// Keyword → (area, action). Matched by substring against the phrase; the
/// first hit in this order wins, so order is significant.
const MAPPING_RULES: &[(&str, &str, &str)] = &[
    ("ad", "Monetization", AD_ACTION),
    ("ads", "Monetization", AD_ACTION),
    ("advert", "Monetization", AD_ACTION),
    ("advertisement", "Monetization", AD_ACTION),
    ("pay", "Pricing/IAP", PRICING_ACTION),
    ("paywall", "Pricing/IAP", PRICING_ACTION),
    ("unlock", "Pricing/IAP", PRICING_ACTION),
    ("purchase", "Pricing/IAP", PRICING_ACTION),
    ("locked", "Pricing/IAP", PRICING_ACTION),
    ("subscribe", "Pricing/IAP", PRICING_ACTION),
    ("subscription", "Pricing/IAP", PRICING_ACTION),
    ("bug", "Quality", STABILITY_ACTION),
    ("crash", "Quality", STABILITY_ACTION),
    ("freeze", "Quality", STABILITY_ACTION),
    ("lag", "Quality", STABILITY_ACTION),
    ("slow", "Quality", PERFORMANCE_ACTION),
    ("glitch", "Quality", STABILITY_ACTION),
    ("write", "Core UX", FEATURE_ACTION),
    ("space", "Core UX", FEATURE_ACTION),
    ("feature", "Core UX", FEATURE_ACTION),
    ("missing", "Core UX", FEATURE_ACTION),
    ("diary", "Core UX", FEATURE_ACTION),
    ("interface", "Core UX", USABILITY_ACTION),
    ("design", "Core UX", USABILITY_ACTION),
];

#[derive(Debug, Clone, Copy)]
struct MappingRule {
    keyword: &'static str,
    area: &'static str,
    action: &'static str,
}

/// Keyword table for areas and actions. Build once and share.
#[derive(Debug, Clone)]
pub struct InsightMapper {
    rules: Vec<MappingRule>,
}

impl Default for InsightMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightMapper {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: MAPPING_RULES
                .iter()
                .map(|&(keyword, area, action)| MappingRule {
                    keyword,
                    area,
                    action,
                })
                .collect(),
        }
    }

    /// Area and action for `phrase`, or the generic pair when no keyword
    /// occurs in it.
    #[must_use]
    pub fn map_phrase(&self, phrase: &str) -> (&'static str, &'static str) {
        let lowered = phrase.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lowered.contains(rule.keyword))
            .map_or((DEFAULT_AREA, DEFAULT_ACTION), |rule| {
                (rule.area, rule.action)
            })
    }

    /// Builds up to five insights from the leading `phrases`, in their given
    /// order.
    ///
    /// Impact comes from `severity = frequency * strength * recency`:
    /// - frequency: share of `negatives` whose serialized record contains the
    ///   phrase (case-insensitive),
    /// - strength: mean absolute sentiment score of those reviews,
    /// - recency: mean per-review weight from `cutoffs`, measured from `now`;
    ///   missing or unparseable timestamps weigh 1.0.
    #[must_use]
    pub fn generate_insights(
        &self,
        phrases: &[NegativePhrase],
        negatives: &[ScoredReview],
        cutoffs: RecencyCutoffs,
        now: DateTime<Utc>,
    ) -> Vec<Insight> {
        let haystacks: Vec<String> = negatives
            .iter()
            .map(|r| {
                serde_json::to_string(r)
                    .unwrap_or_else(|_| r.review.full_text())
                    .to_lowercase()
            })
            .collect();

        phrases
            .iter()
            .take(MAX_INSIGHTS)
            .enumerate()
            .map(|(i, phrase)| {
                let severity = severity(&phrase.phrase, negatives, &haystacks, cutoffs, now);
                let (area, action) = self.map_phrase(&phrase.phrase);
                Insight {
                    priority: i + 1,
                    area: area.to_owned(),
                    issue: phrase.phrase.clone(),
                    why: format!(
                        "{:.0}% negative sentiment; strong negative sentiment; recent reviews",
                        phrase.share_neg * 100.0
                    ),
                    action: action.to_owned(),
                    impact: Impact::from_severity(severity),
                }
            })
            .collect()
    }
}

#[allow(clippy::cast_precision_loss)]
fn severity(
    phrase: &str,
    negatives: &[ScoredReview],
    haystacks: &[String],
    cutoffs: RecencyCutoffs,
    now: DateTime<Utc>,
) -> f64 {
    if negatives.is_empty() {
        return 0.0;
    }
    let needle = phrase.to_lowercase();
    let matching: Vec<&ScoredReview> = negatives
        .iter()
        .zip(haystacks)
        .filter(|(_, hay)| hay.contains(needle.as_str()))
        .map(|(review, _)| review)
        .collect();
    if matching.is_empty() {
        return 0.0;
    }

    let n = matching.len() as f64;
    let frequency = n / negatives.len() as f64;
    let strength = matching.iter().map(|r| r.sentiment_score.abs()).sum::<f64>() / n;
    let recency = matching
        .iter()
        .map(|r| recency_weight(r.review.updated.as_deref(), cutoffs, now))
        .sum::<f64>()
        / n;

    frequency * strength * recency
}

fn recency_weight(updated: Option<&str>, cutoffs: RecencyCutoffs, now: DateTime<Utc>) -> f64 {
    match updated.and_then(parse_timestamp) {
        Some(at) => cutoffs.weight((now - at).num_days()),
        None => 1.0,
    }
}

/// RFC 3339 first, then common naive layouts read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Classification;
    use chrono::TimeZone;
    use storelytics_core::RawReview;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn negative(id: &str, content: &str, score: f64, updated: Option<&str>) -> ScoredReview {
        ScoredReview {
            review: RawReview {
                review_id: id.to_string(),
                rating: 1,
                title: None,
                content: Some(content.to_string()),
                updated: updated.map(str::to_string),
                version: None,
                author: None,
            },
            sentiment_score: score,
            classification: Classification::Neg,
        }
    }

    fn phrase(text: &str, share_neg: f64) -> NegativePhrase {
        NegativePhrase {
            phrase: text.to_string(),
            score: 1.0,
            count: 1,
            share_neg,
        }
    }

    #[test]
    fn empty_inputs_yield_no_insights() {
        let mapper = InsightMapper::new();
        assert!(mapper
            .generate_insights(&[], &[], RecencyCutoffs::default(), now())
            .is_empty());
    }

    #[test]
    fn mapping_follows_table_order() {
        let mapper = InsightMapper::new();
        assert_eq!(mapper.map_phrase("too many ads").0, "Monetization");
        // "pay" precedes "subscription" but "ad" precedes both.
        assert_eq!(mapper.map_phrase("subscription upgrade").0, "Monetization");
        assert_eq!(mapper.map_phrase("paywall"), ("Pricing/IAP", PRICING_ACTION));
        assert_eq!(mapper.map_phrase("slow sync"), ("Quality", PERFORMANCE_ACTION));
        assert_eq!(mapper.map_phrase("Interface"), ("Core UX", USABILITY_ACTION));
        assert_eq!(mapper.map_phrase("login"), (DEFAULT_AREA, DEFAULT_ACTION));
    }

    #[test]
    fn at_most_five_insights_with_ranked_priorities() {
        let mapper = InsightMapper::new();
        let phrases: Vec<NegativePhrase> = ["crash", "ads", "slow", "login", "sync", "export"]
            .iter()
            .map(|p| phrase(p, 0.5))
            .collect();
        let negatives = vec![negative("1", "crash ads slow login sync export", -0.8, None)];
        let insights =
            mapper.generate_insights(&phrases, &negatives, RecencyCutoffs::default(), now());
        assert_eq!(insights.len(), 5);
        let priorities: Vec<usize> = insights.iter().map(|i| i.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3, 4, 5]);
        assert_eq!(insights[0].issue, "crash");
        assert_eq!(insights[0].area, "Quality");
        assert_eq!(
            insights[0].why,
            "50% negative sentiment; strong negative sentiment; recent reviews"
        );
    }

    #[test]
    fn impact_reflects_frequency_strength_and_recency() {
        let mapper = InsightMapper::new();
        let negatives = vec![
            negative("1", "constant crash", -0.9, Some("2024-05-20T10:00:00-07:00")),
            negative("2", "crash on start", -0.7, Some("not a date")),
            negative("3", "slow sync", -0.3, Some("2022-01-01T00:00:00Z")),
        ];
        let phrases = vec![phrase("crash", 0.667), phrase("slow", 0.333)];
        let insights =
            mapper.generate_insights(&phrases, &negatives, RecencyCutoffs::default(), now());

        // crash: 2/3 * 0.8 * 1.0 = 0.533
        assert_eq!(insights[0].impact, Impact::High);
        // slow: 1/3 * 0.3 * 0.5 = 0.05
        assert_eq!(insights[1].impact, Impact::Low);
    }

    #[test]
    fn recency_weight_parses_several_layouts() {
        let cutoffs = RecencyCutoffs::default();
        assert!((recency_weight(Some("2024-05-01T00:00:00Z"), cutoffs, now()) - 1.0).abs() < 1e-12);
        assert!((recency_weight(Some("2023-12-01 08:30:00"), cutoffs, now()) - 0.7).abs() < 1e-12);
        assert!((recency_weight(Some("2021-01-01"), cutoffs, now()) - 0.5).abs() < 1e-12);
        assert!((recency_weight(Some("yesterday"), cutoffs, now()) - 1.0).abs() < 1e-12);
        assert!((recency_weight(None, cutoffs, now()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unmatched_phrase_has_low_impact() {
        let mapper = InsightMapper::new();
        let negatives = vec![negative("1", "battery drain", -0.9, None)];
        let insights = mapper.generate_insights(
            &[phrase("paywall", 0.0)],
            &negatives,
            RecencyCutoffs::default(),
            now(),
        );
        assert_eq!(insights[0].impact, Impact::Low);
        assert_eq!(insights[0].why, "0% negative sentiment; strong negative sentiment; recent reviews");
    }
}
