//! Lexicon-based polarity scorer in the style of VADER.
//!
//! Word valences live on a `-4..=4` scale. Each sentiment-bearing word is
//! adjusted by preceding intensifiers and negations, the clause after "but"
//! outweighs the clause before it, and exclamation marks, question marks and
//! ALL-CAPS emphasis amplify the total. The sum is squashed into `[-1, 1]`
//! with `x / sqrt(x² + 15)`.
//!
//! The word table covers common app-review vocabulary rather than the full
//! VADER lexicon. Words outside it score zero, so low-star reviews are still
//! flagged negative by their rating.

use std::collections::{HashMap, HashSet};

/// Word valences. Keys are lowercase single words.
const LEXICON: &[(&str, f64)] = &[
    // Positive
    ("amazing", 2.8),
    ("amazingly", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("better", 1.9),
    ("brilliant", 2.8),
    ("calm", 1.3),
    ("clean", 1.7),
    ("convenient", 1.5),
    ("cool", 1.3),
    ("easy", 1.9),
    ("efficient", 1.8),
    ("enjoy", 2.2),
    ("enjoyable", 1.9),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("excited", 1.4),
    ("fabulous", 2.4),
    ("fantastic", 2.6),
    ("fast", 1.1),
    ("favorite", 2.0),
    ("fine", 0.8),
    ("flawless", 2.3),
    ("free", 2.3),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("handy", 1.4),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("ideal", 2.4),
    ("impressive", 2.3),
    ("intuitive", 1.6),
    ("lifesaver", 2.4),
    ("like", 1.5),
    ("liked", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("loves", 2.7),
    ("nice", 1.8),
    ("ok", 1.2),
    ("okay", 0.9),
    ("outstanding", 3.0),
    ("perfect", 2.7),
    ("perfectly", 3.2),
    ("pleasant", 2.3),
    ("pleased", 1.9),
    ("recommend", 1.5),
    ("recommended", 1.5),
    ("reliable", 1.7),
    ("satisfied", 1.8),
    ("seamless", 1.8),
    ("smooth", 1.2),
    ("solid", 1.4),
    ("stable", 1.2),
    ("super", 2.9),
    ("superb", 3.1),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("useful", 1.9),
    ("well", 1.1),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("worth", 0.9),
    ("yes", 1.7),
    // Negative
    ("annoyed", -1.6),
    ("annoying", -1.9),
    ("awful", -2.0),
    ("bad", -2.5),
    ("boring", -1.3),
    ("broke", -1.8),
    ("broken", -2.1),
    ("bug", -1.5),
    ("buggy", -1.9),
    ("bugs", -1.5),
    ("cheat", -2.0),
    ("clunky", -1.3),
    ("complain", -1.5),
    ("confusing", -1.3),
    ("crap", -1.6),
    ("crash", -1.7),
    ("crashed", -1.8),
    ("crashes", -1.7),
    ("crashing", -1.8),
    ("damn", -1.7),
    ("delete", -0.8),
    ("deleted", -1.0),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("disappointment", -2.3),
    ("disgusting", -2.4),
    ("dislike", -1.6),
    ("dreadful", -2.7),
    ("error", -1.7),
    ("errors", -1.4),
    ("expensive", -0.9),
    ("fail", -2.5),
    ("failed", -2.3),
    ("fails", -1.8),
    ("failure", -2.3),
    ("fake", -2.1),
    ("fraud", -2.8),
    ("freezes", -1.4),
    ("frustrated", -2.1),
    ("frustrating", -1.9),
    ("garbage", -2.0),
    ("glitch", -1.3),
    ("glitches", -1.3),
    ("glitchy", -1.4),
    ("greedy", -1.3),
    ("hate", -2.7),
    ("hated", -3.2),
    ("hates", -1.9),
    ("horrendous", -2.8),
    ("horrible", -2.5),
    ("infuriating", -2.5),
    ("irritating", -2.0),
    ("issue", -0.6),
    ("issues", -0.7),
    ("joke", -0.8),
    ("junk", -1.6),
    ("lag", -1.0),
    ("laggy", -1.2),
    ("lame", -1.8),
    ("lost", -1.3),
    ("lousy", -2.5),
    ("mediocre", -1.0),
    ("mess", -1.5),
    ("misleading", -1.7),
    ("nightmare", -2.7),
    ("no", -1.2),
    ("overpriced", -1.5),
    ("pathetic", -2.4),
    ("pointless", -1.7),
    ("poor", -2.1),
    ("problem", -1.7),
    ("problems", -1.7),
    ("refund", -0.5),
    ("ridiculous", -1.5),
    ("rip", -1.3),
    ("rip-off", -2.2),
    ("ripoff", -2.2),
    ("rubbish", -1.8),
    ("sad", -2.1),
    ("scam", -2.4),
    ("shame", -2.1),
    ("slow", -1.2),
    ("spam", -1.5),
    ("stuck", -1.0),
    ("stupid", -2.4),
    ("sucked", -2.0),
    ("sucks", -1.5),
    ("terrible", -2.1),
    ("trash", -1.8),
    ("ugly", -2.3),
    ("unable", -1.6),
    ("uninstall", -1.4),
    ("uninstalled", -1.4),
    ("uninstalling", -1.4),
    ("unreliable", -1.9),
    ("unresponsive", -1.5),
    ("unusable", -2.0),
    ("upset", -1.6),
    ("useless", -1.8),
    ("waste", -1.8),
    ("wasted", -2.2),
    ("worse", -2.1),
    ("worst", -3.1),
    ("worthless", -1.9),
    ("wrong", -2.1),
];

/// Intensifiers (positive) and dampeners (negative).
const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", B_INCR),
    ("completely", B_INCR),
    ("deeply", B_INCR),
    ("enormously", B_INCR),
    ("entirely", B_INCR),
    ("especially", B_INCR),
    ("exceptionally", B_INCR),
    ("extremely", B_INCR),
    ("fully", B_INCR),
    ("greatly", B_INCR),
    ("highly", B_INCR),
    ("hugely", B_INCR),
    ("incredibly", B_INCR),
    ("intensely", B_INCR),
    ("more", B_INCR),
    ("most", B_INCR),
    ("particularly", B_INCR),
    ("purely", B_INCR),
    ("quite", B_INCR),
    ("really", B_INCR),
    ("remarkably", B_INCR),
    ("so", B_INCR),
    ("substantially", B_INCR),
    ("thoroughly", B_INCR),
    ("totally", B_INCR),
    ("tremendously", B_INCR),
    ("unbelievably", B_INCR),
    ("utterly", B_INCR),
    ("very", B_INCR),
    ("almost", B_DECR),
    ("barely", B_DECR),
    ("hardly", B_DECR),
    ("kinda", B_DECR),
    ("less", B_DECR),
    ("little", B_DECR),
    ("marginally", B_DECR),
    ("occasionally", B_DECR),
    ("partly", B_DECR),
    ("scarcely", B_DECR),
    ("slightly", B_DECR),
    ("somewhat", B_DECR),
    ("sorta", B_DECR),
];

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "didnt", "doesnt", "dont", "hadnt", "hasnt",
    "havent", "isnt", "mightnt", "mustnt", "neither", "never", "none", "nope", "nor", "not",
    "nothing", "nowhere", "shouldnt", "wasnt", "werent", "without", "wont", "wouldnt", "rarely",
    "seldom", "despite",
];

const B_INCR: f64 = 0.293;
const B_DECR: f64 = -0.293;
const CAPS_INCR: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Polarity scorer. Build once and share; scoring is read-only.
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    lexicon: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer {
    /// Name reported for this model in analysis output.
    pub const MODEL: &'static str = "vader";

    #[must_use]
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        }
    }

    /// Compound polarity of `text` in `[-1, 1]`. `0.0` for empty or
    /// sentiment-free text.
    #[must_use]
    pub fn polarity(&self, text: &str) -> f64 {
        let words: Vec<&str> = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|w| w.chars().count() > 1)
            .collect();
        if words.is_empty() {
            return 0.0;
        }
        let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

        let caps_count = words.iter().filter(|w| is_all_caps(w)).count();
        let caps_differ = caps_count > 0 && caps_count < words.len();

        let mut sentiments: Vec<f64> = Vec::with_capacity(words.len());
        for (i, word) in lowered.iter().enumerate() {
            if self.boosters.contains_key(word.as_str()) {
                sentiments.push(0.0);
                continue;
            }
            let Some(&base) = self.lexicon.get(word.as_str()) else {
                sentiments.push(0.0);
                continue;
            };

            let mut valence = base;
            if caps_differ && is_all_caps(words[i]) {
                valence += CAPS_INCR.copysign(valence);
            }

            for distance in 1..=3usize {
                let Some(j) = i.checked_sub(distance) else {
                    break;
                };
                let prior = lowered[j].as_str();
                if self.lexicon.contains_key(prior) {
                    continue;
                }
                let mut boost = self.booster_scalar(prior, words[j], valence, caps_differ);
                if distance == 2 {
                    boost *= 0.95;
                } else if distance == 3 {
                    boost *= 0.9;
                }
                valence += boost;
                if self.is_negation(prior) {
                    valence *= NEGATION_SCALAR;
                }
            }
            sentiments.push(valence);
        }

        if let Some(pivot) = lowered.iter().position(|w| w == "but") {
            for (i, s) in sentiments.iter_mut().enumerate() {
                if i < pivot {
                    *s *= 0.5;
                } else if i > pivot {
                    *s *= 1.5;
                }
            }
        }

        let mut total: f64 = sentiments.iter().sum();
        if total != 0.0 {
            total += punctuation_emphasis(text).copysign(total);
        }
        normalize(total)
    }

    fn booster_scalar(&self, lowered: &str, original: &str, valence: f64, caps_differ: bool) -> f64 {
        let Some(&scalar) = self.boosters.get(lowered) else {
            return 0.0;
        };
        let mut scalar = if valence < 0.0 { -scalar } else { scalar };
        if caps_differ && is_all_caps(original) {
            scalar += CAPS_INCR.copysign(valence);
        }
        scalar
    }

    fn is_negation(&self, word: &str) -> bool {
        let bare = word.replace('\'', "");
        self.negations.contains(bare.as_str()) || word.ends_with("n't")
    }
}

fn is_all_caps(word: &str) -> bool {
    word.chars().any(char::is_alphabetic)
        && word
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase)
}

/// Extra magnitude from `!` (up to four) and repeated `?`.
fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(4);
    let questions = text.matches('?').count();
    #[allow(clippy::cast_precision_loss)]
    let mut emphasis = exclamations as f64 * 0.292;
    if questions > 1 {
        #[allow(clippy::cast_precision_loss)]
        let q = if questions <= 3 {
            questions as f64 * 0.18
        } else {
            0.96
        };
        emphasis += q;
    }
    emphasis
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}
