//! Salient phrase mining over the negative-review subset.

use std::collections::HashMap;

use crate::stopwords::is_stop_word;
use crate::text::clean_text;
use crate::tfidf::TfidfVectorizer;
use crate::types::{round_to, NegativePhrase, ScoredReview};

const MAX_FEATURES: usize = 1000;

/// Ranks n-gram phrases across `negatives` by aggregate TF-IDF weight.
///
/// Each review's title and content are cleaned (no emojis, lowercased) into
/// one document. The document-frequency floor relaxes to
/// `min(min_df, max(1, docs / 10))` so small samples still yield phrases.
/// The top `top_k` terms are taken, then pure numbers and single characters
/// are dropped. `count` is the number of documents containing the phrase.
///
/// When no term survives pruning, falls back to plain word frequency.
/// Empty input yields an empty list.
#[must_use]
pub fn extract_negative_phrases(
    negatives: &[ScoredReview],
    ngram_range: (usize, usize),
    min_df: usize,
    top_k: usize,
) -> Vec<NegativePhrase> {
    if negatives.is_empty() {
        return Vec::new();
    }

    let texts: Vec<String> = negatives
        .iter()
        .map(|r| clean_text(&r.review.full_text(), false, true))
        .collect();

    let effective_min_df = min_df.min((texts.len() / 10).max(1));
    let vectorizer = TfidfVectorizer {
        ngram_range,
        min_df: effective_min_df,
        max_features: MAX_FEATURES,
    };

    let Some(ranked) = vectorizer.corpus_scores(&texts) else {
        tracing::debug!(
            documents = texts.len(),
            min_df = effective_min_df,
            "empty tf-idf vocabulary, using word-frequency fallback"
        );
        return word_frequency_phrases(&texts, top_k);
    };

    #[allow(clippy::cast_precision_loss)]
    let total = negatives.len() as f64;
    ranked
        .into_iter()
        .take(top_k)
        .filter(|(phrase, _)| {
            phrase.chars().count() > 1 && !phrase.chars().all(|c| c.is_ascii_digit())
        })
        .map(|(phrase, score)| {
            let count = texts.iter().filter(|t| t.contains(phrase.as_str())).count();
            #[allow(clippy::cast_precision_loss)]
            let share_neg = round_to(count as f64 / total, 3);
            NegativePhrase {
                phrase,
                score: round_to(score, 3),
                count,
                share_neg,
            }
        })
        .collect()
}

/// Most frequent words longer than two characters that are not stop words,
/// in first-seen order among equal counts. `score` is the word's share of all
/// counted words; `count` is its occurrence count.
#[allow(clippy::cast_precision_loss)]
fn word_frequency_phrases(texts: &[String], top_k: usize) -> Vec<NegativePhrase> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for text in texts {
        for word in text.split_whitespace() {
            if word.chars().count() <= 2 || is_stop_word(word) {
                continue;
            }
            let entry = counts.entry(word).or_insert(0);
            if *entry == 0 {
                order.push(word);
            }
            *entry += 1;
        }
    }

    let total_words: usize = counts.values().sum();
    if total_words == 0 {
        return Vec::new();
    }

    order.sort_by(|a, b| counts[b].cmp(&counts[a]));

    order
        .into_iter()
        .take(top_k)
        .map(|word| {
            let count = counts[word];
            NegativePhrase {
                phrase: word.to_owned(),
                score: round_to(count as f64 / total_words as f64, 3),
                count,
                share_neg: round_to((count as f64 / texts.len() as f64).min(1.0), 3),
            }
        })
        .collect()
}
