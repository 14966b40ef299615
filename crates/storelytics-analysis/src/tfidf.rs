//! Corpus TF-IDF over word n-grams.
//!
//! Tokens are runs of two or more word characters, lowercased. Stop words are
//! removed before n-grams are formed, so `"too many ads"` contributes only
//! `"ads"`. Weights use raw term counts, smoothed idf
//! `ln((1 + n) / (1 + df)) + 1`, and L2 normalization per document.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::stopwords::is_stop_word;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid word regex"));

pub(crate) struct TfidfVectorizer {
    pub ngram_range: (usize, usize),
    /// Absolute minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Keep at most this many terms, by total count across the corpus.
    pub max_features: usize,
}

impl TfidfVectorizer {
    /// Scores every retained term by the sum of its normalized weights over
    /// all documents, highest first, ties broken alphabetically.
    ///
    /// Returns `None` when no term survives stop-word and frequency pruning.
    pub fn corpus_scores(&self, documents: &[String]) -> Option<Vec<(String, f64)>> {
        let counts: Vec<HashMap<String, usize>> =
            documents.iter().map(|doc| self.term_counts(doc)).collect();

        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut total_freq: HashMap<&str, usize> = HashMap::new();
        for doc in &counts {
            for (term, &count) in doc {
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
                *total_freq.entry(term.as_str()).or_insert(0) += count;
            }
        }

        let mut vocabulary: Vec<&str> = doc_freq
            .iter()
            .filter(|&(_, &df)| df >= self.min_df)
            .map(|(&term, _)| term)
            .collect();
        if vocabulary.is_empty() {
            return None;
        }
        vocabulary.sort_unstable();
        if vocabulary.len() > self.max_features {
            vocabulary.sort_by(|a, b| total_freq[b].cmp(&total_freq[a]).then_with(|| a.cmp(b)));
            vocabulary.truncate(self.max_features);
        }

        #[allow(clippy::cast_precision_loss)]
        let n_docs = documents.len() as f64;
        let idf: HashMap<&str, f64> = vocabulary
            .iter()
            .map(|&term| {
                #[allow(clippy::cast_precision_loss)]
                let df = doc_freq[term] as f64;
                (term, ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0)
            })
            .collect();

        let mut scores: HashMap<&str, f64> = HashMap::new();
        for doc in &counts {
            let weights: Vec<(&str, f64)> = doc
                .iter()
                .filter_map(|(term, &count)| {
                    #[allow(clippy::cast_precision_loss)]
                    let tf = count as f64;
                    idf.get(term.as_str()).map(|w| (term.as_str(), tf * w))
                })
                .collect();
            let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm == 0.0 {
                continue;
            }
            for (term, w) in weights {
                *scores.entry(term).or_insert(0.0) += w / norm;
            }
        }

        let mut ranked: Vec<(String, f64)> = vocabulary
            .iter()
            .map(|&term| (term.to_owned(), scores.get(term).copied().unwrap_or(0.0)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Some(ranked)
    }

    fn term_counts(&self, document: &str) -> HashMap<String, usize> {
        let lowered = document.to_lowercase();
        let tokens: Vec<&str> = WORD_RE
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !is_stop_word(t))
            .collect();

        let (lo, hi) = self.ngram_range;
        let mut counts = HashMap::new();
        for n in lo.max(1)..=hi {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                *counts.entry(window.join(" ")).or_insert(0) += 1;
            }
        }
        counts
    }
}
