//! TF-IDF vectorization over cleaned post text.
//!
//! Smoothed IDF `ln((1 + n) / (1 + df)) + 1`, raw term counts as TF, and
//! L2-normalized rows. The vocabulary is sorted by term so column order is
//! stable across runs.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use pulse_core::RankedTerm;
use regex::Regex;

use crate::error::AnalysisError;
use crate::stopwords::is_stop_word;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

/// Lower-cased tokens of two or more word characters, stop-words removed.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    min_df: usize,
    max_features: Option<usize>,
    bigrams: bool,
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TfIdfVectorizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_df: 1,
            max_features: None,
            bigrams: false,
        }
    }

    /// Minimum number of documents a term must appear in.
    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df.max(1);
        self
    }

    /// Keep only the `max` terms with the highest corpus frequency.
    #[must_use]
    pub fn with_max_features(mut self, max: usize) -> Self {
        self.max_features = Some(max);
        self
    }

    /// Add adjacent-token bigrams to the unigram vocabulary.
    #[must_use]
    pub fn with_bigrams(mut self, bigrams: bool) -> Self {
        self.bigrams = bigrams;
        self
    }

    fn terms_of(&self, text: &str) -> Vec<String> {
        let tokens = tokenize(text);
        let mut terms = tokens.clone();
        if self.bigrams {
            terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
        }
        terms
    }

    /// Learns a vocabulary from `docs` and returns their weighted rows.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyVocabulary`] when no term survives the
    /// `min_df` filter.
    pub fn fit_transform(&self, docs: &[&str]) -> Result<TfIdfMatrix, AnalysisError> {
        let doc_terms: Vec<Vec<String>> = docs.iter().map(|d| self.terms_of(d)).collect();

        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
        for terms in &doc_terms {
            let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
            for term in terms {
                *corpus_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let mut kept: Vec<&str> = doc_freq
            .iter()
            .filter(|(_, df)| **df >= self.min_df)
            .map(|(term, _)| *term)
            .collect();

        if let Some(max) = self.max_features {
            if kept.len() > max {
                kept.sort_by(|a, b| {
                    corpus_freq[b]
                        .cmp(&corpus_freq[a])
                        .then_with(|| a.cmp(b))
                });
                kept.truncate(max);
            }
        }

        if kept.is_empty() {
            return Err(AnalysisError::EmptyVocabulary {
                context: format!("{} documents at min_df {}", docs.len(), self.min_df),
            });
        }

        kept.sort_unstable();
        let terms: Vec<String> = kept.iter().map(|t| (*t).to_string()).collect();
        let index: HashMap<&str, usize> = kept.iter().enumerate().map(|(i, t)| (*t, i)).collect();

        #[allow(clippy::cast_precision_loss)]
        let n = docs.len() as f64;
        let idf: Vec<f64> = kept
            .iter()
            .map(|term| {
                #[allow(clippy::cast_precision_loss)]
                let df = doc_freq[term] as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = doc_terms
            .iter()
            .map(|doc| {
                let mut row = vec![0.0_f64; terms.len()];
                for term in doc {
                    if let Some(&col) = index.get(term.as_str()) {
                        row[col] += 1.0;
                    }
                }
                for (value, weight) in row.iter_mut().zip(&idf) {
                    *value *= weight;
                }
                let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for value in &mut row {
                        *value /= norm;
                    }
                }
                row
            })
            .collect();

        Ok(TfIdfMatrix { terms, rows })
    }
}

/// Document-term weights. One row per input document, one column per term.
#[derive(Debug, Clone, PartialEq)]
pub struct TfIdfMatrix {
    terms: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TfIdfMatrix {
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Per-term weight summed over every document.
    #[must_use]
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0_f64; self.terms.len()];
        for row in &self.rows {
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += value;
            }
        }
        sums
    }

    /// Terms by summed weight, descending; ties by term ascending.
    #[must_use]
    pub fn ranked_terms(&self, limit: usize) -> Vec<RankedTerm> {
        let mut ranked: Vec<RankedTerm> = self
            .terms
            .iter()
            .zip(self.column_sums())
            .map(|(term, score)| RankedTerm {
                term: term.clone(),
                score,
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_drops_short_tokens_and_stop_words() {
        assert_eq!(
            tokenize("The TVK rally was a big win, I think"),
            vec!["tvk", "rally", "big", "win", "think"]
        );
    }

    #[test]
    fn min_df_filters_rare_terms() {
        let docs = ["rally crowd", "rally speech", "budget plan"];
        let matrix = TfIdfVectorizer::new()
            .with_min_df(2)
            .fit_transform(&docs)
            .unwrap();
        assert_eq!(matrix.terms(), ["rally"]);
        assert_eq!(matrix.rows().len(), 3);
        assert!(matrix.rows()[2][0].abs() < f64::EPSILON);
    }

    #[test]
    fn bigrams_join_adjacent_non_stop_tokens() {
        let docs = ["youth rally today", "youth rally tomorrow"];
        let matrix = TfIdfVectorizer::new()
            .with_min_df(2)
            .with_bigrams(true)
            .fit_transform(&docs)
            .unwrap();
        assert_eq!(matrix.terms(), ["rally", "youth", "youth rally"]);
    }

    #[test]
    fn rows_are_l2_normalized() {
        let docs = ["rally rally crowd", "crowd speech"];
        let matrix = TfIdfVectorizer::new().fit_transform(&docs).unwrap();
        for row in matrix.rows() {
            let norm: f64 = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9, "norm was {norm}");
        }
    }

    #[test]
    fn max_features_keeps_most_frequent_terms() {
        let docs = ["rally rally rally crowd", "rally crowd speech", "speech budget"];
        let matrix = TfIdfVectorizer::new()
            .with_max_features(2)
            .fit_transform(&docs)
            .unwrap();
        assert_eq!(matrix.terms(), ["crowd", "rally"]);
    }

    #[test]
    fn empty_vocabulary_is_an_error() {
        let docs = ["the and of", "a an is"];
        let err = TfIdfVectorizer::new().fit_transform(&docs).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyVocabulary { .. }));
    }

    #[test]
    fn ranked_terms_break_ties_by_term() {
        let docs = ["beta alpha", "alpha beta"];
        let matrix = TfIdfVectorizer::new().fit_transform(&docs).unwrap();
        let ranked = matrix.ranked_terms(10);
        assert_eq!(ranked[0].term, "alpha");
        assert_eq!(ranked[1].term, "beta");
    }
}
