//! TF-IDF similarity tier.
//!
//! The vectorizer is fit on exactly the two strings being compared:
//! lowercased `\b\w\w+\b` tokens, stop words removed, n-grams over what
//! remains. Term weights are raw counts times smoothed idf
//! `ln((1 + n) / (1 + df)) + 1`, and each row is L2-normalized.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::stopwords::is_stop_word;
use super::{SimilarityBackend, SimilarityTier};
use crate::error::{Error, Result};

const TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// A small dense TF-IDF vectorizer.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    token_pattern: Regex,
    ngram_range: (usize, usize),
    stop_words: bool,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
}

impl TfIdfVectorizer {
    /// Unigrams and bigrams with English stop words removed.
    pub fn new() -> Result<Self> {
        Self::with_config((1, 2), true)
    }

    /// Vectorizer with a custom n-gram range.
    pub fn with_config(ngram_range: (usize, usize), stop_words: bool) -> Result<Self> {
        let (min_n, max_n) = ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::Similarity(format!(
                "invalid n-gram range ({}, {})",
                min_n, max_n
            )));
        }
        Ok(Self {
            token_pattern: Regex::new(TOKEN_PATTERN)?,
            ngram_range,
            stop_words,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        })
    }

    /// Terms learned by the last fit, in column order.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }

    /// Number of learned terms.
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Split a document into its n-gram terms.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words || !is_stop_word(t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Learn vocabulary and idf from `documents`, returning their L2-normalized rows.
    pub fn fit_transform(&mut self, documents: &[&str]) -> Result<Vec<Vec<f32>>> {
        let analyzed: Vec<Vec<String>> = documents.iter().map(|d| self.analyze(d)).collect();

        let mut vocabulary = BTreeMap::new();
        for term in analyzed.iter().flatten() {
            vocabulary.entry(term.clone()).or_insert(0usize);
        }
        if vocabulary.is_empty() {
            return Err(Error::EmptyVocabulary);
        }
        for (column, index) in vocabulary.values_mut().enumerate() {
            *index = column;
        }

        let mut df = vec![0usize; vocabulary.len()];
        for terms in &analyzed {
            let mut seen = vec![false; vocabulary.len()];
            for term in terms {
                if let Some(&column) = vocabulary.get(term) {
                    if !seen[column] {
                        seen[column] = true;
                        df[column] += 1;
                    }
                }
            }
        }

        let n = documents.len() as f32;
        self.idf = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0)
            .collect();
        self.vocabulary = vocabulary;

        Ok(analyzed.iter().map(|terms| self.row(terms)).collect())
    }

    fn row(&self, terms: &[String]) -> Vec<f32> {
        let mut row = vec![0.0f32; self.vocabulary.len()];
        for term in terms {
            if let Some(&column) = self.vocabulary.get(term) {
                row[column] += 1.0;
            }
        }
        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|v| *v /= norm);
        }
        row
    }
}

/// TF-IDF cosine similarity over the two compared strings.
///
/// Keeps one vectorizer and refits it per comparison. The cache lock makes
/// the backend safe to share between threads.
#[derive(Debug)]
pub struct TfIdfBackend {
    cached: Mutex<Option<TfIdfVectorizer>>,
    ngram_range: (usize, usize),
    stop_words: bool,
}

impl TfIdfBackend {
    /// Backend with unigrams, bigrams and stop-word removal.
    pub fn new() -> Self {
        Self::with_config((1, 2), true)
    }

    pub fn with_config(ngram_range: (usize, usize), stop_words: bool) -> Self {
        Self {
            cached: Mutex::new(None),
            ngram_range,
            stop_words,
        }
    }
}

impl Default for TfIdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityBackend for TfIdfBackend {
    fn tier(&self) -> SimilarityTier {
        SimilarityTier::TfIdf
    }

    fn score(&self, a: &str, b: &str) -> Result<f32> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| Error::Similarity("vectorizer cache lock poisoned".to_string()))?;

        let mut vectorizer = match cached.take() {
            Some(v) => v,
            None => TfIdfVectorizer::with_config(self.ngram_range, self.stop_words)?,
        };

        let rows = vectorizer.fit_transform(&[a, b]);
        *cached = Some(vectorizer);
        let rows = rows?;
        Ok(rows[0].iter().zip(&rows[1]).map(|(x, y)| x * y).sum())
    }
}
