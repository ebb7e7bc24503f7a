//! Title similarity with graceful degradation.
//!
//! A [`SimilarityEngine`] holds a chain of [`SimilarityBackend`]s, strongest
//! first: sentence embeddings, then TF-IDF, then word overlap. The chain is
//! fixed when the engine is built. Each comparison asks the tiers in order
//! and takes the first score that comes back; a tier error moves on to the
//! next tier, and if every tier fails the score is 0.
//!
//! # Example
//!
//! ```
//! use outliner::similarity::{SimilarityEngine, SimilarityTier};
//!
//! let engine = SimilarityEngine::lexical();
//! assert_eq!(engine.active_tier(), Some(SimilarityTier::TfIdf));
//! let score = engine.similarity("Model training", "Training the model");
//! assert!((0.0..=1.0).contains(&score));
//! ```

pub mod embedding;
pub mod overlap;
pub mod stopwords;
pub mod tfidf;

pub use embedding::{cosine_similarity, EmbeddingBackend, SentenceEncoder, DEFAULT_EMBEDDING_MODEL};
#[cfg(feature = "embeddings")]
pub use embedding::MiniLmEncoder;
pub use overlap::{jaccard, OverlapBackend};
pub use tfidf::{TfIdfBackend, TfIdfVectorizer};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// One level of the degradation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityTier {
    Embedding,
    TfIdf,
    Overlap,
}

impl fmt::Display for SimilarityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SimilarityTier::Embedding => "embedding",
            SimilarityTier::TfIdf => "tfidf",
            SimilarityTier::Overlap => "overlap",
        })
    }
}

/// Scores the similarity of two strings.
pub trait SimilarityBackend: Send + Sync {
    /// Which tier this backend implements.
    fn tier(&self) -> SimilarityTier;

    /// Raw similarity score. Callers clamp it to [0, 1].
    fn score(&self, a: &str, b: &str) -> Result<f32>;
}

/// Which tier the engine should start from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TierPreference {
    /// Embeddings when an encoder loads, otherwise TF-IDF.
    #[default]
    Auto,
    Embedding,
    TfIdf,
    Overlap,
}

/// Options for building a [`SimilarityEngine`].
#[derive(Debug, Clone)]
pub struct SimilarityOptions {
    pub preferred: TierPreference,
    /// HuggingFace model id or local directory of the sentence encoder
    pub embedding_model: String,
    /// TF-IDF n-gram range, inclusive
    pub ngram_range: (usize, usize),
    /// Remove English stop words before building n-grams
    pub stop_words: bool,
}

impl Default for SimilarityOptions {
    fn default() -> Self {
        Self {
            preferred: TierPreference::Auto,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            ngram_range: (1, 2),
            stop_words: true,
        }
    }
}

impl SimilarityOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the chain at a given tier.
    pub fn with_preferred(mut self, preferred: TierPreference) -> Self {
        self.preferred = preferred;
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = (min_n, max_n);
        self
    }

    pub fn with_stop_words(mut self, stop_words: bool) -> Self {
        self.stop_words = stop_words;
        self
    }
}

/// The degradation chain of similarity tiers.
pub struct SimilarityEngine {
    tiers: Vec<Box<dyn SimilarityBackend>>,
}

impl SimilarityEngine {
    /// Engine built from default options.
    pub fn new() -> Self {
        Self::from_options(&SimilarityOptions::default())
    }

    /// Build the chain once from options.
    ///
    /// An encoder that fails to load is logged and skipped; the chain then
    /// starts at TF-IDF.
    pub fn from_options(options: &SimilarityOptions) -> Self {
        let mut tiers: Vec<Box<dyn SimilarityBackend>> = Vec::new();

        if matches!(options.preferred, TierPreference::Auto | TierPreference::Embedding) {
            match load_encoder(&options.embedding_model) {
                Ok(encoder) => tiers.push(Box::new(EmbeddingBackend::new(encoder))),
                Err(e) if options.preferred == TierPreference::Embedding => {
                    log::warn!("Sentence encoder unavailable, using TF-IDF: {}", e)
                }
                Err(e) => log::info!("No sentence encoder ({}), using TF-IDF", e),
            }
        }

        if options.preferred != TierPreference::Overlap {
            tiers.push(Box::new(TfIdfBackend::with_config(
                options.ngram_range,
                options.stop_words,
            )));
        }
        tiers.push(Box::new(OverlapBackend::new()));

        let engine = Self { tiers };
        log::info!("Similarity engine starts at the {} tier", engine.tier_label());
        engine
    }

    /// Engine with a caller-supplied encoder in front of the lexical tiers.
    pub fn with_encoder(encoder: Box<dyn SentenceEncoder>) -> Self {
        Self {
            tiers: vec![
                Box::new(EmbeddingBackend::new(encoder)),
                Box::new(TfIdfBackend::new()),
                Box::new(OverlapBackend::new()),
            ],
        }
    }

    /// TF-IDF, then word overlap. Never loads a model.
    pub fn lexical() -> Self {
        Self {
            tiers: vec![Box::new(TfIdfBackend::new()), Box::new(OverlapBackend::new())],
        }
    }

    /// Word overlap only.
    pub fn overlap_only() -> Self {
        Self {
            tiers: vec![Box::new(OverlapBackend::new())],
        }
    }

    /// Engine over an explicit chain.
    pub fn from_backends(tiers: Vec<Box<dyn SimilarityBackend>>) -> Self {
        Self { tiers }
    }

    /// Similarity in [0, 1]. Never fails.
    pub fn similarity(&self, a: &str, b: &str) -> f32 {
        for backend in &self.tiers {
            match backend.score(a, b) {
                Ok(score) => return clamp_score(score),
                Err(e) => log::debug!("{} tier failed, falling through: {}", backend.tier(), e),
            }
        }
        0.0
    }

    /// The first tier in the chain.
    pub fn active_tier(&self) -> Option<SimilarityTier> {
        self.tiers.first().map(|t| t.tier())
    }

    /// All tiers, in the order they are tried.
    pub fn tiers(&self) -> Vec<SimilarityTier> {
        self.tiers.iter().map(|t| t.tier()).collect()
    }

    fn tier_label(&self) -> String {
        self.active_tier()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "none".to_string())
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp into [0, 1]; NaN becomes 0.
pub fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

#[cfg(feature = "embeddings")]
fn load_encoder(model: &str) -> Result<Box<dyn SentenceEncoder>> {
    Ok(Box::new(MiniLmEncoder::from_pretrained(model)?))
}

#[cfg(not(feature = "embeddings"))]
fn load_encoder(_model: &str) -> Result<Box<dyn SentenceEncoder>> {
    Err(crate::error::Error::Encoder(
        "built without the `embeddings` feature".to_string(),
    ))
}
