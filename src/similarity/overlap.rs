//! Lexical overlap tier: Jaccard similarity of lowercase word sets.

use std::collections::HashSet;

use super::{SimilarityBackend, SimilarityTier};
use crate::error::Result;

/// Last-resort similarity that cannot fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapBackend;

impl OverlapBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SimilarityBackend for OverlapBackend {
    fn tier(&self) -> SimilarityTier {
        SimilarityTier::Overlap
    }

    fn score(&self, a: &str, b: &str) -> Result<f32> {
        Ok(jaccard(a, b))
    }
}

/// Jaccard index of whitespace-split, lowercased words. Zero when either side has no words.
pub fn jaccard(a: &str, b: &str) -> f32 {
    let left = word_set(a);
    let right = word_set(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.union(&right).count();
    shared as f32 / union as f32
}

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}
