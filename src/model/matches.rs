//! Related-section match results.

use serde::{Deserialize, Serialize};

/// A corpus section judged related to a query title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedSectionMatch {
    /// File name of the corpus document the section came from
    pub source_document: String,
    /// Title of the matched section
    pub section_title: String,
    /// Similarity in [0, 1]
    pub similarity_score: f32,
    /// Zero-based page index of the matched section
    pub page: usize,
    /// Leading sentences of the matched section (at most 500 characters)
    pub snippet: String,
    /// Human-readable reason for the match
    pub relevance_explanation: String,
}
