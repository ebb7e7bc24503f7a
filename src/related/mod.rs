//! Cross-document related-section ranking.
//!
//! Query titles are compared against every section title in a corpus with a
//! [`SimilarityEngine`]. Matches above the threshold are sorted by score,
//! best first, and cut to a per-mode limit.
//!
//! # Example
//!
//! ```
//! use outliner::related::RelatednessRanker;
//! use outliner::similarity::SimilarityEngine;
//! use outliner::{DocumentRecord, HeadingLevel, Section};
//!
//! let corpus = vec![DocumentRecord::new(
//!     "ml.pdf",
//!     vec![Section::new("Training Deep Neural Networks", HeadingLevel::H1, 2, "")],
//! )];
//! let ranker = RelatednessRanker::new(SimilarityEngine::overlap_only());
//! let matches = ranker.rank_text("Neural Network Training", &corpus);
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].source_document, "ml.pdf");
//! ```

pub mod explain;

pub use explain::{make_snippet, relevance_explanation, GENERIC_EXPLANATION};

use crate::corpus::{CorpusSource, JsonCorpus};
use crate::error::Result;
use crate::model::{DocumentRecord, RelatedSectionMatch, Section};
use crate::similarity::SimilarityEngine;

/// Options for related-section ranking.
#[derive(Debug, Clone)]
pub struct RelatedOptions {
    /// Keep matches scoring strictly above this
    pub threshold: f32,
    /// Only the first N query sections are used
    pub max_query_sections: usize,
    /// Query titles shorter than this are skipped
    pub min_query_chars: usize,
    /// Result limit when querying with sections
    pub section_limit: usize,
    /// Result limit when querying with free text
    pub text_limit: usize,
    pub snippet_sentences: usize,
    pub snippet_max_chars: usize,
    pub explanation_terms: usize,
    pub explanation_min_word_chars: usize,
}

impl Default for RelatedOptions {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            max_query_sections: 3,
            min_query_chars: 10,
            section_limit: 5,
            text_limit: 3,
            snippet_sentences: 4,
            snippet_max_chars: 500,
            explanation_terms: 3,
            explanation_min_word_chars: 4,
        }
    }
}

impl RelatedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the relevance threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the result limits for section and text queries.
    pub fn with_limits(mut self, section_limit: usize, text_limit: usize) -> Self {
        self.section_limit = section_limit;
        self.text_limit = text_limit;
        self
    }

    /// Set how many query sections are used.
    pub fn with_max_query_sections(mut self, max: usize) -> Self {
        self.max_query_sections = max;
        self
    }
}

/// Ranks corpus sections by relatedness to a query.
pub struct RelatednessRanker {
    engine: SimilarityEngine,
    options: RelatedOptions,
}

impl RelatednessRanker {
    pub fn new(engine: SimilarityEngine) -> Self {
        Self {
            engine,
            options: RelatedOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RelatedOptions) -> Self {
        self.options = options;
        self
    }

    pub fn engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    pub fn options(&self) -> &RelatedOptions {
        &self.options
    }

    /// Sections related to the first few query sections, best first.
    ///
    /// A corpus that cannot be read yields an empty list.
    pub fn rank_sections<C: CorpusSource + ?Sized>(
        &self,
        query: &[Section],
        corpus: &C,
    ) -> Vec<RelatedSectionMatch> {
        self.try_rank_sections(query, corpus).unwrap_or_else(|e| {
            log::warn!("Related-section search failed: {}", e);
            Vec::new()
        })
    }

    /// Like [`rank_sections`](Self::rank_sections), reporting corpus errors.
    pub fn try_rank_sections<C: CorpusSource + ?Sized>(
        &self,
        query: &[Section],
        corpus: &C,
    ) -> Result<Vec<RelatedSectionMatch>> {
        let queries: Vec<&str> = query
            .iter()
            .take(self.options.max_query_sections)
            .map(|s| s.title.as_str())
            .filter(|t| t.chars().count() >= self.options.min_query_chars)
            .collect();
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let documents = corpus.documents()?;
        let mut matches = Vec::new();
        for text in queries {
            self.collect_matches(text, &documents, &mut matches);
        }
        Ok(self.finish(matches, self.options.section_limit))
    }

    /// Sections related to a free-text query, best first.
    ///
    /// Empty text yields no matches.
    pub fn rank_text<C: CorpusSource + ?Sized>(
        &self,
        text: &str,
        corpus: &C,
    ) -> Vec<RelatedSectionMatch> {
        self.try_rank_text(text, corpus).unwrap_or_else(|e| {
            log::warn!("Related-section search failed: {}", e);
            Vec::new()
        })
    }

    /// Like [`rank_text`](Self::rank_text), reporting corpus errors.
    pub fn try_rank_text<C: CorpusSource + ?Sized>(
        &self,
        text: &str,
        corpus: &C,
    ) -> Result<Vec<RelatedSectionMatch>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let documents = corpus.documents()?;
        let mut matches = Vec::new();
        self.collect_matches(text, &documents, &mut matches);
        Ok(self.finish(matches, self.options.text_limit))
    }

    /// Sections related to a stored document's own sections.
    pub fn rank_document(&self, filename: &str, corpus: &JsonCorpus) -> Result<Vec<RelatedSectionMatch>> {
        let record = corpus.load(filename)?;
        self.try_rank_sections(&record.sections, corpus)
    }

    fn collect_matches(
        &self,
        query: &str,
        documents: &[DocumentRecord],
        matches: &mut Vec<RelatedSectionMatch>,
    ) {
        for document in documents {
            for section in &document.sections {
                if section.title == query {
                    continue;
                }
                let score = self.engine.similarity(query, &section.title);
                if score > self.options.threshold {
                    matches.push(self.build_match(query, document, section, score));
                }
            }
        }
    }

    fn build_match(
        &self,
        query: &str,
        document: &DocumentRecord,
        section: &Section,
        score: f32,
    ) -> RelatedSectionMatch {
        let source = if section.content.is_empty() {
            &section.title
        } else {
            &section.content
        };
        RelatedSectionMatch {
            source_document: document.filename.clone(),
            section_title: section.title.clone(),
            similarity_score: score,
            page: section.page,
            snippet: make_snippet(
                source,
                self.options.snippet_sentences,
                self.options.snippet_max_chars,
            ),
            relevance_explanation: relevance_explanation(
                query,
                &section.title,
                self.options.explanation_terms,
                self.options.explanation_min_word_chars,
            ),
        }
    }

    fn finish(&self, mut matches: Vec<RelatedSectionMatch>, limit: usize) -> Vec<RelatedSectionMatch> {
        matches.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        log::debug!("{} matches above threshold, keeping {}", matches.len(), limit.min(matches.len()));
        matches.truncate(limit);
        matches
    }
}

impl Default for RelatednessRanker {
    fn default() -> Self {
        Self::new(SimilarityEngine::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::HeadingLevel;

    fn section(title: &str, content: &str) -> Section {
        Section::new(title, HeadingLevel::H2, 1, content)
    }

    fn corpus() -> Vec<DocumentRecord> {
        vec![
            DocumentRecord::new(
                "ml.pdf",
                vec![
                    section("Training Deep Neural Networks", "Use batches. Tune rates."),
                    section("Neural Network Training", ""),
                    section("Marine Biology Survey", ""),
                ],
            ),
            DocumentRecord::new(
                "notes.pdf",
                vec![section("Neural Network Training Tips", "")],
            ),
        ]
    }

    struct Broken;

    impl CorpusSource for Broken {
        fn documents(&self) -> Result<Vec<DocumentRecord>> {
            Err(Error::Corpus("unreadable".to_string()))
        }
    }

    fn ranker() -> RelatednessRanker {
        RelatednessRanker::new(SimilarityEngine::overlap_only())
    }

    #[test]
    fn test_rank_text_excludes_self_match() {
        let matches = ranker().rank_text("Neural Network Training", &corpus());
        assert!(matches.iter().all(|m| m.section_title != "Neural Network Training"));
        // Jaccard: 3/4 for the "Tips" title, 2/5 for the "Deep" one
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].section_title, "Neural Network Training Tips");
        assert_eq!(matches[1].snippet, "Use batches. Tune rates.");
    }

    #[test]
    fn test_snippet_falls_back_to_title() {
        let matches = ranker().rank_text("Neural Network Training", &corpus());
        assert_eq!(matches[0].snippet, "Neural Network Training Tips");
    }

    #[test]
    fn test_sorted_and_above_threshold() {
        let matches = ranker().rank_text("Deep Neural Network Training", &corpus());
        assert!(matches.iter().all(|m| m.similarity_score > 0.3));
        assert!(matches
            .windows(2)
            .all(|w| w[0].similarity_score >= w[1].similarity_score));
    }

    #[test]
    fn test_text_limit() {
        let docs = vec![DocumentRecord::new(
            "many.pdf",
            (0..6).map(|i| section(&format!("Soil chemistry part{}", i), "")).collect(),
        )];
        assert_eq!(ranker().rank_text("Soil chemistry", &docs).len(), 3);
    }

    #[test]
    fn test_section_mode_uses_first_three_long_titles() {
        let docs = vec![DocumentRecord::new(
            "many.pdf",
            (0..8).map(|i| section(&format!("Marine biology chapter{}", i), "")).collect(),
        )];
        let query = vec![
            section("Short", ""),
            section("Marine biology", ""),
            section("Unrelated heading", ""),
            section("Marine biology chapter3 notes", ""),
        ];
        let matches = ranker().rank_sections(&query, &docs);
        assert_eq!(matches.len(), 5);
        // The fourth query section would score 0.75 against "chapter3"
        assert!(matches.iter().all(|m| (m.similarity_score - 2.0 / 3.0).abs() < 1e-6));
        assert_eq!(matches[0].relevance_explanation, "Shares key concepts: marine, biology");
    }

    #[test]
    fn test_empty_query() {
        assert!(ranker().rank_text("", &corpus()).is_empty());
        assert!(ranker().rank_text("   ", &corpus()).is_empty());
        assert!(ranker().rank_sections(&[], &corpus()).is_empty());
    }

    #[test]
    fn test_broken_corpus_is_absorbed() {
        assert!(ranker().rank_text("Neural Network Training", &Broken).is_empty());
        assert!(ranker().try_rank_text("Neural Network Training", &Broken).is_err());
    }
}
