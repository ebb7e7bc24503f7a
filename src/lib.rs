//! # outliner
//!
//! Heading outline extraction and cross-document related-section ranking.
//!
//! The library turns positioned text spans from a page layout engine into a
//! leveled list of sections, then finds sections in a corpus of previously
//! processed documents whose titles are related to a query.
//!
//! ## Quick Start
//!
//! ```no_run
//! use outliner::{extract_sections, find_related_sections, JsonCorpus};
//!
//! let sections = extract_sections("report.pdf");
//! for section in &sections {
//!     println!("{} {} (page {})", section.level, section.title, section.page);
//! }
//!
//! let corpus = JsonCorpus::new("processed");
//! for m in find_related_sections(&sections, &corpus) {
//!     println!("{:.2} {} / {}", m.similarity_score, m.source_document, m.section_title);
//! }
//! ```
//!
//! ## Features
//!
//! - **Layout heuristics**: wrapped-line merging, font-rank heading levels,
//!   noise filtering, split-phrase repair
//! - **Pluggable layouts**: JSON layout dumps, PDF content streams (`pdf`)
//! - **Degrading similarity**: sentence embeddings (`embeddings`), TF-IDF,
//!   word overlap
//! - **Parallel batches**: uses Rayon for multi-document extraction
//!
//! The top-level functions never fail. An unreadable document gives the same
//! empty outline as a document without headings; use the `try_*` methods on
//! [`SectionExtractor`] and [`RelatednessRanker`] to tell them apart.

pub mod backend;
pub mod corpus;
pub mod error;
pub mod model;
pub mod outline;
pub mod related;
pub mod similarity;

// Re-export commonly used types
pub use backend::{BackendRegistry, LayoutBackend, LayoutDocument, LayoutDump, LayoutSource, PageTextSource};
pub use corpus::{CorpusSource, JsonCorpus};
pub use error::{Error, Result};
pub use model::{
    BBox, DocumentRecord, DocumentSummary, HeadingCandidate, HeadingLevel, RelatedSectionMatch,
    Section, TextSpan, FLAG_BOLD, FLAG_ITALIC,
};
pub use outline::{OutlineOptions, SectionExtractor};
pub use related::{RelatedOptions, RelatednessRanker};
pub use similarity::{SimilarityEngine, SimilarityOptions, SimilarityTier, TierPreference};

use std::path::Path;
use std::sync::OnceLock;

/// Extract the sections of a document with default options.
///
/// # Example
///
/// ```no_run
/// use outliner::extract_sections;
///
/// let sections = extract_sections("document.layout.json");
/// println!("{} sections", sections.len());
/// ```
pub fn extract_sections<P: AsRef<Path>>(path: P) -> Vec<Section> {
    SectionExtractor::new().extract(path)
}

/// Corpus sections related to the first few query sections (top 5).
///
/// Uses a process-wide ranker whose similarity tier is chosen on first use.
pub fn find_related_sections<C: CorpusSource + ?Sized>(
    query: &[Section],
    corpus: &C,
) -> Vec<RelatedSectionMatch> {
    shared_ranker().rank_sections(query, corpus)
}

/// Corpus sections related to a free-text query (top 3).
pub fn find_related_sections_for_text<C: CorpusSource + ?Sized>(
    text: &str,
    corpus: &C,
) -> Vec<RelatedSectionMatch> {
    shared_ranker().rank_text(text, corpus)
}

fn shared_ranker() -> &'static RelatednessRanker {
    static RANKER: OnceLock<RelatednessRanker> = OnceLock::new();
    RANKER.get_or_init(RelatednessRanker::default)
}

/// Builder for an extraction and ranking setup.
///
/// # Example
///
/// ```no_run
/// use outliner::{JsonCorpus, Outliner, TierPreference};
///
/// let analyzer = Outliner::new()
///     .sequential()
///     .with_tier(TierPreference::TfIdf)
///     .with_threshold(0.25)
///     .build();
///
/// let corpus = JsonCorpus::create("processed")?;
/// let record = analyzer.ingest("report.pdf", &corpus)?;
/// let related = analyzer.related_sections(&record.sections, &corpus);
/// # Ok::<(), outliner::Error>(())
/// ```
pub struct Outliner {
    outline_options: OutlineOptions,
    similarity_options: SimilarityOptions,
    related_options: RelatedOptions,
}

impl Outliner {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            outline_options: OutlineOptions::default(),
            similarity_options: SimilarityOptions::default(),
            related_options: RelatedOptions::default(),
        }
    }

    /// Replace the outline options.
    pub fn with_outline_options(mut self, options: OutlineOptions) -> Self {
        self.outline_options = options;
        self
    }

    /// Skip section content extraction.
    pub fn titles_only(mut self) -> Self {
        self.outline_options = self.outline_options.titles_only();
        self
    }

    /// Disable parallel batch extraction.
    pub fn sequential(mut self) -> Self {
        self.outline_options = self.outline_options.sequential();
        self
    }

    /// Replace the similarity options.
    pub fn with_similarity_options(mut self, options: SimilarityOptions) -> Self {
        self.similarity_options = options;
        self
    }

    /// Set the similarity tier to start from.
    pub fn with_tier(mut self, preferred: TierPreference) -> Self {
        self.similarity_options = self.similarity_options.with_preferred(preferred);
        self
    }

    /// Set the sentence encoder model id or directory.
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.similarity_options = self.similarity_options.with_embedding_model(model);
        self
    }

    /// Replace the ranking options.
    pub fn with_related_options(mut self, options: RelatedOptions) -> Self {
        self.related_options = options;
        self
    }

    /// Set the relevance threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.related_options = self.related_options.with_threshold(threshold);
        self
    }

    /// Build the extractor and ranker. The similarity chain is fixed here.
    pub fn build(self) -> Analyzer {
        let engine = SimilarityEngine::from_options(&self.similarity_options);
        Analyzer {
            extractor: SectionExtractor::new().with_options(self.outline_options),
            ranker: RelatednessRanker::new(engine).with_options(self.related_options),
        }
    }
}

impl Default for Outliner {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured extractor and ranker pair.
pub struct Analyzer {
    extractor: SectionExtractor,
    ranker: RelatednessRanker,
}

impl Analyzer {
    /// The section extractor.
    pub fn extractor(&self) -> &SectionExtractor {
        &self.extractor
    }

    /// The relatedness ranker.
    pub fn ranker(&self) -> &RelatednessRanker {
        &self.ranker
    }

    /// Extract the sections of a document. Never fails.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Vec<Section> {
        self.extractor.extract(path)
    }

    /// Extract a document and store its record in `corpus`.
    ///
    /// The record is named after the file name of `path`.
    pub fn ingest<P: AsRef<Path>>(&self, path: P, corpus: &JsonCorpus) -> Result<DocumentRecord> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Other(format!("no file name in {}", path.display())))?;

        let sections = self.extractor.try_extract(path)?;
        let record = DocumentRecord::new(filename, sections)
            .with_file_path(path.to_string_lossy().to_string());
        corpus.save(&record)?;
        Ok(record)
    }

    /// Corpus sections related to the first few query sections.
    pub fn related_sections<C: CorpusSource + ?Sized>(
        &self,
        query: &[Section],
        corpus: &C,
    ) -> Vec<RelatedSectionMatch> {
        self.ranker.rank_sections(query, corpus)
    }

    /// Corpus sections related to a free-text query.
    pub fn related_text<C: CorpusSource + ?Sized>(
        &self,
        text: &str,
        corpus: &C,
    ) -> Vec<RelatedSectionMatch> {
        self.ranker.rank_text(text, corpus)
    }

    /// Corpus sections related to a stored document's sections.
    pub fn related_document(&self, filename: &str, corpus: &JsonCorpus) -> Result<Vec<RelatedSectionMatch>> {
        self.ranker.rank_document(filename, corpus)
    }
}
