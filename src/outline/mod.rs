//! Outline extraction pipeline.
//!
//! Turns positioned text spans into a leveled list of [`Section`]s:
//!
//! 1. [`aggregate`] merges spans of wrapped lines into runs
//! 2. [`score`] turns runs into scored heading candidates
//! 3. [`levels`] assigns H1..H5 from document-relative font size rank
//! 4. [`reconstruct`] drops noise and re-joins split phrases
//! 5. [`content`] attaches the text that follows each heading
//!
//! # Example
//!
//! ```no_run
//! use outliner::outline::{OutlineOptions, SectionExtractor};
//!
//! let extractor = SectionExtractor::new().with_options(OutlineOptions::default().titles_only());
//! for section in extractor.extract("report.pdf") {
//!     println!("{} {} (page {})", section.level, section.title, section.page);
//! }
//! ```

pub mod aggregate;
pub mod content;
pub mod levels;
pub mod options;
pub mod reconstruct;
pub mod score;

pub use aggregate::{aggregate_spans, MergedRun};
pub use content::{content_from_page_text, section_content};
pub use levels::{assign_levels, distinct_sizes};
pub use options::OutlineOptions;
pub use reconstruct::{filter_candidates, is_noise, reconstruct_phrases, Heading};
pub use score::{HeadingScorer, DEFAULT_HEADING_PATTERNS};

use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::backend::{BackendRegistry, LayoutDocument, LayoutSource};
use crate::error::Result;
use crate::model::{HeadingCandidate, Section, TextSpan};

/// Extracts sections from documents.
pub struct SectionExtractor {
    registry: BackendRegistry,
    options: OutlineOptions,
    scorer: HeadingScorer,
}

impl SectionExtractor {
    /// Create an extractor with the default backends and options.
    pub fn new() -> Self {
        Self {
            registry: BackendRegistry::with_defaults(),
            options: OutlineOptions::default(),
            scorer: HeadingScorer::new(),
        }
    }

    /// Replace the outline options.
    pub fn with_options(mut self, options: OutlineOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the backend registry.
    pub fn with_registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the heading scorer.
    pub fn with_scorer(mut self, scorer: HeadingScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Current options.
    pub fn options(&self) -> &OutlineOptions {
        &self.options
    }

    /// Backend registry in use.
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Extract the sections of a document.
    ///
    /// Never fails: an unreadable or unsupported document yields an empty
    /// list, indistinguishable from a document without headings. Use
    /// [`try_extract`](Self::try_extract) to see the error.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Vec<Section> {
        let path = path.as_ref();
        match self.try_extract(path) {
            Ok(sections) => sections,
            Err(e) => {
                log::warn!("Section extraction failed for {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Extract the sections of a document, reporting open and layout errors.
    pub fn try_extract<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Section>> {
        let path = path.as_ref();
        let document = self.registry.open(path)?;
        let sections = self.extract_from(&*document)?;
        log::info!("Extracted {} sections from {}", sections.len(), path.display());
        Ok(sections)
    }

    /// Extract sections from an already opened document.
    pub fn extract_from<D: LayoutDocument + ?Sized>(&self, document: &D) -> Result<Vec<Section>> {
        let candidates = self.classified_candidates(document)?;
        let candidates = filter_candidates(candidates, &self.options);
        let headings = reconstruct_phrases(&candidates, &self.options);

        Ok(headings
            .into_iter()
            .map(|heading| {
                let content = if self.options.extract_content {
                    section_content(document, heading.page, &heading.text, &self.options)
                } else {
                    String::new()
                };
                Section::new(heading.text, heading.level, heading.page, content)
            })
            .collect())
    }

    /// Outline of in-memory spans, without section content.
    pub fn extract_spans(&self, spans: Vec<TextSpan>) -> Vec<Section> {
        let mut candidates = self.score_runs(spans);
        assign_levels(&mut candidates);
        let candidates = filter_candidates(candidates, &self.options);
        reconstruct_phrases(&candidates, &self.options)
            .into_iter()
            .map(|h| Section::new(h.text, h.level, h.page, ""))
            .collect()
    }

    /// Scored and leveled candidates of a document, before filtering.
    ///
    /// Diagnostic view of what the pipeline considered.
    pub fn candidates<P: AsRef<Path>>(&self, path: P) -> Result<Vec<HeadingCandidate>> {
        let document = self.registry.open(path.as_ref())?;
        self.classified_candidates(&*document)
    }

    /// Extract several documents, in parallel unless disabled.
    ///
    /// Results keep the order of `paths`.
    pub fn extract_many<P>(&self, paths: &[P]) -> Vec<(PathBuf, Vec<Section>)>
    where
        P: AsRef<Path> + Sync,
    {
        let run = |path: &P| {
            let path = path.as_ref();
            (path.to_path_buf(), self.extract(path))
        };

        if self.options.parallel && paths.len() > 1 {
            paths.par_iter().map(run).collect()
        } else {
            paths.iter().map(run).collect()
        }
    }

    fn classified_candidates<S: LayoutSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<Vec<HeadingCandidate>> {
        let mut spans = Vec::new();
        for page in 0..source.page_count() {
            spans.extend(source.page_spans(page)?);
        }
        log::debug!("Collected {} spans from {} pages", spans.len(), source.page_count());

        let mut candidates = self.score_runs(spans);
        assign_levels(&mut candidates);
        Ok(candidates)
    }

    fn score_runs(&self, spans: Vec<TextSpan>) -> Vec<HeadingCandidate> {
        aggregate_spans(spans, &self.options)
            .into_iter()
            .map(|run| self.scorer.candidate(run, &self.options))
            .collect()
    }
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new()
    }
}
