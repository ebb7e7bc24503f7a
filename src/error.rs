//! Error types for the outliner library.

use std::io;
use thiserror::Error;

/// Result type alias for outliner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting outlines or ranking sections.
///
/// The public entry points ([`crate::extract_sections`],
/// [`crate::find_related_sections`], ...) never return these; they log and
/// degrade to an empty result. The `try_*` variants surface them.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No layout backend is registered for this kind of file.
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The page layout data could not be read.
    #[error("Layout extraction error: {0}")]
    Layout(String),

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// The corpus directory could not be scanned.
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// A stored document was not found in the corpus.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// The sentence encoder could not be loaded or failed to encode.
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// TF-IDF fitting produced no terms (e.g. only stop words).
    #[error("Empty vocabulary: inputs contain only stop words or no terms")]
    EmptyVocabulary,

    /// A similarity tier failed internally.
    #[error("Similarity error: {0}")]
    Similarity(String),

    /// A heading pattern failed to compile.
    #[error("Invalid heading pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "pdf")]
impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Layout(err.to_string())
    }
}
