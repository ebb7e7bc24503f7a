//! Document model types.
//!
//! Spans come in from a layout backend, sections go out to callers and
//! corpora, and matches are produced per query by the ranker.

mod matches;
mod section;
mod span;

pub use matches::RelatedSectionMatch;
pub use section::{DocumentRecord, DocumentSummary, HeadingLevel, Section};
pub use span::{BBox, HeadingCandidate, TextSpan, FLAG_BOLD, FLAG_ITALIC};
