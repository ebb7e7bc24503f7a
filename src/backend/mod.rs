//! Layout backend abstraction layer.
//!
//! The outline pipeline never touches a concrete document library. It reads
//! positioned spans through [`LayoutSource`] and plain page text through
//! [`PageTextSource`]; a [`LayoutBackend`] opens a path and hands back both.
//! The [`BackendRegistry`] maps file extensions to backends.
//!
//! # Example
//!
//! ```no_run
//! use outliner::backend::BackendRegistry;
//! use std::path::Path;
//!
//! fn main() -> outliner::Result<()> {
//!     let registry = BackendRegistry::with_defaults();
//!     let layout = registry.open(Path::new("report.layout.json"))?;
//!     println!("{} pages", layout.page_count());
//!     Ok(())
//! }
//! ```

mod json;
#[cfg(feature = "pdf")]
mod pdf;

pub use json::{JsonLayoutBackend, LayoutDump, PageLayout, MAX_PAGES};
#[cfg(feature = "pdf")]
pub use pdf::{PdfLayout, PdfLayoutBackend};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::TextSpan;

/// Supplies positioned text spans, one page at a time.
pub trait LayoutSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Spans of one page (zero-based), in any order.
    fn page_spans(&self, page: usize) -> Result<Vec<TextSpan>>;
}

/// Supplies a page's text as one unstructured string.
pub trait PageTextSource {
    /// Plain text of one page (zero-based).
    fn page_text(&self, page: usize) -> Result<String>;
}

/// An opened document that provides both spans and plain text.
pub trait LayoutDocument: LayoutSource + PageTextSource {}

impl<T: LayoutSource + PageTextSource> LayoutDocument for T {}

/// Opens documents of one or more file types.
///
/// Implement this trait to feed layouts from another extraction engine.
pub trait LayoutBackend: Send + Sync {
    /// Supported file extensions, lowercase without the leading dot.
    fn supported_extensions(&self) -> &[&str];

    /// Name of this backend.
    fn name(&self) -> &str;

    /// Open the document at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn LayoutDocument>>;

    /// Check if this backend supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for layout backends, keyed by extension and by name.
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn LayoutBackend>>,
    by_name: HashMap<String, Arc<dyn LayoutBackend>>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the built-in backends (JSON dumps, and PDF when
    /// the `pdf` feature is enabled).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JsonLayoutBackend::new()));
        #[cfg(feature = "pdf")]
        registry.register(Arc::new(PdfLayoutBackend::new()));
        registry
    }

    /// Register a backend for all its supported extensions.
    pub fn register(&mut self, backend: Arc<dyn LayoutBackend>) {
        for ext in backend.supported_extensions() {
            self.backends.insert(ext.to_lowercase(), backend.clone());
        }
        self.by_name.insert(backend.name().to_lowercase(), backend);
    }

    /// Get a backend by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn LayoutBackend>> {
        self.backends.get(&ext.to_lowercase()).cloned()
    }

    /// Get a backend by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn LayoutBackend>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.backends.contains_key(&ext.to_lowercase())
    }

    /// Open a document using the backend registered for its extension.
    pub fn open(&self, path: &Path) -> Result<Box<dyn LayoutDocument>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(format!("{} has no extension", path.display())))?;

        let backend = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!("no layout backend for .{}", ext)))?;

        log::debug!("Opening {} with '{}' backend", path.display(), backend.name());
        backend.open(path)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Render spans as plain text: one line per visual row, rows top to bottom.
///
/// Used when a backend has no separate text dump for a page.
pub fn spans_to_plain_text(spans: &[TextSpan]) -> String {
    let mut sorted: Vec<&TextSpan> = spans.iter().collect();
    sorted.sort_by(|a, b| match a.bbox.y0.partial_cmp(&b.bbox.y0) {
        Some(Ordering::Equal) | None => a
            .bbox
            .x0
            .partial_cmp(&b.bbox.x0)
            .unwrap_or(Ordering::Equal),
        Some(ord) => ord,
    });

    let mut lines: Vec<Vec<&TextSpan>> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in sorted {
        // Allow 30% of font size variance within one row
        let y_tolerance = span.size * 0.3;
        let same_row = current_y.is_some_and(|y| (span.bbox.y0 - y).abs() <= y_tolerance);
        if same_row {
            if let Some(line) = lines.last_mut() {
                line.push(span);
                continue;
            }
        }
        current_y = Some(span.bbox.y0);
        lines.push(vec![span]);
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal));
            line.iter()
                .map(|s| s.text.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
