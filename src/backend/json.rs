//! JSON layout dumps.
//!
//! A dump is what an upstream layout engine writes out per document:
//!
//! ```json
//! {"pages": [{"spans": [{"text": "1. Introduction", "font": "Arial-Bold",
//!   "size": 14, "flags": 16, "bbox": [0, 0, 100, 12], "page": 0}],
//!   "text": "1. Introduction\n..."}]}
//! ```
//!
//! `text` is optional; without it the page text is rebuilt from the spans.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{spans_to_plain_text, LayoutBackend, LayoutDocument, LayoutSource, PageTextSource};
use crate::error::{Error, Result};
use crate::model::TextSpan;

/// Highest page count a dump built from spans may reach.
pub const MAX_PAGES: usize = 100_000;

/// One page of a layout dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Positioned spans on this page
    #[serde(default)]
    pub spans: Vec<TextSpan>,
    /// Plain text of the page, if the engine produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A whole-document layout dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDump {
    pub pages: Vec<PageLayout>,
}

impl LayoutDump {
    /// Create an empty dump.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dump from a flat span list, bucketing by each span's page.
    ///
    /// Spans with a page index of [`MAX_PAGES`] or more are dropped with a
    /// warning. Use [`try_from_spans`](Self::try_from_spans) to reject them.
    pub fn from_spans(spans: Vec<TextSpan>) -> Self {
        let (kept, dropped): (Vec<_>, Vec<_>) =
            spans.into_iter().partition(|s| s.page < MAX_PAGES);
        if !dropped.is_empty() {
            log::warn!("Dropped {} spans past page limit {}", dropped.len(), MAX_PAGES);
        }
        Self::bucket(kept)
    }

    /// Build a dump from a flat span list, failing on a page index of
    /// [`MAX_PAGES`] or more.
    pub fn try_from_spans(spans: Vec<TextSpan>) -> Result<Self> {
        if let Some(span) = spans.iter().find(|s| s.page >= MAX_PAGES) {
            return Err(Error::Layout(format!(
                "span '{}' on page {} exceeds page limit {}",
                span.text, span.page, MAX_PAGES
            )));
        }
        Ok(Self::bucket(spans))
    }

    fn bucket(spans: Vec<TextSpan>) -> Self {
        let page_count = spans.iter().map(|s| s.page + 1).max().unwrap_or(0);
        let mut pages = vec![PageLayout::default(); page_count];
        for span in spans {
            let page = span.page;
            pages[page].spans.push(span);
        }
        Self { pages }
    }

    /// Set the plain text of a page, growing the dump if needed.
    ///
    /// A page index of [`MAX_PAGES`] or more is ignored with a warning.
    pub fn with_page_text(mut self, page: usize, text: impl Into<String>) -> Self {
        if page >= MAX_PAGES {
            log::warn!("Ignored text for page {} past page limit {}", page, MAX_PAGES);
            return self;
        }
        if self.pages.len() <= page {
            self.pages.resize(page + 1, PageLayout::default());
        }
        self.pages[page].text = Some(text.into());
        self
    }

    /// Parse a dump from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a dump from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn page(&self, page: usize) -> Result<&PageLayout> {
        self.pages
            .get(page)
            .ok_or(Error::PageOutOfRange(page, self.pages.len()))
    }
}

impl LayoutSource for LayoutDump {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_spans(&self, page: usize) -> Result<Vec<TextSpan>> {
        // The page a span sits in wins over its own page field
        Ok(self
            .page(page)?
            .spans
            .iter()
            .cloned()
            .map(|mut s| {
                s.page = page;
                s
            })
            .collect())
    }
}

impl PageTextSource for LayoutDump {
    fn page_text(&self, page: usize) -> Result<String> {
        let layout = self.page(page)?;
        Ok(match &layout.text {
            Some(text) => text.clone(),
            None => spans_to_plain_text(&layout.spans),
        })
    }
}

/// Backend for `.json` layout dumps.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLayoutBackend;

impl JsonLayoutBackend {
    /// Create a new JSON backend.
    pub fn new() -> Self {
        Self
    }
}

impl LayoutBackend for JsonLayoutBackend {
    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn name(&self) -> &str {
        "json"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn LayoutDocument>> {
        Ok(Box::new(LayoutDump::load(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    #[test]
    fn test_from_spans_buckets_pages() {
        let spans = vec![
            TextSpan::new("a", "F", 10.0, 0, BBox::default(), 0),
            TextSpan::new("b", "F", 10.0, 0, BBox::default(), 2),
        ];
        let dump = LayoutDump::from_spans(spans);
        assert_eq!(dump.page_count(), 3);
        assert!(dump.page_spans(1).unwrap().is_empty());
        assert_eq!(dump.page_spans(2).unwrap()[0].text, "b");
    }

    #[test]
    fn test_huge_page_index() {
        let spans = vec![
            TextSpan::new("a", "F", 10.0, 0, BBox::default(), 0),
            TextSpan::new("far", "F", 10.0, 0, BBox::default(), usize::MAX),
        ];
        assert!(matches!(
            LayoutDump::try_from_spans(spans.clone()),
            Err(Error::Layout(_))
        ));

        let dump = LayoutDump::from_spans(spans);
        assert_eq!(dump.page_count(), 1);
        assert_eq!(dump.page_spans(0).unwrap()[0].text, "a");

        let dump = dump.with_page_text(MAX_PAGES, "ignored");
        assert_eq!(dump.page_count(), 1);
    }

    #[test]
    fn test_page_spans_take_page_index() {
        let json = r#"{"pages":[{"spans":[]},{"spans":[{"text":"x","font":"F","size":9,"bbox":[0,0,1,1]}]}]}"#;
        let dump = LayoutDump::from_json(json).unwrap();
        assert_eq!(dump.page_spans(1).unwrap()[0].page, 1);
    }

    #[test]
    fn test_page_text_prefers_dump_text() {
        let dump = LayoutDump::from_spans(vec![TextSpan::new(
            "Heading",
            "F",
            10.0,
            0,
            BBox::new(0.0, 0.0, 10.0, 10.0),
            0,
        )]);
        assert_eq!(dump.page_text(0).unwrap(), "Heading");

        let dump = dump.with_page_text(0, "Raw page text");
        assert_eq!(dump.page_text(0).unwrap(), "Raw page text");
    }

    #[test]
    fn test_page_out_of_range() {
        let dump = LayoutDump::new();
        assert!(matches!(
            dump.page_text(0),
            Err(Error::PageOutOfRange(0, 0))
        ));
    }
}
