//! Section content extraction.
//!
//! Content comes from the page's plain text rather than the span layout:
//! find the heading's line, then take the lines after it.

use unicode_normalization::UnicodeNormalization;

use super::options::OutlineOptions;
use crate::backend::PageTextSource;

/// Body text for a heading on `page`.
///
/// Returns the `content_lines` lines following the first line containing the
/// title (case-insensitive). When the title is not on the page, returns the
/// first `content_fallback_chars` characters of the page instead. A missing
/// page or a failed extraction yields an empty string.
pub fn section_content<S: PageTextSource + ?Sized>(
    source: &S,
    page: usize,
    title: &str,
    options: &OutlineOptions,
) -> String {
    match source.page_text(page) {
        Ok(text) => content_from_page_text(&text, title, options),
        Err(e) => {
            log::warn!("No content for '{}' on page {}: {}", title, page, e);
            String::new()
        }
    }
}

/// Slice a page's text into the content following `title`.
///
/// With `normalize_unicode` set, page text and title are both compared in
/// NFC, matching the form titles take during aggregation.
pub fn content_from_page_text(text: &str, title: &str, options: &OutlineOptions) -> String {
    let (text, needle) = if options.normalize_unicode {
        (text.nfc().collect::<String>(), title.nfc().collect::<String>().to_lowercase())
    } else {
        (text.to_string(), title.to_lowercase())
    };
    let lines: Vec<&str> = text.split('\n').collect();

    match lines.iter().position(|line| line.to_lowercase().contains(&needle)) {
        Some(index) => lines
            .iter()
            .skip(index + 1)
            .take(options.content_lines)
            .copied()
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
        None => text.chars().take(options.content_fallback_chars).collect(),
    }
}
