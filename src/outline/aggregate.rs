//! Span aggregation.
//!
//! Layout engines emit one span per styled run, so a heading that wraps
//! onto a second line arrives as two spans. Adjacent spans that share font,
//! size and style and sit on consecutive lines are merged back into one run.

use unicode_normalization::UnicodeNormalization;

use super::options::OutlineOptions;
use crate::model::{BBox, TextSpan};

/// One or more adjacent spans merged into a single run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRun {
    /// Merged text, single-space separated
    pub text: String,
    /// Zero-based page index
    pub page: usize,
    /// Union of the merged spans' boxes
    pub bbox: BBox,
    /// Font of the first span
    pub font: String,
    /// Font size of the first span
    pub size: f32,
    /// Style flags of the first span
    pub flags: u32,
}

/// Merge spans into runs in reading order.
///
/// Spans with empty text or more than `max_span_chars` characters are
/// dropped first. Runs shorter than `min_candidate_chars` are discarded.
pub fn aggregate_spans(spans: Vec<TextSpan>, options: &OutlineOptions) -> Vec<MergedRun> {
    let mut spans: Vec<TextSpan> = spans
        .into_iter()
        .filter_map(|mut span| {
            let text = if options.normalize_unicode {
                span.text.nfc().collect::<String>()
            } else {
                span.text.clone()
            };
            let text = text.trim();
            let len = text.chars().count();
            if len == 0 || len > options.max_span_chars {
                return None;
            }
            span.text = text.to_string();
            Some(span)
        })
        .collect();

    spans.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then_with(|| a.bbox.y0.total_cmp(&b.bbox.y0))
            .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut runs = Vec::new();
    let mut i = 0;

    while i < spans.len() {
        let current = &spans[i];
        let mut text = current.text.clone();
        let mut bbox = current.bbox;
        let mut j = i + 1;

        while j < spans.len() && can_merge(current, &bbox, &text, &spans[j], options) {
            let next = &spans[j];
            text.push(' ');
            text.push_str(&next.text);
            bbox.x1 = bbox.x1.max(next.bbox.x1);
            bbox.y1 = next.bbox.y1;
            j += 1;
        }

        if text.chars().count() >= options.min_candidate_chars {
            runs.push(MergedRun {
                text,
                page: current.page,
                bbox,
                font: current.font.clone(),
                size: current.size,
                flags: current.flags,
            });
        }
        i = j;
    }

    log::debug!("Aggregated {} spans into {} runs", spans.len(), runs.len());
    runs
}

/// Whether `next` continues the run started by `first`.
fn can_merge(
    first: &TextSpan,
    merged_bbox: &BBox,
    merged_text: &str,
    next: &TextSpan,
    options: &OutlineOptions,
) -> bool {
    let gap = next.bbox.y0 - merged_bbox.y1;
    let same_style = next.page == first.page
        && next.font == first.font
        && (next.size - first.size).abs() < options.merge_size_tolerance
        && next.flags == first.flags;
    if !same_style || !(0.0..options.max_line_gap).contains(&gap) {
        return false;
    }

    // Only continue across a sentence boundary when the run is still short
    // or the next line plainly continues it
    merged_text.chars().count() < options.short_text_chars
        || next.text.chars().next().is_some_and(char::is_lowercase)
        || !merged_text.ends_with(options.sentence_terminators.as_slice())
}
