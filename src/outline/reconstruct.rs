//! Noise filtering and heading phrase reconstruction.

use super::options::OutlineOptions;
use crate::model::{HeadingCandidate, HeadingLevel};

/// A finished heading before content is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub text: String,
    pub level: HeadingLevel,
    pub page: usize,
}

/// Drop decorative or near-empty candidates and restore reading order.
pub fn filter_candidates(
    candidates: Vec<HeadingCandidate>,
    options: &OutlineOptions,
) -> Vec<HeadingCandidate> {
    let before = candidates.len();
    let mut kept: Vec<HeadingCandidate> = candidates
        .into_iter()
        .filter(|c| !is_noise(&c.text, options))
        .collect();

    kept.sort_by(|a, b| a.page.cmp(&b.page).then_with(|| a.y.total_cmp(&b.y)));

    log::debug!("Filtered {} of {} candidates as noise", before - kept.len(), before);
    kept
}

/// Whether text is too short or too symbol-heavy to be a heading.
pub fn is_noise(text: &str, options: &OutlineOptions) -> bool {
    let total = text.chars().count();
    let alnum = text.chars().filter(|c| c.is_alphanumeric()).count();
    if alnum < options.min_alnum_chars {
        return true;
    }

    let symbols = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
        .count();
    symbols as f32 / total.max(1) as f32 > options.max_symbol_ratio
}

/// Absorb short trailing fragments into the heading they belong to.
///
/// Candidates must already be in reading order. A following candidate joins
/// the current heading when it is short, on the same page, at the same
/// level, and close to the heading's top edge.
pub fn reconstruct_phrases(candidates: &[HeadingCandidate], options: &OutlineOptions) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut i = 0;

    while i < candidates.len() {
        let anchor = &candidates[i];
        let mut phrase = anchor.text.clone();
        let mut j = i + 1;

        while j < candidates.len() && absorbs(anchor, &candidates[j], options) {
            phrase.push(' ');
            phrase.push_str(&candidates[j].text);
            j += 1;
        }

        headings.push(Heading {
            text: phrase.trim().to_string(),
            level: anchor.level.unwrap_or(HeadingLevel::H5),
            page: anchor.page,
        });
        i = j;
    }

    headings
}

fn absorbs(anchor: &HeadingCandidate, next: &HeadingCandidate, options: &OutlineOptions) -> bool {
    next.text.chars().count() < options.fragment_max_chars
        && next.page == anchor.page
        && next.level == anchor.level
        && (next.y - anchor.y).abs() < options.fragment_max_distance
}
