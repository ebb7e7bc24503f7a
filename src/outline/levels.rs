//! Heading level classification.
//!
//! Levels are document-relative: the largest font size present among a
//! document's candidates is H1, the next largest H2, and so on. Sizes past
//! the fourth all share H5. Absolute point sizes carry no meaning across
//! documents.

use crate::model::{HeadingCandidate, HeadingLevel};

/// Distinct candidate font sizes, largest first.
pub fn distinct_sizes(candidates: &[HeadingCandidate]) -> Vec<f32> {
    let mut sizes: Vec<f32> = candidates.iter().map(|c| c.font_size).collect();
    sizes.sort_by(|a, b| b.total_cmp(a));
    sizes.dedup();
    sizes
}

/// Assign a level to every candidate by its font size rank.
pub fn assign_levels(candidates: &mut [HeadingCandidate]) {
    let sizes = distinct_sizes(candidates);
    for candidate in candidates.iter_mut() {
        let level = sizes
            .iter()
            .position(|s| *s == candidate.font_size)
            .map(HeadingLevel::from_rank)
            .unwrap_or(HeadingLevel::H5);
        candidate.level = Some(level);
    }
    log::debug!(
        "Classified {} candidates over {} font sizes",
        candidates.len(),
        sizes.len()
    );
}
