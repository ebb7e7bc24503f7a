//! Heading candidate scoring.

use regex::Regex;

use super::aggregate::MergedRun;
use super::options::OutlineOptions;
use crate::error::Result;
use crate::model::HeadingCandidate;

/// Heading-shape patterns, each matched at the start of the text.
pub const DEFAULT_HEADING_PATTERNS: &[&str] = &[
    r"^\d+\.\s+",              // 1. Introduction
    r"^\d+\.\d+\s+",           // 1.1 Scope
    r"^Chapter\s+\d+",         // Chapter 3
    r"^[A-Z]\.\s+",            // A. Lettered
    r"^[IVX]+\.\s+",           // IV. Roman
    r"^Section\s+\d+",
    r"^Part\s+\d+",
    r"^Appendix\s+[A-Z]",
    r"^Table\s+\d+",
    r"^Figure\s+\d+",
    r"^[A-Z][A-Z\s\-]{5,}$",   // ALL CAPS
];

/// Scores merged runs as heading candidates.
///
/// The score only feeds diagnostics; it does not decide inclusion.
#[derive(Debug, Clone)]
pub struct HeadingScorer {
    patterns: Vec<Regex>,
}

impl HeadingScorer {
    /// Create a scorer with the default heading patterns.
    pub fn new() -> Self {
        Self {
            patterns: DEFAULT_HEADING_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }

    /// Create a scorer with custom heading patterns.
    pub fn with_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Number of compiled patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Compute the heading score for a run.
    pub fn score(&self, run: &MergedRun, options: &OutlineOptions) -> i32 {
        let text = run.text.as_str();
        let len = text.chars().count();

        let mut score = if run.size > 0.0 { run.size.floor() as i32 } else { 0 };

        let is_bold =
            run.font.to_lowercase().contains("bold") || run.flags & options.bold_flag != 0;
        if is_bold {
            score += options.bold_bonus;
        }

        let matches = self.patterns.iter().filter(|p| p.is_match(text)).count() as i32;
        score += matches * options.pattern_bonus;

        if is_all_caps(text) && len >= options.all_caps_min_chars {
            score += options.all_caps_bonus;
        }

        let (min_len, max_len) = options.ideal_length;
        score += if (min_len..=max_len).contains(&len) {
            options.length_bonus
        } else {
            options.off_length_bonus
        };

        score
    }

    /// Turn a run into an unclassified candidate.
    pub fn candidate(&self, run: MergedRun, options: &OutlineOptions) -> HeadingCandidate {
        let score = self.score(&run, options);
        HeadingCandidate {
            page: run.page,
            y: run.bbox.y0,
            font_size: run.size,
            score,
            level: None,
            text: run.text,
        }
    }
}

impl Default for HeadingScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// At least one cased character and no lowercase ones.
fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}
