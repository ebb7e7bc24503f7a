//! Outline extraction options.
//!
//! The defaults are the empirically tuned weights and windows the pipeline
//! was calibrated with. They are not derived from any corpus.

/// Options for turning page layouts into sections.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineOptions {
    /// Spans longer than this (in characters) are dropped before merging
    pub max_span_chars: usize,

    /// Maximum font size difference for two spans to merge
    pub merge_size_tolerance: f32,

    /// Maximum vertical gap (exclusive) between merged lines
    pub max_line_gap: f32,

    /// Accumulated text shorter than this always accepts another line
    pub short_text_chars: usize,

    /// Characters that end a sentence and block further merging
    pub sentence_terminators: Vec<char>,

    /// Merged fragments shorter than this are discarded
    pub min_candidate_chars: usize,

    /// Style flag bit that marks a run as bold
    pub bold_flag: u32,

    /// Score bonus for bold text
    pub bold_bonus: i32,

    /// Score bonus per matching heading pattern
    pub pattern_bonus: i32,

    /// Score bonus for all-caps text longer than `all_caps_min_chars - 1`
    pub all_caps_bonus: i32,

    /// Minimum length for the all-caps bonus
    pub all_caps_min_chars: usize,

    /// Length range (inclusive) that earns `length_bonus`
    pub ideal_length: (usize, usize),

    /// Score for text inside `ideal_length`
    pub length_bonus: i32,

    /// Score for text outside `ideal_length`
    pub off_length_bonus: i32,

    /// Minimum alphanumeric characters for a heading to survive filtering
    pub min_alnum_chars: usize,

    /// Maximum fraction of symbol characters for a heading to survive
    pub max_symbol_ratio: f32,

    /// Following fragments shorter than this may be absorbed into a heading
    pub fragment_max_chars: usize,

    /// Maximum vertical distance from the heading for absorbed fragments
    pub fragment_max_distance: f32,

    /// Number of lines after the heading taken as section content
    pub content_lines: usize,

    /// Characters of raw page text used when the heading is not found
    pub content_fallback_chars: usize,

    /// Whether to attach section content at all
    pub extract_content: bool,

    /// Normalize span text to Unicode NFC before merging
    pub normalize_unicode: bool,

    /// Whether batch extraction may process documents in parallel
    pub parallel: bool,
}

impl OutlineOptions {
    /// Create new outline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vertical gap limit for merging lines.
    pub fn with_max_line_gap(mut self, gap: f32) -> Self {
        self.max_line_gap = gap;
        self
    }

    /// Set the minimum length of emitted candidates.
    pub fn with_min_candidate_chars(mut self, chars: usize) -> Self {
        self.min_candidate_chars = chars;
        self
    }

    /// Set the fragment absorption window.
    pub fn with_fragment_window(mut self, max_chars: usize, max_distance: f32) -> Self {
        self.fragment_max_chars = max_chars;
        self.fragment_max_distance = max_distance;
        self
    }

    /// Set how many lines of content follow a heading.
    pub fn with_content_lines(mut self, lines: usize) -> Self {
        self.content_lines = lines;
        self
    }

    /// Skip content extraction (titles only).
    pub fn titles_only(mut self) -> Self {
        self.extract_content = false;
        self
    }

    /// Enable or disable Unicode normalization.
    pub fn with_unicode_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    /// Enable or disable parallel batch processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            max_span_chars: 200,
            merge_size_tolerance: 0.5,
            max_line_gap: 10.0,
            short_text_chars: 30,
            sentence_terminators: vec!['.', ':', ';'],
            min_candidate_chars: 5,
            bold_flag: crate::model::FLAG_BOLD,
            bold_bonus: 8,
            pattern_bonus: 10,
            all_caps_bonus: 5,
            all_caps_min_chars: 6,
            ideal_length: (8, 60),
            length_bonus: 3,
            off_length_bonus: 1,
            min_alnum_chars: 2,
            max_symbol_ratio: 0.9,
            fragment_max_chars: 10,
            fragment_max_distance: 30.0,
            content_lines: 20,
            content_fallback_chars: 500,
            extract_content: true,
            normalize_unicode: true,
            parallel: true,
        }
    }
}
