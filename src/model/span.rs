//! Positioned text runs and heading candidates.

use serde::{Deserialize, Serialize};

/// Style flag bit for italic runs.
pub const FLAG_ITALIC: u32 = 1 << 1;

/// Style flag bit for bold runs.
pub const FLAG_BOLD: u32 = 1 << 4;

/// An axis-aligned bounding box in top-down page coordinates.
///
/// `y0` is the top edge and `y1` the bottom edge; y grows down the page.
/// Serialized as a `[x0, y0, x1, y1]` array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Box height.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

impl From<[f32; 4]> for BBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// One styled run of text on a page, as supplied by a layout backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Font name (e.g., "Helvetica-Bold")
    pub font: String,
    /// Font size in points
    pub size: f32,
    /// Bit-encoded style flags (see [`FLAG_BOLD`], [`FLAG_ITALIC`])
    #[serde(default)]
    pub flags: u32,
    /// Bounding box in top-down coordinates
    pub bbox: BBox,
    /// Zero-based page index
    #[serde(default)]
    pub page: usize,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(
        text: impl Into<String>,
        font: impl Into<String>,
        size: f32,
        flags: u32,
        bbox: BBox,
        page: usize,
    ) -> Self {
        Self {
            text: text.into(),
            font: font.into(),
            size,
            flags,
            bbox,
            page,
        }
    }

    /// Whether the bold bit is set in the style flags.
    pub fn has_bold_flag(&self) -> bool {
        self.flags & FLAG_BOLD != 0
    }
}

/// A merged run of spans that may be a heading.
///
/// `level` stays `None` until the level classifier runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingCandidate {
    /// Merged text
    pub text: String,
    /// Zero-based page index
    pub page: usize,
    /// Top of the merged bounding box
    pub y: f32,
    /// Font size of the first span in the run
    pub font_size: f32,
    /// Heading score (diagnostic only)
    pub score: i32,
    /// Assigned heading level
    pub level: Option<super::HeadingLevel>,
}
