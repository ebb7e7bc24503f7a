//! Sections, heading levels and persisted document records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Heading level, H1 (most prominent) through H5.
///
/// Ordering follows prominence: `H1 < H2 < ... < H5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
}

impl HeadingLevel {
    /// All levels, most prominent first.
    pub const ALL: [HeadingLevel; 5] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
    ];

    /// Level for a zero-based font size rank. Ranks past H5 collapse into H5.
    pub fn from_rank(rank: usize) -> Self {
        Self::ALL[rank.min(Self::ALL.len() - 1)]
    }

    /// Numeric level (1-5).
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Label used in persisted records ("H1".."H5").
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
            HeadingLevel::H4 => "H4",
            HeadingLevel::H5 => "H5",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeadingLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "H1" | "1" => Ok(HeadingLevel::H1),
            "H2" | "2" => Ok(HeadingLevel::H2),
            "H3" | "3" => Ok(HeadingLevel::H3),
            "H4" | "4" => Ok(HeadingLevel::H4),
            "H5" | "5" => Ok(HeadingLevel::H5),
            other => Err(Error::Other(format!("Unknown heading level: {}", other))),
        }
    }
}

/// A finalized heading with its body content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text
    pub title: String,
    /// Heading level
    pub level: HeadingLevel,
    /// Zero-based page index
    pub page: usize,
    /// Body text following the heading (may be empty)
    #[serde(default)]
    pub content: String,
}

impl Section {
    /// Create a new section.
    pub fn new(
        title: impl Into<String>,
        level: HeadingLevel,
        page: usize,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            level,
            page,
            content: content.into(),
        }
    }
}

/// A previously processed document as persisted in a corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Original file name
    pub filename: String,
    /// Extracted sections, in reading order
    pub sections: Vec<Section>,
    /// Path of the source file when it was processed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl DocumentRecord {
    /// Create a new record.
    pub fn new(filename: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            filename: filename.into(),
            sections,
            file_path: None,
        }
    }

    /// Set the source file path.
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }
}

/// Listing entry for a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub filename: String,
    pub sections_count: usize,
    /// Modification time of the stored record
    pub uploaded_at: Option<DateTime<Utc>>,
}
