//! Integration tests for outline extraction.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use outliner::backend::{BackendRegistry, LayoutBackend, LayoutDocument};
use outliner::error::Result;
use outliner::{
    extract_sections, BBox, HeadingLevel, LayoutDump, OutlineOptions, SectionExtractor, TextSpan,
    FLAG_BOLD,
};
use tempfile::TempDir;

fn span(text: &str, font: &str, size: f32, x0: f32, y0: f32, page: usize) -> TextSpan {
    TextSpan::new(text, font, size, 0, BBox::new(x0, y0, x0 + 150.0, y0 + size), page)
}

fn write_dump(dir: &TempDir, name: &str, dump: &LayoutDump) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string(dump).unwrap()).unwrap();
    path
}

#[test]
fn test_single_bold_heading_from_json_record() {
    let dir = TempDir::new().unwrap();
    let json = r#"{"pages":[{"spans":[{"text":"1. Introduction","font":"Arial-Bold","size":14,"flags":16,"bbox":[0,0,100,12],"page":0}]}]}"#;
    let path = dir.path().join("intro.json");
    fs::write(&path, json).unwrap();

    let sections = extract_sections(&path);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].title, "1. Introduction");
    assert_eq!(sections[0].level, HeadingLevel::H1);
    assert_eq!(sections[0].page, 0);
}

#[test]
fn test_every_level_has_title() {
    let dir = TempDir::new().unwrap();
    let sizes = [28.0, 22.0, 18.0, 15.0, 13.0, 11.0, 9.0];
    let spans: Vec<_> = sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| span(&format!("Heading number {}", i), "Helvetica", size, 0.0, i as f32 * 60.0, 0))
        .collect();
    let path = write_dump(&dir, "levels.json", &LayoutDump::from_spans(spans));

    let sections = extract_sections(&path);
    assert_eq!(sections.len(), sizes.len());
    for section in &sections {
        assert!(HeadingLevel::ALL.contains(&section.level));
        assert!(!section.title.is_empty());
    }
    // Largest size is H1, everything past the fourth size shares H5
    assert_eq!(sections[0].level, HeadingLevel::H1);
    assert_eq!(sections[4].level, HeadingLevel::H5);
    assert_eq!(sections[6].level, HeadingLevel::H5);
}

#[test]
fn test_split_heading_is_rejoined() {
    let dir = TempDir::new().unwrap();
    let spans = vec![
        span("Chapter", "Times-Bold", 18.0, 0.0, 0.0, 0),
        span("1: Overview", "Times-Bold", 18.0, 0.0, 20.0, 0),
    ];
    let path = write_dump(&dir, "split.json", &LayoutDump::from_spans(spans));

    let sections = extract_sections(&path);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].title, "Chapter 1: Overview");
}

#[test]
fn test_fragment_on_same_line_is_absorbed() {
    let dir = TempDir::new().unwrap();
    let spans = vec![
        span("Background of", "Arial", 16.0, 0.0, 100.0, 0),
        span("the work", "Arial", 16.0, 160.0, 100.0, 0),
        span("Unrelated body line", "Arial", 10.0, 0.0, 300.0, 0),
    ];
    let path = write_dump(&dir, "fragment.json", &LayoutDump::from_spans(spans));

    let titles: Vec<_> = extract_sections(&path).into_iter().map(|s| s.title).collect();
    assert_eq!(titles, vec!["Background of the work", "Unrelated body line"]);
}

#[test]
fn test_decorative_lines_dropped() {
    let dir = TempDir::new().unwrap();
    let spans = vec![
        span("* * * * *", "Arial", 14.0, 0.0, 0.0, 0),
        span("Real heading", "Arial", 14.0, 0.0, 100.0, 0),
    ];
    let path = write_dump(&dir, "noise.json", &LayoutDump::from_spans(spans));

    let sections = extract_sections(&path);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].title, "Real heading");
}

#[test]
fn test_content_comes_from_same_page() {
    let dir = TempDir::new().unwrap();
    let dump = LayoutDump::from_spans(vec![
        span("Methods", "Arial", 16.0, 0.0, 0.0, 0),
        span("Results", "Arial", 16.0, 0.0, 0.0, 1),
    ])
    .with_page_text(0, "Methods\nWe measured twice.\nThen once more.")
    .with_page_text(1, "Results\nBoth runs agreed.");
    let path = write_dump(&dir, "content.json", &dump);

    let sections = extract_sections(&path);
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].content, "We measured twice.\nThen once more.");
    assert_eq!(sections[1].page, 1);
    assert_eq!(sections[1].content, "Both runs agreed.");
}

#[test]
fn test_content_falls_back_to_page_prefix() {
    let dir = TempDir::new().unwrap();
    let dump = LayoutDump::from_spans(vec![span("Summary", "Arial", 16.0, 0.0, 0.0, 0)])
        .with_page_text(0, "No heading text on this page at all.");
    let path = write_dump(&dir, "fallback.json", &dump);

    let sections = extract_sections(&path);
    assert_eq!(sections[0].content, "No heading text on this page at all.");
}

#[test]
fn test_content_found_for_decomposed_heading() {
    let dir = TempDir::new().unwrap();
    let dump = LayoutDump::from_spans(vec![span("Re\u{301}sume\u{301} of work", "Arial", 16.0, 0.0, 0.0, 0)])
        .with_page_text(0, "Header line\nRe\u{301}sume\u{301} of work\nBody after heading.");
    let path = write_dump(&dir, "decomposed.json", &dump);

    let sections = extract_sections(&path);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].title, "R\u{e9}sum\u{e9} of work");
    assert_eq!(sections[0].content, "Body after heading.");
}

#[test]
fn test_bold_flag_spans_score_higher() {
    let dir = TempDir::new().unwrap();
    let mut bold = span("Key Findings", "Arial", 12.0, 0.0, 0.0, 0);
    bold.flags = FLAG_BOLD;
    let plain = span("Key Findings", "Arial", 12.0, 0.0, 100.0, 0);
    let path = write_dump(&dir, "bold.json", &LayoutDump::from_spans(vec![bold, plain]));

    let candidates = SectionExtractor::new().candidates(&path).unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].score - candidates[1].score, 8);
}

// Extraction failures and heading-free documents look the same through the
// infallible entry point; try_extract tells them apart.
#[test]
fn test_failures_degrade_to_empty_outline() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(extract_sections(&missing).is_empty());
    assert!(SectionExtractor::new().try_extract(&missing).is_err());

    let malformed = dir.path().join("malformed.json");
    fs::write(&malformed, "{ not json").unwrap();
    assert!(extract_sections(&malformed).is_empty());
    assert!(SectionExtractor::new().try_extract(&malformed).is_err());

    let empty = write_dump(&dir, "empty.json", &LayoutDump::new());
    assert!(extract_sections(&empty).is_empty());
    assert!(SectionExtractor::new().try_extract(&empty).unwrap().is_empty());

    assert!(extract_sections(dir.path().join("notes.docx")).is_empty());
}

#[test]
fn test_extract_many_matches_single_extraction() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<_> = (0..4)
        .map(|i| {
            let spans = vec![span(&format!("Document {} title", i), "Arial", 18.0, 0.0, 0.0, 0)];
            write_dump(&dir, &format!("doc{}.json", i), &LayoutDump::from_spans(spans))
        })
        .collect();

    let extractor = SectionExtractor::new();
    let batch = extractor.extract_many(&paths);
    assert_eq!(batch.len(), 4);
    for (path, sections) in &batch {
        assert_eq!(sections, &extractor.extract(path));
    }

    let sequential = SectionExtractor::new().with_options(OutlineOptions::default().sequential());
    assert_eq!(sequential.extract_many(&paths), batch);
}

/// Backend that serves a fixed dump for any `.mock` path.
struct MockBackend;

impl LayoutBackend for MockBackend {
    fn supported_extensions(&self) -> &[&str] {
        &["mock"]
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn open(&self, _path: &Path) -> Result<Box<dyn LayoutDocument>> {
        Ok(Box::new(LayoutDump::from_spans(vec![span(
            "Mock Heading",
            "Arial",
            20.0,
            0.0,
            0.0,
            0,
        )])))
    }
}

#[test]
fn test_custom_backend() {
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(MockBackend));
    assert!(registry.supports("MOCK"));

    let extractor = SectionExtractor::new().with_registry(registry);
    let sections = extractor.extract("anything.mock");
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].title, "Mock Heading");
    assert!(extractor.extract("anything.json").is_empty());
}
