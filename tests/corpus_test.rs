//! Integration tests for the JSON corpus store.

use std::fs;

use outliner::{
    BBox, CorpusSource, DocumentRecord, Error, HeadingLevel, JsonCorpus, LayoutDump, Outliner,
    Section, TextSpan, TierPreference,
};
use tempfile::TempDir;

fn record(name: &str, titles: &[&str]) -> DocumentRecord {
    DocumentRecord::new(
        name,
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| Section::new(*t, HeadingLevel::H1, i, "body"))
            .collect(),
    )
}

#[test]
fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let corpus = JsonCorpus::create(dir.path().join("processed")).unwrap();

    let original = record("report.pdf", &["Introduction", "Method"]).with_file_path("uploads/report.pdf");
    let path = corpus.save(&original).unwrap();
    assert!(path.ends_with("report.pdf.json"));
    assert!(corpus.contains("report.pdf"));

    let loaded = corpus.load("report.pdf").unwrap();
    assert_eq!(loaded, original);

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"level\": \"H1\""));
    assert!(raw.contains("\"file_path\": \"uploads/report.pdf\""));
}

#[test]
fn test_load_missing_document() {
    let dir = TempDir::new().unwrap();
    let corpus = JsonCorpus::create(dir.path()).unwrap();
    assert!(matches!(corpus.load("ghost.pdf"), Err(Error::DocumentNotFound(_))));
    assert!(!corpus.contains("ghost.pdf"));
}

#[test]
fn test_documents_skip_bad_records() {
    let dir = TempDir::new().unwrap();
    let corpus = JsonCorpus::create(dir.path()).unwrap();
    corpus.save(&record("b.pdf", &["Second"])).unwrap();
    corpus.save(&record("a.pdf", &["First"])).unwrap();
    fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let documents = corpus.documents().unwrap();
    let names: Vec<_> = documents.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "b.pdf"]);
}

#[test]
fn test_records_without_optional_fields() {
    let dir = TempDir::new().unwrap();
    let corpus = JsonCorpus::create(dir.path()).unwrap();
    fs::write(
        dir.path().join("legacy.pdf.json"),
        r#"{"filename":"legacy.pdf","sections":[{"title":"Overview","level":"H2","page":4}]}"#,
    )
    .unwrap();

    let loaded = corpus.load("legacy.pdf").unwrap();
    assert_eq!(loaded.sections[0].level, HeadingLevel::H2);
    assert_eq!(loaded.sections[0].content, "");
    assert!(loaded.file_path.is_none());
}

#[test]
fn test_summaries() {
    let dir = TempDir::new().unwrap();
    let corpus = JsonCorpus::create(dir.path()).unwrap();
    corpus.save(&record("one.pdf", &["A heading", "Another heading", "Third heading"])).unwrap();
    corpus.save(&record("two.pdf", &[])).unwrap();

    let summaries = corpus.summaries().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].filename, "one.pdf");
    assert_eq!(summaries[0].sections_count, 3);
    assert_eq!(summaries[1].sections_count, 0);
    assert!(summaries.iter().all(|s| s.uploaded_at.is_some()));
}

#[test]
fn test_updates_seen_without_reopening() {
    let dir = TempDir::new().unwrap();
    let corpus = JsonCorpus::create(dir.path()).unwrap();
    assert!(corpus.documents().unwrap().is_empty());

    corpus.save(&record("late.pdf", &["Arrived later"])).unwrap();
    assert_eq!(corpus.documents().unwrap().len(), 1);

    corpus.save(&record("late.pdf", &["Arrived later", "Revised"])).unwrap();
    assert_eq!(corpus.documents().unwrap()[0].sections.len(), 2);
}

#[test]
fn test_ingest_extracts_and_stores() {
    let dir = TempDir::new().unwrap();
    let dump = LayoutDump::from_spans(vec![TextSpan::new(
        "Results and Discussion",
        "Arial-Bold",
        16.0,
        0,
        BBox::new(0.0, 0.0, 200.0, 16.0),
        0,
    )])
    .with_page_text(0, "Results and Discussion\nThe trend held.");
    let input = dir.path().join("study.json");
    fs::write(&input, serde_json::to_string(&dump).unwrap()).unwrap();

    let corpus = JsonCorpus::create(dir.path().join("processed")).unwrap();
    let analyzer = Outliner::new().with_tier(TierPreference::Overlap).build();
    let record = analyzer.ingest(&input, &corpus).unwrap();

    assert_eq!(record.filename, "study.json");
    assert_eq!(record.sections[0].content, "The trend held.");
    assert_eq!(corpus.load("study.json").unwrap(), record);

    assert!(analyzer.ingest(dir.path().join("absent.json"), &corpus).is_err());
}
