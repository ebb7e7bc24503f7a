//! Corpora of previously processed documents.
//!
//! The ranker reads documents through [`CorpusSource`] and rescans on every
//! query, so records added between queries are always seen. [`JsonCorpus`]
//! keeps one pretty-printed JSON record per document in a directory:
//!
//! ```json
//! {"filename": "report.pdf", "sections": [{"title": "1. Introduction",
//!   "level": "H1", "page": 0, "content": "..."}], "file_path": "uploads/report.pdf"}
//! ```

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::{DocumentRecord, DocumentSummary};

/// Anything that can list stored documents.
pub trait CorpusSource {
    /// All documents currently in the corpus.
    fn documents(&self) -> Result<Vec<DocumentRecord>>;
}

impl CorpusSource for [DocumentRecord] {
    fn documents(&self) -> Result<Vec<DocumentRecord>> {
        Ok(self.to_vec())
    }
}

impl CorpusSource for Vec<DocumentRecord> {
    fn documents(&self) -> Result<Vec<DocumentRecord>> {
        Ok(self.clone())
    }
}

/// A directory of `<filename>.json` document records.
#[derive(Debug, Clone)]
pub struct JsonCorpus {
    dir: PathBuf,
}

impl JsonCorpus {
    /// Corpus over an existing or future directory. Does not touch the disk.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Corpus over `dir`, creating it if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let corpus = Self::new(dir);
        fs::create_dir_all(&corpus.dir)?;
        Ok(corpus)
    }

    /// The corpus directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for a document name.
    pub fn record_path(&self, filename: &str) -> Result<PathBuf> {
        if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
            return Err(Error::Corpus(format!("invalid document name: {:?}", filename)));
        }
        Ok(self.dir.join(format!("{}.json", filename)))
    }

    /// Write a record, replacing any earlier one with the same filename.
    pub fn save(&self, record: &DocumentRecord) -> Result<PathBuf> {
        let path = self.record_path(&record.filename)?;
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)?;
        log::debug!("Saved {} sections to {}", record.sections.len(), path.display());
        Ok(path)
    }

    /// Read one record by document name.
    pub fn load(&self, filename: &str) -> Result<DocumentRecord> {
        let path = self.record_path(filename)?;
        if !path.is_file() {
            return Err(Error::DocumentNotFound(filename.to_string()));
        }
        read_record(&path)
    }

    /// Whether a record exists for a document name.
    pub fn contains(&self, filename: &str) -> bool {
        self.record_path(filename).is_ok_and(|p| p.is_file())
    }

    /// Listing of all readable records.
    pub fn summaries(&self) -> Result<Vec<DocumentSummary>> {
        let mut summaries = Vec::new();
        for path in self.record_files()? {
            match read_record(&path) {
                Ok(record) => summaries.push(DocumentSummary {
                    filename: record.filename,
                    sections_count: record.sections.len(),
                    uploaded_at: modified_at(&path),
                }),
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(summaries)
    }

    /// Record files in the directory, sorted by path.
    fn record_files(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| Error::Corpus(format!("cannot read {}: {}", self.dir.display(), e)))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"))
            .collect();
        files.sort();
        Ok(files)
    }
}

impl CorpusSource for JsonCorpus {
    fn documents(&self) -> Result<Vec<DocumentRecord>> {
        let files = self.record_files()?;
        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            match read_record(&path) {
                Ok(record) => documents.push(record),
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        log::debug!("Loaded {} documents from {}", documents.len(), self.dir.display());
        Ok(documents)
    }
}

fn read_record(path: &Path) -> Result<DocumentRecord> {
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, Section};

    #[test]
    fn test_in_memory_corpus() {
        let docs = vec![DocumentRecord::new(
            "a.pdf",
            vec![Section::new("Intro", HeadingLevel::H1, 0, "")],
        )];
        assert_eq!(docs.documents().unwrap().len(), 1);
        assert_eq!(docs.as_slice().documents().unwrap()[0].filename, "a.pdf");
    }

    #[test]
    fn test_record_path_rejects_separators() {
        let corpus = JsonCorpus::new("processed");
        assert!(corpus.record_path("../etc").is_err());
        assert!(corpus.record_path("").is_err());
        assert_eq!(
            corpus.record_path("report.pdf").unwrap(),
            Path::new("processed").join("report.pdf.json")
        );
    }

    #[test]
    fn test_missing_directory_is_corpus_error() {
        let corpus = JsonCorpus::new("/definitely/not/a/real/dir");
        assert!(matches!(corpus.documents(), Err(Error::Corpus(_))));
    }
}
