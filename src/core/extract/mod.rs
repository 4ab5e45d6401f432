//! String extraction from staged game files.
//!
//! - `structured`: walks a parsed JSON data file and yields every string leaf
//! - `script`: scans JavaScript source line by line for quoted Japanese literals
//!
//! Both run every candidate through the [`Classifier`]. Ignored candidates are
//! kept aside for reporting only; they never reach the store.

pub mod script;
pub mod structured;

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::classify::{Classifier, IgnoreReason, Verdict};
use crate::core::data::{ExtractRecord, FileKind, FileRecord};

pub use script::ScriptExtractor;
pub use structured::StructuredExtractor;

/// Candidates found in one file, split by verdict.
#[derive(Debug, Clone)]
pub struct FileExtraction {
    pub file: FileRecord,
    /// Safe and Unsafe candidates in document order, `unsafe` set on each.
    pub records: Vec<ExtractRecord>,
    pub ignored: Vec<(ExtractRecord, IgnoreReason)>,
}

impl FileExtraction {
    pub fn new(file: FileRecord) -> Self {
        Self {
            file,
            records: Vec::new(),
            ignored: Vec::new(),
        }
    }

    pub fn safe(&self) -> impl Iterator<Item = &ExtractRecord> {
        self.records.iter().filter(|r| !r.is_unsafe())
    }

    pub fn unsafe_records(&self) -> impl Iterator<Item = &ExtractRecord> {
        self.records.iter().filter(|r| r.is_unsafe())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Classify a candidate and file it under its verdict.
    pub(crate) fn admit(&mut self, classifier: &Classifier, mut record: ExtractRecord) {
        let file_path = self.file.key();
        match classifier.classify(self.file.kind, &file_path, &record) {
            Verdict::Ignore(reason) => {
                debug!("Ignoring {} in {}: {}", record.path, file_path, reason);
                self.ignored.push((record, reason));
            }
            verdict => {
                record.is_unsafe = Some(verdict == Verdict::Unsafe);
                self.records.push(record);
            }
        }
    }
}

/// A file-kind specific extractor.
pub trait Extractor {
    fn kind(&self) -> FileKind;

    /// Extract candidates from file content already in memory.
    fn extract_source(&self, file: &FileRecord, content: &str) -> Result<FileExtraction>;

    fn extract_file(&self, file: &FileRecord) -> Result<FileExtraction> {
        let content = read_source(&file.path)?;
        self.extract_source(file, &content)
    }
}

/// Read a staged file as UTF-8, dropping a leading byte order mark.
pub fn read_source(path: &Path) -> Result<String> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Extract one staged file with the extractor matching its kind.
pub fn extract_file(classifier: &Classifier, file: &FileRecord) -> Result<FileExtraction> {
    match file.kind {
        FileKind::Structured => StructuredExtractor::new(classifier).extract_file(file),
        FileKind::Script => ScriptExtractor::new(classifier).extract_file(file),
    }
}
