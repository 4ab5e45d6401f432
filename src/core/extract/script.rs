use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::core::classify::Classifier;
use crate::core::data::{ExtractRecord, FileKind, FileRecord};
use crate::core::extract::{Extractor, FileExtraction};
use crate::utils::SOURCE_SCRIPT_CLASS;

/// A double-quoted run of Japanese characters.
static SCRIPT_LITERAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("\"[{}]+\"", SOURCE_SCRIPT_CLASS)).unwrap());

/// Extractor for JavaScript plugin and engine files.
pub struct ScriptExtractor<'a> {
    classifier: &'a Classifier,
}

impl<'a> ScriptExtractor<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        Self { classifier }
    }
}

impl Extractor for ScriptExtractor<'_> {
    fn kind(&self) -> FileKind {
        FileKind::Script
    }

    fn extract_source(&self, file: &FileRecord, content: &str) -> Result<FileExtraction> {
        let file_name = file.file_name();
        let mut extraction = FileExtraction::new(file.clone());

        for (line_index, line) in content.lines().enumerate() {
            // physical lines, blank ones included
            let line_number = line_index + 1;
            for found in SCRIPT_LITERAL_REGEX.find_iter(line) {
                let column = line[..found.start()].chars().count();
                let record = ExtractRecord::new(
                    format!("{}:{}:{}", file_name, line_number, column),
                    found.as_str(),
                )
                .at(line_number, column);
                extraction.admit(self.classifier, record);
            }
        }

        Ok(extraction)
    }
}
