use anyhow::{Context, Result};
use serde_json::Value;

use crate::core::classify::Classifier;
use crate::core::data::{ExtractRecord, FileKind, FileRecord};
use crate::core::extract::{Extractor, FileExtraction};
use crate::core::node_path::NodePath;

/// Extractor for JSON data files.
pub struct StructuredExtractor<'a> {
    classifier: &'a Classifier,
}

impl<'a> StructuredExtractor<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        Self { classifier }
    }

    /// Extract candidates from an already parsed document.
    pub fn extract_value(&self, file: &FileRecord, document: &Value) -> FileExtraction {
        let mut extraction = FileExtraction::new(file.clone());
        self.walk(document, NodePath::root(), &mut extraction);
        extraction
    }

    fn walk(&self, node: &Value, path: NodePath, extraction: &mut FileExtraction) {
        match node {
            Value::String(text) => {
                extraction.admit(
                    self.classifier,
                    ExtractRecord::new(path.to_string(), text.clone()),
                );
            }
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.walk(item, path.index(index), extraction);
                }
            }
            Value::Object(map) => {
                for (key, value) in map {
                    self.walk(value, path.key(key.as_str()), extraction);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }
}

impl Extractor for StructuredExtractor<'_> {
    fn kind(&self) -> FileKind {
        FileKind::Structured
    }

    fn extract_source(&self, file: &FileRecord, content: &str) -> Result<FileExtraction> {
        let document: Value = serde_json::from_str(content)
            .with_context(|| format!("Failed to parse JSON file: {:?}", file.path))?;
        Ok(self.extract_value(file, &document))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::PatternTable;
    use crate::core::classify::{IgnoreReason, UnsafePolicy};
    use crate::core::extract::structured::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn extract(classifier: &Classifier, document: Value) -> FileExtraction {
        StructuredExtractor::new(classifier)
            .extract_value(&FileRecord::structured("www/data/Map001.json"), &document)
    }

    #[test]
    fn test_single_leaf() {
        let extraction = extract(&Classifier::default(), json!({"name": "こんにちは"}));
        assert_eq!(extraction.records.len(), 1);
        let record = &extraction.records[0];
        assert_eq!(record.path, "name");
        assert_eq!(record.value, "こんにちは");
        assert_eq!(record.is_unsafe, Some(false));
        assert_eq!(record.translated, None);
    }

    #[test]
    fn test_nested_paths_select_their_leaf() {
        let document = json!({
            "events": [null, {
                "name": "EV001",
                "pages": [{"list": [{"code": 401, "parameters": ["村人「こんにちは」", 0, true]}]}]
            }]
        });
        let extraction = extract(&Classifier::default(), document.clone());
        let paths: Vec<&str> = extraction.records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["events[1].pages[0].list[0].parameters[0]"]);

        let path: NodePath = paths[0].parse().unwrap();
        assert_eq!(path.select(&document), Some(&json!("村人「こんにちは」")));
    }

    #[test]
    fn test_ignored_candidates_are_kept_aside() {
        let extraction = extract(
            &Classifier::default(),
            json!({"a": "", "b": "English", "c": "a = はい", "d": "はい"}),
        );
        assert_eq!(extraction.records.len(), 1);
        let reasons: Vec<IgnoreReason> = extraction.ignored.iter().map(|(_, r)| *r).collect();
        assert_eq!(
            reasons,
            vec![
                IgnoreReason::Blank,
                IgnoreReason::NoSourceText,
                IgnoreReason::ScriptCode
            ]
        );
    }

    #[test]
    fn test_unsafe_candidates_are_flagged() {
        let classifier = Classifier::new(
            Vec::new(),
            UnsafePolicy::new(
                &PatternTable::from_iter([(r"^Map\d+\.json$", vec![r"^note$"])]),
                &PatternTable::default(),
            )
            .unwrap(),
        );
        let extraction = extract(&classifier, json!({"note": "メモ", "displayName": "村"}));
        assert_eq!(extraction.unsafe_records().count(), 1);
        assert_eq!(extraction.safe().next().unwrap().path, "displayName");
    }

    #[test]
    fn test_bracketed_keys() {
        let extraction = extract(&Classifier::default(), json!({"Actor Name": "アリス"}));
        assert_eq!(extraction.records[0].path, "['Actor Name']");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result = StructuredExtractor::new(&Classifier::default())
            .extract_source(&FileRecord::structured("bad.json"), "{\"a\": ");
        assert!(result.is_err());
    }
}
