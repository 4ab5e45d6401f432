//! Records shared by the extractors, the orchestrator and the store.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::utils::trim_quotes;

/// Kind of a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    /// A JSON data file (maps, events, database tables).
    Structured,
    /// A JavaScript plugin or engine file.
    Script,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Structured => write!(f, "structured"),
            FileKind::Script => write!(f, "script"),
        }
    }
}

/// A staged file handed over by the file-staging collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileRecord {
    pub path: PathBuf,
    pub kind: FileKind,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, kind: FileKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn structured(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileKind::Structured)
    }

    pub fn script(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileKind::Script)
    }

    /// Key of this file in the store maps.
    pub fn key(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    /// Bare file name, used in instructions and script extract paths.
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// One candidate piece of source-language text with its locator and translation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRecord {
    /// Original text as matched. Script literals keep their quotes.
    pub value: String,
    /// Locator unique within the file: a node path for structured data,
    /// `file:line:column` for scripts.
    pub path: String,
    #[serde(default)]
    pub translated: Option<String>,
    #[serde(default, rename = "unsafe", skip_serializing_if = "Option::is_none")]
    pub is_unsafe: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ExtractRecord {
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            path: path.into(),
            translated: None,
            is_unsafe: None,
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_translation(mut self, translated: impl Into<String>) -> Self {
        self.translated = Some(translated.into());
        self
    }

    pub fn is_unsafe(&self) -> bool {
        self.is_unsafe.unwrap_or(false)
    }

    pub fn has_translation(&self) -> bool {
        self.translated
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Translation as it should be compared or substituted, without script quotes.
    pub fn translated_text(&self, kind: FileKind) -> Option<&str> {
        match kind {
            FileKind::Structured => self.translated.as_deref(),
            FileKind::Script => self.translated.as_deref().map(trim_quotes),
        }
    }
}

/// extract path -> record
pub type FileExtracts = BTreeMap<String, ExtractRecord>;

/// Every stored extract of one project root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameTranslation {
    #[serde(default)]
    pub structured_files: BTreeMap<String, FileExtracts>,
    #[serde(default)]
    pub script_files: BTreeMap<String, FileExtracts>,
    #[serde(default)]
    pub ignored_unsafe: BTreeSet<String>,
}

impl GameTranslation {
    pub fn files(&self, kind: FileKind) -> &BTreeMap<String, FileExtracts> {
        match kind {
            FileKind::Structured => &self.structured_files,
            FileKind::Script => &self.script_files,
        }
    }

    pub fn files_mut(&mut self, kind: FileKind) -> &mut BTreeMap<String, FileExtracts> {
        match kind {
            FileKind::Structured => &mut self.structured_files,
            FileKind::Script => &mut self.script_files,
        }
    }

    pub fn get(&self, kind: FileKind, file: &str, path: &str) -> Option<&ExtractRecord> {
        self.files(kind).get(file).and_then(|extracts| extracts.get(path))
    }

    /// Every record with its kind and file, structured files first.
    pub fn records(&self) -> impl Iterator<Item = (FileKind, &str, &ExtractRecord)> {
        self.structured_files
            .iter()
            .flat_map(|(file, extracts)| {
                extracts
                    .values()
                    .map(move |r| (FileKind::Structured, file.as_str(), r))
            })
            .chain(self.script_files.iter().flat_map(|(file, extracts)| {
                extracts
                    .values()
                    .map(move |r| (FileKind::Script, file.as_str(), r))
            }))
    }

    /// Mutable counterpart of [`GameTranslation::records`].
    pub fn records_mut(&mut self) -> impl Iterator<Item = (FileKind, &str, &mut ExtractRecord)> {
        self.structured_files
            .iter_mut()
            .flat_map(|(file, extracts)| {
                extracts
                    .values_mut()
                    .map(move |r| (FileKind::Structured, file.as_str(), r))
            })
            .chain(self.script_files.iter_mut().flat_map(|(file, extracts)| {
                extracts
                    .values_mut()
                    .map(move |r| (FileKind::Script, file.as_str(), r))
            }))
    }

    /// Remove every record for which `remove` returns true. Returns the number removed.
    pub fn retain_records<F>(&mut self, mut remove: F) -> usize
    where
        F: FnMut(FileKind, &str, &mut ExtractRecord) -> bool,
    {
        let mut removed = 0;
        for kind in [FileKind::Structured, FileKind::Script] {
            for (file, extracts) in self.files_mut(kind).iter_mut() {
                let before = extracts.len();
                extracts.retain(|_, record| !remove(kind, file, record));
                removed += before - extracts.len();
            }
        }
        removed
    }

    pub fn record_count(&self) -> usize {
        self.records().count()
    }
}

/// The persisted document: project root -> its translations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translations(pub BTreeMap<String, GameTranslation>);

impl Translations {
    pub fn game(&self, project_root: &str) -> Option<&GameTranslation> {
        self.0.get(project_root)
    }

    pub fn game_mut(&mut self, project_root: &str) -> Option<&mut GameTranslation> {
        self.0.get_mut(project_root)
    }

    pub fn game_or_default(&mut self, project_root: &str) -> &mut GameTranslation {
        self.0.entry(project_root.to_string()).or_default()
    }
}
