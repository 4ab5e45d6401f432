//! Discovery of game files worth extracting.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::data::{FileKind, FileRecord};
use crate::utils::contains_japanese;

/// Patterns without `*` or `?` are literal paths relative to the base directory.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Which files a scan keeps.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    script_patterns: Vec<Regex>,
    literal_ignores: Vec<PathBuf>,
    glob_ignores: Vec<Pattern>,
}

impl ScanFilter {
    pub fn new(base_dir: &Path, script_patterns: &[String], ignores: &[String]) -> Result<Self> {
        let script_patterns = script_patterns
            .iter()
            .map(|p| {
                Regex::new(p)
                    .with_context(|| format!("Invalid regex in 'scriptFilePatterns': \"{}\"", p))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut literal_ignores = Vec::new();
        let mut glob_ignores = Vec::new();
        for p in ignores {
            if is_glob_pattern(p) {
                glob_ignores.push(
                    Pattern::new(p)
                        .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", p))?,
                );
            } else {
                literal_ignores.push(base_dir.join(p));
            }
        }

        Ok(Self {
            script_patterns,
            literal_ignores,
            glob_ignores,
        })
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.literal_ignores.iter().any(|ignored| path.starts_with(ignored))
            || self.glob_ignores.iter().any(|p| p.matches(&path_str))
    }

    /// Kind of a file by name alone. Scripts must match a configured pattern.
    pub fn kind_of(&self, path: &Path) -> Option<FileKind> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(FileKind::Structured),
            Some("js") => {
                let path_str = path.to_string_lossy();
                self.script_patterns
                    .iter()
                    .any(|p| p.is_match(&path_str))
                    .then_some(FileKind::Script)
            }
            _ => None,
        }
    }
}

/// Result of scanning files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Candidate files holding source-language text, sorted by path.
    pub files: Vec<FileRecord>,
    /// Paths that could not be walked or read.
    pub skipped_count: usize,
}

/// Walk `roots` (files or directories) and keep the files whose kind is
/// known and whose content contains source-language text.
pub fn scan_files(roots: &[PathBuf], filter: &ScanFilter) -> ScanResult {
    let mut skipped_count = 0;
    let mut candidates: BTreeSet<FileRecord> = BTreeSet::new();

    for root in roots {
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    warn!("Cannot access path: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || filter.is_ignored(path) {
                continue;
            }
            if let Some(kind) = filter.kind_of(path) {
                candidates.insert(FileRecord::new(path, kind));
            }
        }
    }

    let checked: Vec<(FileRecord, Option<bool>)> = candidates
        .into_par_iter()
        .map(|file| {
            let has_text = match fs::read_to_string(&file.path) {
                Ok(content) => Some(contains_japanese(&content)),
                Err(e) => {
                    warn!("Cannot read {:?}: {}", file.path, e);
                    None
                }
            };
            (file, has_text)
        })
        .collect();

    let mut files = Vec::new();
    for (file, has_text) in checked {
        match has_text {
            Some(true) => files.push(file),
            Some(false) => debug!("No source text in {:?}", file.path),
            None => skipped_count += 1,
        }
    }

    ScanResult {
        files,
        skipped_count,
    }
}
