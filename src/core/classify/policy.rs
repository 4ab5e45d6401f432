//! Configured "do not translate" tables.

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::PatternTable;

/// A [`PatternTable`] with every regex compiled.
#[derive(Debug, Clone, Default)]
pub struct CompiledTable {
    entries: Vec<(Regex, Vec<Regex>)>,
}

impl CompiledTable {
    pub fn compile(table: &PatternTable, field: &str) -> Result<Self> {
        let entries = table
            .iter()
            .map(|(selector, patterns)| {
                let selector = Regex::new(selector)
                    .with_context(|| format!("Invalid regex in '{}': \"{}\"", field, selector))?;
                let patterns = patterns
                    .iter()
                    .map(|p| {
                        Regex::new(p)
                            .with_context(|| format!("Invalid regex in '{}': \"{}\"", field, p))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok((selector, patterns))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Only the first entry whose selector matches is consulted.
    pub fn first_match(&self, selector_text: &str, text: &str) -> bool {
        self.entries
            .iter()
            .find(|(selector, _)| selector.is_match(selector_text))
            .is_some_and(|(_, patterns)| patterns.iter().any(|p| p.is_match(text)))
    }

    /// Every entry whose selector matches is consulted.
    pub fn any_match(&self, selector_text: &str, text: &str) -> bool {
        self.entries.iter().any(|(selector, patterns)| {
            selector.is_match(selector_text) && patterns.iter().any(|p| p.is_match(text))
        })
    }
}

/// Unsafe-translation policy built from configuration.
#[derive(Debug, Clone, Default)]
pub struct UnsafePolicy {
    /// file name pattern -> extract path patterns
    structured: CompiledTable,
    /// file path pattern -> extract value patterns
    script: CompiledTable,
}

impl UnsafePolicy {
    pub fn new(structured: &PatternTable, script: &PatternTable) -> Result<Self> {
        Ok(Self {
            structured: CompiledTable::compile(structured, "unsafePathPatterns")?,
            script: CompiledTable::compile(script, "unsafeScriptPatterns")?,
        })
    }

    /// A structured-data extract is unsafe when the first table entry matching
    /// the file name lists a pattern matching the extract path.
    pub fn is_unsafe_structured(&self, file_name: &str, extract_path: &str) -> bool {
        self.structured.first_match(file_name, extract_path)
    }

    /// A script extract is unsafe when any table entry matching the file path
    /// lists a pattern matching the extract value.
    pub fn is_unsafe_script(&self, file_path: &str, value: &str) -> bool {
        self.script.any_match(file_path, value)
    }
}
