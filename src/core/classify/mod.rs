//! Safety classification of extracted text.
//!
//! Three independent judgments feed the verdict of a candidate:
//!
//! - `code`: is the value a script snippet rather than displayable text
//! - `policy`: does configuration mark the extract as unsafe to translate
//! - [`Classifier::classify`]: the ordered verdict table combining both with
//!   the emptiness and comment checks
//!
//! Every judgment is a pure function of its inputs and the configuration, so
//! stored verdicts can always be recomputed by the cleanup routines.

pub mod code;
pub mod policy;

use std::{fmt, path::Path};

use anyhow::Result;

use crate::config::Config;
use crate::core::data::{ExtractRecord, FileKind, file_name_of};
use crate::utils::is_japanese;

pub use code::{CODE_RULES, CodeRule, is_script_code};
pub use policy::UnsafePolicy;

/// Why a candidate is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// Empty or whitespace-only value.
    Blank,
    /// Every Japanese character sits inside a line comment (or there is none).
    NoSourceText,
    /// The value is script code.
    ScriptCode,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::Blank => write!(f, "blank"),
            IgnoreReason::NoSourceText => write!(f, "no source text"),
            IgnoreReason::ScriptCode => write!(f, "script code"),
        }
    }
}

/// Classification outcome of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Safe,
    Unsafe,
    Ignore(IgnoreReason),
}

impl Verdict {
    pub fn is_ignore(&self) -> bool {
        matches!(self, Verdict::Ignore(_))
    }
}

/// Inputs of one classification.
pub struct Candidate<'a> {
    pub kind: FileKind,
    pub file_path: &'a str,
    pub record: &'a ExtractRecord,
}

/// One row of the verdict table.
struct VerdictRule {
    applies: fn(&Classifier, &Candidate) -> bool,
    verdict: Verdict,
}

/// Ordered verdict table; the first applicable row decides, otherwise Safe.
const VERDICT_RULES: &[VerdictRule] = &[
    VerdictRule {
        applies: |_, c| c.record.value.trim().is_empty(),
        verdict: Verdict::Ignore(IgnoreReason::Blank),
    },
    VerdictRule {
        applies: |_, c| !has_source_text_outside_comment(&c.record.value),
        verdict: Verdict::Ignore(IgnoreReason::NoSourceText),
    },
    VerdictRule {
        applies: |classifier, c| classifier.is_script_code(&c.record.value),
        verdict: Verdict::Ignore(IgnoreReason::ScriptCode),
    },
    VerdictRule {
        applies: |classifier, c| classifier.is_unsafe(c.kind, c.file_path, c.record),
        verdict: Verdict::Unsafe,
    },
];

/// True if some Japanese character appears before the first `//`.
pub fn has_source_text_outside_comment(value: &str) -> bool {
    let comment_start = value.find("//").unwrap_or(value.len());
    value[..comment_start].chars().any(is_japanese)
}

/// Classifier built once per run from configuration.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    code_whitelist: Vec<String>,
    policy: UnsafePolicy,
}

impl Classifier {
    pub fn new(code_whitelist: Vec<String>, policy: UnsafePolicy) -> Self {
        Self {
            code_whitelist,
            policy,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.script_code_whitelist.clone(),
            UnsafePolicy::new(&config.unsafe_path_patterns, &config.unsafe_script_patterns)?,
        ))
    }

    pub fn is_script_code(&self, value: &str) -> bool {
        is_script_code(value, &self.code_whitelist)
    }

    /// Structured extracts are judged by file name and extract path, script
    /// extracts by file path and extract value.
    pub fn is_unsafe(&self, kind: FileKind, file_path: &str, record: &ExtractRecord) -> bool {
        match kind {
            FileKind::Structured => self
                .policy
                .is_unsafe_structured(&file_name_of(Path::new(file_path)), &record.path),
            FileKind::Script => self.policy.is_unsafe_script(file_path, &record.value),
        }
    }

    pub fn classify(&self, kind: FileKind, file_path: &str, record: &ExtractRecord) -> Verdict {
        let candidate = Candidate {
            kind,
            file_path,
            record,
        };
        VERDICT_RULES
            .iter()
            .find(|rule| (rule.applies)(self, &candidate))
            .map(|rule| rule.verdict)
            .unwrap_or(Verdict::Safe)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::PatternTable;
    use crate::core::classify::*;

    fn classifier() -> Classifier {
        Classifier::new(
            vec!["$gameVariables".to_string()],
            UnsafePolicy::new(
                &PatternTable::from_iter([(r"^System\.json$", vec![r"^switches"])]),
                &PatternTable::from_iter([(r"plugins\.js$", vec!["効果音"])]),
            )
            .unwrap(),
        )
    }

    fn verdict(kind: FileKind, file: &str, path: &str, value: &str) -> Verdict {
        classifier().classify(kind, file, &ExtractRecord::new(path, value))
    }

    #[test]
    fn test_safe_dialogue() {
        assert_eq!(
            verdict(FileKind::Structured, "data/Map001.json", "name", "こんにちは"),
            Verdict::Safe
        );
    }

    #[test]
    fn test_blank_is_ignored() {
        assert_eq!(
            verdict(FileKind::Structured, "data/Map001.json", "name", "   "),
            Verdict::Ignore(IgnoreReason::Blank)
        );
    }

    #[test]
    fn test_comment_only_japanese_is_ignored() {
        assert_eq!(
            verdict(FileKind::Structured, "a.json", "note", "value // メモ"),
            Verdict::Ignore(IgnoreReason::NoSourceText)
        );
        assert_eq!(
            verdict(FileKind::Structured, "a.json", "note", "English only"),
            Verdict::Ignore(IgnoreReason::NoSourceText)
        );
    }

    #[test]
    fn test_code_is_ignored() {
        assert_eq!(
            verdict(
                FileKind::Structured,
                "a.json",
                "list[0].parameters[0]",
                "var x = \"こんにちは\"; // c"
            ),
            Verdict::Ignore(IgnoreReason::ScriptCode)
        );
    }

    #[test]
    fn test_code_rule_wins_over_unsafe() {
        assert_eq!(
            verdict(FileKind::Structured, "System.json", "switches[1]", "a = スイッチ"),
            Verdict::Ignore(IgnoreReason::ScriptCode)
        );
    }

    #[test]
    fn test_unsafe_by_path_and_value() {
        assert_eq!(
            verdict(FileKind::Structured, "www/data/System.json", "switches[1]", "スイッチ"),
            Verdict::Unsafe
        );
        assert_eq!(
            verdict(FileKind::Script, "www/js/plugins.js", "plugins.js:1:0", "\"効果音\""),
            Verdict::Unsafe
        );
        assert_eq!(
            verdict(FileKind::Script, "www/js/other.js", "other.js:1:0", "\"効果音\""),
            Verdict::Safe
        );
    }

    #[test]
    fn test_has_source_text_outside_comment() {
        assert!(has_source_text_outside_comment("はい // yes"));
        assert!(!has_source_text_outside_comment("yes // はい"));
        assert!(!has_source_text_outside_comment(""));
    }
}
