//! Cleanup passes over stored translations.
//!
//! Each pass edits the whole project snapshot in memory and persists once.

use std::{fmt, str::FromStr};

use anyhow::{Result, bail};
use tracing::info;

use crate::config::ReplaceRule;
use crate::core::classify::Classifier;
use crate::core::data::{FileKind, GameTranslation};
use crate::core::store::TranslationStore;
use crate::utils::{is_all_japanese, quote_wrap, trim_quotes};

/// Maintenance passes, in the order a full cleanup runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CleanupRule {
    Untranslated,
    Code,
    Unsafe,
    Replace,
    Inconsistencies,
    Names,
}

impl CleanupRule {
    pub const ALL: [CleanupRule; 6] = [
        CleanupRule::Untranslated,
        CleanupRule::Code,
        CleanupRule::Unsafe,
        CleanupRule::Replace,
        CleanupRule::Inconsistencies,
        CleanupRule::Names,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CleanupRule::Untranslated => "untranslated",
            CleanupRule::Code => "code",
            CleanupRule::Unsafe => "unsafe",
            CleanupRule::Replace => "replace",
            CleanupRule::Inconsistencies => "inconsistencies",
            CleanupRule::Names => "names",
        }
    }
}

impl fmt::Display for CleanupRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CleanupRule {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match CleanupRule::ALL.iter().find(|rule| rule.name() == s) {
            Some(rule) => Ok(*rule),
            None => bail!("Unknown cleanup rule: {}", s),
        }
    }
}

/// Remove records without a translation or whose translation is still
/// entirely Japanese.
pub fn remove_untranslated(game: &mut GameTranslation) -> usize {
    game.retain_records(|kind, _, record| {
        record
            .translated_text(kind)
            .is_none_or(is_all_japanese)
    })
}

/// Remove records whose original value is script code.
pub fn remove_code_like(game: &mut GameTranslation, classifier: &Classifier) -> usize {
    game.retain_records(|_, _, record| classifier.is_script_code(&record.value))
}

/// Remove records the unsafe policy now rejects.
///
/// Script records are also removed when their unquoted value was recorded as
/// unsafe in structured data, and the translations of the survivors are
/// normalized to quoted literals.
pub fn remove_configured_unsafe(game: &mut GameTranslation, classifier: &Classifier) -> usize {
    let ignored = game.ignored_unsafe.clone();
    game.retain_records(|kind, file, record| {
        if classifier.is_unsafe(kind, file, record) {
            return true;
        }
        if kind == FileKind::Script {
            if ignored.contains(trim_quotes(&record.value)) {
                return true;
            }
            if let Some(translated) = record.translated.as_mut()
                && !(translated.len() >= 2 && translated.starts_with('"') && translated.ends_with('"'))
            {
                *translated = quote_wrap(translated);
            }
        }
        false
    })
}

/// Apply the first rule whose `from` occurs in `text`. Later rules are never
/// consulted, even when they would match too.
pub fn replace_translation(text: &str, rules: &[ReplaceRule]) -> Option<String> {
    rules
        .iter()
        .find(|rule| !rule.from.is_empty() && text.contains(&rule.from))
        .map(|rule| text.replace(&rule.from, &rule.to))
}

/// Apply configured replacements to every translation. Returns the number changed.
pub fn apply_replacements(game: &mut GameTranslation, rules: &[ReplaceRule]) -> usize {
    let mut changed = 0;
    for (_, _, record) in game.records_mut() {
        let Some(translated) = record.translated.as_mut() else {
            continue;
        };
        if let Some(replaced) = replace_translation(translated, rules)
            && replaced != *translated
        {
            *translated = replaced;
            changed += 1;
        }
    }
    changed
}

impl TranslationStore {
    pub async fn clear_untranslated(&self) -> Result<usize> {
        let removed = self.mutate(remove_untranslated).await?;
        info!("{} untranslated records cleared", removed);
        Ok(removed)
    }

    pub async fn clear_code_like(&self, classifier: &Classifier) -> Result<usize> {
        let removed = self
            .mutate(|game| remove_code_like(game, classifier))
            .await?;
        info!("{} code-like records cleared", removed);
        Ok(removed)
    }

    pub async fn clear_configured_unsafe(&self, classifier: &Classifier) -> Result<usize> {
        let removed = self
            .mutate(|game| remove_configured_unsafe(game, classifier))
            .await?;
        info!("{} unsafe records cleared", removed);
        Ok(removed)
    }

    pub async fn apply_replacements(&self, rules: &[ReplaceRule]) -> Result<usize> {
        if rules.is_empty() {
            return Ok(0);
        }
        let changed = self
            .mutate(|game| apply_replacements(game, rules))
            .await?;
        info!("{} translations rewritten by replacements", changed);
        Ok(changed)
    }
}
