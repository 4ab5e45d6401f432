//! Cross-file consistency of stored translations.
//!
//! Two passes:
//!
//! - inconsistencies: the same original text translated differently in
//!   different places, resolved by an operator choosing one translation
//! - names: `\N<name>` tokens whose translation must follow the translation of
//!   the name itself as found in the database files

use std::{collections::BTreeMap, sync::LazyLock};

use anyhow::Result;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::core::data::{FileKind, GameTranslation};
use crate::core::store::TranslationStore;
use crate::core::translate::OperatorPrompt;
use crate::utils::{SOURCE_SCRIPT_CLASS, quote_wrap};

/// `\N<...>` name placeholder.
static NAME_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\\N<[\d{}a-zA-Z]*>", SOURCE_SCRIPT_CLASS)).unwrap()
});

static NAME_TEXT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"[\d{}a-zA-Z]+", SOURCE_SCRIPT_CLASS)).unwrap());

/// Location of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordRef {
    pub kind: FileKind,
    pub file: String,
    pub path: String,
}

/// One original value with more than one distinct translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    pub value: String,
    /// Distinct translations in first-seen order, script quotes removed.
    pub options: Vec<String>,
    pub members: Vec<RecordRef>,
}

impl Inconsistency {
    /// Set every member to the chosen option.
    pub fn resolve(&self, game: &mut GameTranslation, choice: usize) -> usize {
        let Some(chosen) = self.options.get(choice) else {
            return 0;
        };

        let mut updated = 0;
        for member in &self.members {
            let record = game
                .files_mut(member.kind)
                .get_mut(&member.file)
                .and_then(|extracts| extracts.get_mut(&member.path));
            if let Some(record) = record {
                record.translated = Some(match member.kind {
                    FileKind::Structured => chosen.clone(),
                    FileKind::Script => quote_wrap(chosen),
                });
                updated += 1;
            }
        }
        updated
    }
}

/// Group every record by original value and keep groups with translations that
/// disagree, or with a translation some members still lack.
pub fn find_inconsistencies(game: &GameTranslation) -> Vec<Inconsistency> {
    let mut groups: BTreeMap<&str, (Inconsistency, bool)> = BTreeMap::new();

    for (kind, file, record) in game.records() {
        let (group, missing) = groups.entry(record.value.as_str()).or_insert_with(|| {
            (
                Inconsistency {
                    value: record.value.clone(),
                    options: Vec::new(),
                    members: Vec::new(),
                },
                false,
            )
        });
        match record.translated_text(kind).filter(|t| !t.trim().is_empty()) {
            Some(translated) => {
                if !group.options.iter().any(|o| o == translated) {
                    group.options.push(translated.to_string());
                }
            }
            None => *missing = true,
        }
        group.members.push(RecordRef {
            kind,
            file: file.to_string(),
            path: record.path.clone(),
        });
    }

    groups
        .into_values()
        .filter(|(group, missing)| {
            group.options.len() > 1 || (*missing && !group.options.is_empty())
        })
        .map(|(group, _)| group)
        .collect()
}

/// Every distinct name token found in original values, with the records carrying it.
pub fn find_names(game: &GameTranslation) -> BTreeMap<String, Vec<RecordRef>> {
    let mut names: BTreeMap<String, Vec<RecordRef>> = BTreeMap::new();
    for (kind, file, record) in game.records() {
        for token in NAME_TOKEN_REGEX.find_iter(&record.value) {
            let members = names.entry(token.as_str().to_string()).or_default();
            let member = RecordRef {
                kind,
                file: file.to_string(),
                path: record.path.clone(),
            };
            if !members.contains(&member) {
                members.push(member);
            }
        }
    }
    names
}

/// The name inside a `\N<name>` token.
pub fn clean_name(token: &str) -> Option<&str> {
    let inner = token
        .strip_prefix(r"\N<")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(token);
    NAME_TEXT_REGEX.find_iter(inner).last().map(|m| m.as_str())
}

/// Propagate database name translations into name tokens. Returns the number
/// of records whose translation changed.
pub fn fix_names(game: &mut GameTranslation) -> usize {
    let mut changed = 0;

    for (token, members) in find_names(game) {
        let Some(name) = clean_name(&token) else {
            warn!("Failed to get clean name from {}", token);
            continue;
        };

        let known = game
            .structured_files
            .values()
            .flat_map(|extracts| extracts.values())
            .find(|record| record.value == name && record.has_translation())
            .and_then(|record| record.translated.clone());
        let Some(known) = known else {
            debug!("No database translation for name {}", token);
            continue;
        };

        for member in members {
            let Some(record) = game
                .files_mut(member.kind)
                .get_mut(&member.file)
                .and_then(|extracts| extracts.get_mut(&member.path))
            else {
                continue;
            };

            let ambiguous = NAME_TOKEN_REGEX
                .find_iter(&record.value)
                .any(|other| other.as_str() != token);
            if ambiguous {
                debug!("Multiple names, skipping {} => {}", record.path, record.value);
                continue;
            }

            let Some(translated) = record.translated.as_ref() else {
                continue;
            };
            let mut fixed = translated.clone();
            for translated_token in NAME_TOKEN_REGEX.find_iter(translated) {
                if let Some(previous) = clean_name(translated_token.as_str()) {
                    fixed = fixed.replace(previous, &known);
                }
            }
            if &fixed != translated {
                record.translated = Some(fixed);
                changed += 1;
            }
        }
    }

    changed
}

/// Ask the operator to pick one option. `None` skips the group.
async fn choose_option(
    operator: &dyn OperatorPrompt,
    inconsistency: &Inconsistency,
) -> Option<usize> {
    for (index, option) in inconsistency.options.iter().enumerate() {
        operator
            .notify(&format!("[{}] {} => {}", index, inconsistency.value, option))
            .await;
    }
    operator
        .notify("Please select the number you want to keep (-1 to ignore)")
        .await;

    loop {
        let answer = operator.read_line().await?;
        match answer.trim().parse::<i64>() {
            Ok(-1) => return None,
            Ok(index) if index >= 0 && (index as usize) < inconsistency.options.len() => {
                return Some(index as usize);
            }
            Ok(_) => operator.notify("Selection out of range").await,
            Err(_) => operator.notify("Failed to parse answer to integer").await,
        }
    }
}

impl TranslationStore {
    /// Resolve every inconsistency interactively. Returns the number of groups resolved.
    pub async fn fix_inconsistencies(&self, operator: &dyn OperatorPrompt) -> Result<usize> {
        let inconsistencies = find_inconsistencies(&self.read_game().await?);
        if inconsistencies.is_empty() {
            info!("No inconsistencies found");
            return Ok(0);
        }

        // choices are collected before the write lock is taken
        let mut choices = Vec::new();
        for inconsistency in &inconsistencies {
            if let Some(choice) = choose_option(operator, inconsistency).await {
                info!(
                    "Updating all '{}' to '{}'",
                    inconsistency.value, inconsistency.options[choice]
                );
                choices.push((inconsistency, choice));
            }
        }
        if choices.is_empty() {
            return Ok(0);
        }

        self.mutate(|game| {
            for (inconsistency, choice) in &choices {
                inconsistency.resolve(game, *choice);
            }
        })
        .await?;
        Ok(choices.len())
    }

    pub async fn fix_names(&self) -> Result<usize> {
        let changed = self.mutate(fix_names).await?;
        info!("{} name translations fixed", changed);
        Ok(changed)
    }
}
