use std::collections::HashSet;

use anyhow::Result;

use super::super::{args::CleanCommand, exit_status::ExitStatus, report::print_cleanup};
use super::helper::ProjectContext;
use crate::config::ReplaceRule;
use crate::core::classify::Classifier;
use crate::core::store::{CleanupRule, TranslationStore};
use crate::core::translate::{OperatorPrompt, StdinOperator};

/// Passes to run, always in [`CleanupRule::ALL`] order.
pub fn selected_rules(requested: &[CleanupRule]) -> Vec<CleanupRule> {
    if requested.is_empty() {
        return CleanupRule::ALL.to_vec();
    }
    let requested: HashSet<&CleanupRule> = requested.iter().collect();
    CleanupRule::ALL
        .into_iter()
        .filter(|rule| requested.contains(rule))
        .collect()
}

pub async fn clean(cmd: CleanCommand) -> Result<ExitStatus> {
    let ctx = ProjectContext::load(&cmd.common)?;
    let classifier = Classifier::from_config(&ctx.config)?;
    let store = ctx.open_store();
    let operator = StdinOperator::new();

    let results = run_rules(
        &store,
        &classifier,
        &ctx.config.translated_replace,
        &operator,
        &selected_rules(&cmd.rules),
    )
    .await?;
    print_cleanup(&results);

    Ok(ExitStatus::Success)
}

pub async fn run_rules(
    store: &TranslationStore,
    classifier: &Classifier,
    replacements: &[ReplaceRule],
    operator: &dyn OperatorPrompt,
    rules: &[CleanupRule],
) -> Result<Vec<(CleanupRule, usize)>> {
    let mut results = Vec::with_capacity(rules.len());
    for rule in rules {
        let count = match rule {
            CleanupRule::Untranslated => store.clear_untranslated().await?,
            CleanupRule::Code => store.clear_code_like(classifier).await?,
            CleanupRule::Unsafe => store.clear_configured_unsafe(classifier).await?,
            CleanupRule::Replace => store.apply_replacements(replacements).await?,
            CleanupRule::Inconsistencies => store.fix_inconsistencies(operator).await?,
            CleanupRule::Names => store.fix_names().await?,
        };
        results.push((*rule, count));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use crate::cli::commands::clean::*;
    use crate::core::data::{ExtractRecord, FileKind, FileRecord};
    use crate::core::translate::ScriptedOperator;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_selected_rules_keep_canonical_order() {
        assert_eq!(selected_rules(&[]), CleanupRule::ALL.to_vec());
        assert_eq!(
            selected_rules(&[CleanupRule::Names, CleanupRule::Untranslated, CleanupRule::Names]),
            vec![CleanupRule::Untranslated, CleanupRule::Names]
        );
    }

    #[tokio::test]
    async fn test_full_cleanup_sequence() {
        let dir = tempdir().unwrap();
        let store = TranslationStore::new(dir.path().join("store.json"), "/games/demo");
        let map = FileRecord::structured("Map001.json");
        store
            .write_batch(
                &map,
                &[
                    ExtractRecord::new("a", "はい").with_translation("Yes"),
                    ExtractRecord::new("b", "はい").with_translation("Sure"),
                    ExtractRecord::new("c", "村"),
                    ExtractRecord::new("d", "ミスター").with_translation("Mr. Smith"),
                ],
            )
            .await
            .unwrap();

        let operator = ScriptedOperator::new(["1"]);
        let results = run_rules(
            &store,
            &Classifier::default(),
            &[ReplaceRule::new("Mr. ", "")],
            &operator,
            &selected_rules(&[]),
        )
        .await
        .unwrap();

        assert_eq!(
            results,
            vec![
                (CleanupRule::Untranslated, 1),
                (CleanupRule::Code, 0),
                (CleanupRule::Unsafe, 0),
                (CleanupRule::Replace, 1),
                (CleanupRule::Inconsistencies, 1),
                (CleanupRule::Names, 0),
            ]
        );

        let game = store.read_game().await.unwrap();
        let translated = |path: &str| {
            game.get(FileKind::Structured, "Map001.json", path)
                .and_then(|r| r.translated.clone())
        };
        assert_eq!(translated("a").as_deref(), Some("Sure"));
        assert_eq!(translated("b").as_deref(), Some("Sure"));
        assert_eq!(translated("d").as_deref(), Some("Smith"));
        assert!(translated("c").is_none());
    }
}
