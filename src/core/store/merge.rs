use std::path::Path;

use anyhow::{Result, bail};
use tracing::{debug, info};

use crate::core::data::GameTranslation;
use crate::core::store::{TranslationStore, load_document};

/// Take translations from `other` for structured records present in both.
/// Returns the number of records whose translation changed.
pub fn merge_game(current: &mut GameTranslation, other: &GameTranslation) -> usize {
    let mut merged = 0;
    for (file, extracts) in current.structured_files.iter_mut() {
        let Some(other_extracts) = other.structured_files.get(file) else {
            continue;
        };
        for (path, record) in extracts.iter_mut() {
            let Some(incoming) = other_extracts
                .get(path)
                .and_then(|r| r.translated.as_ref())
            else {
                continue;
            };
            if record.translated.as_ref() != Some(incoming) {
                debug!(
                    "Merged '{}': {:?} => {}",
                    path, record.translated, incoming
                );
                record.translated = Some(incoming.clone());
                merged += 1;
            }
        }
    }
    merged
}

impl TranslationStore {
    /// Merge translations of this project from another store document.
    pub async fn merge_from(&self, path: &Path) -> Result<usize> {
        if !path.exists() {
            bail!("Merge source '{}' does not exist.", path.display());
        }
        let other = load_document(path).await?;
        let Some(other_game) = other.game(self.project_root()) else {
            bail!(
                "'{}' holds no translations for project '{}'.",
                path.display(),
                self.project_root()
            );
        };

        let merged = self.mutate(|game| merge_game(game, other_game)).await?;
        info!("{} translations merged from {}", merged, path.display());
        Ok(merged)
    }
}
