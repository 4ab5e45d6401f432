//! Durable translation memory.
//!
//! One JSON document holds the [`Translations`] of every project root ever
//! translated from this working directory. A [`TranslationStore`] serves one
//! project root: it caches the document after the first load and persists the
//! whole document atomically after every mutation.
//!
//! ## Module Structure
//!
//! - `cleanup`: removal and rewrite passes driven by classification and configuration
//! - `consistency`: inconsistent translation detection and name-token propagation
//! - `merge`: importing translations from another store document

pub mod cleanup;
pub mod consistency;
pub mod merge;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::{
    fs,
    sync::{Mutex, MutexGuard, RwLock},
};
use tracing::debug;

use crate::core::data::{ExtractRecord, FileRecord, GameTranslation, Translations};

pub use cleanup::{CleanupRule, replace_translation};
pub use consistency::{Inconsistency, find_inconsistencies, find_names};
pub use merge::merge_game;

/// Store service for one project root.
///
/// Readers only touch `cache`. Mutations hold `write_lock` across their
/// read-modify-persist sequence so concurrent writers never lose updates.
pub struct TranslationStore {
    path: PathBuf,
    project_root: String,
    cache: RwLock<Option<Translations>>,
    write_lock: Mutex<()>,
}

/// An in-progress mutation: the write lock and the snapshot being edited.
pub(crate) struct StoreTransaction<'a> {
    _guard: MutexGuard<'a, ()>,
    pub translations: Translations,
}

impl TranslationStore {
    pub fn new(path: impl Into<PathBuf>, project_root: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            project_root: project_root.into(),
            cache: RwLock::new(None),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn project_root(&self) -> &str {
        &self.project_root
    }

    /// Snapshot of the whole document. The first successful load is kept for
    /// the lifetime of the store; a missing file reads as an empty store.
    pub async fn read_all(&self) -> Result<Translations> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let mut cache = self.cache.write().await;
        match cache.as_ref() {
            Some(cached) => Ok(cached.clone()),
            None => {
                let loaded = load_document(&self.path).await?;
                *cache = Some(loaded.clone());
                Ok(loaded)
            }
        }
    }

    /// Snapshot of this project's translations.
    pub async fn read_game(&self) -> Result<GameTranslation> {
        Ok(self
            .read_all()
            .await?
            .game(&self.project_root)
            .cloned()
            .unwrap_or_default())
    }

    /// Upsert records of one file by path: an existing record only takes the
    /// new translation, an unknown path is inserted as is.
    pub async fn write_batch(&self, file: &FileRecord, records: &[ExtractRecord]) -> Result<()> {
        self.mutate(|game| {
            let extracts = game.files_mut(file.kind).entry(file.key()).or_default();
            for record in records {
                match extracts.get_mut(&record.path) {
                    Some(existing) => existing.translated = record.translated.clone(),
                    None => {
                        extracts.insert(record.path.clone(), record.clone());
                    }
                }
            }
        })
        .await?;
        debug!("Stored {} records for {}", records.len(), file.key());
        Ok(())
    }

    /// Remember the original values of unsafe records so script literals
    /// carrying the same text are left alone.
    pub async fn write_ignored_unsafe(
        &self,
        file: &FileRecord,
        records: &[ExtractRecord],
    ) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let added = self
            .mutate(|game| {
                records
                    .iter()
                    .filter(|record| game.ignored_unsafe.insert(record.value.clone()))
                    .count()
            })
            .await?;
        debug!("Recorded {} unsafe values from {}", added, file.key());
        Ok(added)
    }

    /// Apply `f` to this project's translations and persist the result.
    pub(crate) async fn mutate<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut GameTranslation) -> T,
    {
        let mut transaction = self.begin().await?;
        let output = f(transaction.translations.game_or_default(&self.project_root));
        self.commit(transaction).await?;
        Ok(output)
    }

    pub(crate) async fn begin(&self) -> Result<StoreTransaction<'_>> {
        let guard = self.write_lock.lock().await;
        let translations = self.read_all().await?;
        Ok(StoreTransaction {
            _guard: guard,
            translations,
        })
    }

    pub(crate) async fn commit(&self, transaction: StoreTransaction<'_>) -> Result<()> {
        let StoreTransaction {
            _guard,
            translations,
        } = transaction;
        save_document(&self.path, &translations).await?;
        *self.cache.write().await = Some(translations);
        Ok(())
    }
}

/// Load a store document; a missing file is an empty document.
pub async fn load_document(path: &Path) -> Result<Translations> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Ok(Translations::default());
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read translation store: {:?}", path))?;
    if content.trim().is_empty() {
        return Ok(Translations::default());
    }
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse translation store: {:?}", path))
}

async fn save_document(path: &Path, translations: &Translations) -> Result<()> {
    let json = serde_json::to_string_pretty(translations)
        .context("Failed to serialize translation store")?;
    write_atomic(path, json.as_bytes())
        .await
        .with_context(|| format!("Failed to write translation store: {:?}", path))
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }

    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(name) => name.to_string(),
        None => "translations.json".to_string(),
    };
    tmp.set_file_name(format!("{file_name}.tmp"));
    tmp
}
