use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::debug;

use super::super::args::CommonArgs;
use crate::config::{Config, ConfigLoadResult, load_config};
use crate::core::store::TranslationStore;

/// Configuration of the current project with command-line overrides applied.
pub struct ProjectContext {
    pub config: Config,
    /// Canonical project root; its string form keys the project in the store.
    pub project_root: PathBuf,
}

impl ProjectContext {
    pub fn load(common: &CommonArgs) -> Result<Self> {
        let cwd = env::current_dir().context("Failed to read current directory")?;
        Self::load_from(&cwd, common)
    }

    pub fn load_from(start_dir: &Path, common: &CommonArgs) -> Result<Self> {
        let ConfigLoadResult {
            mut config,
            from_file,
        } = load_config(start_dir)?;
        debug!(
            "Using {} configuration",
            if from_file { "file" } else { "default" }
        );

        if let Some(root) = &common.project_root {
            config.project_root = root.to_string_lossy().to_string();
        }
        if let Some(store) = &common.store {
            config.store_path = Some(store.to_string_lossy().to_string());
        }

        let root = Path::new(&config.project_root);
        let project_root = root
            .canonicalize()
            .with_context(|| format!("Project root does not exist: {:?}", root))?;

        Ok(Self {
            config,
            project_root,
        })
    }

    pub fn project_key(&self) -> String {
        self.project_root.to_string_lossy().to_string()
    }

    pub fn open_store(&self) -> TranslationStore {
        TranslationStore::new(self.config.resolved_store_path(), self.project_key())
    }
}
