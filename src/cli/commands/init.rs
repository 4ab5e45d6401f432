use std::{fs, path::Path};

use anyhow::{Context, Result};
use colored::Colorize;

use super::super::exit_status::ExitStatus;
use super::super::report::{FAILURE_MARK, SUCCESS_MARK};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

/// Write the default configuration into the current directory. An existing
/// configuration is never overwritten.
pub fn init() -> Result<ExitStatus> {
    init_in(Path::new("."))
}

pub fn init_in(dir: &Path) -> Result<ExitStatus> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        eprintln!(
            "{} {} already exists, leaving it untouched",
            FAILURE_MARK.red(),
            CONFIG_FILE_NAME
        );
        return Ok(ExitStatus::Failure);
    }

    fs::write(&config_path, default_config_json()?)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;
    println!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Created {}", CONFIG_FILE_NAME).green()
    );

    Ok(ExitStatus::Success)
}
