//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: List the translatable text of game files with its verdict
//! - `clean`: Run maintenance passes over the translation store
//! - `merge`: Import translations from another store document
//! - `init`: Initialize the rpgtl configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::core::store::CleanupRule;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.common.verbose,
            Some(Command::Clean(cmd)) => cmd.common.verbose,
            Some(Command::Merge(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Game project root (overrides config file)
    #[arg(long, env = "RPGTL_PROJECT_ROOT")]
    pub project_root: Option<PathBuf>,

    /// Translation store file (overrides config file)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Files or directories to scan (default: the project root)
    pub paths: Vec<PathBuf>,

    /// Also list ignored candidates and why they were ignored
    #[arg(long)]
    pub show_ignored: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct CleanCommand {
    /// Passes to run (default: all, in order)
    /// Can be specified multiple times: --rule untranslated --rule names
    #[arg(long = "rule")]
    pub rules: Vec<CleanupRule>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct MergeCommand {
    /// Store document to take translations from
    pub file: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the translatable text of game files and how each candidate is classified
    Extract(ExtractCommand),
    /// Clean the translation store (untranslated, code, unsafe, replace, inconsistencies, names)
    Clean(CleanCommand),
    /// Merge translations from another translation store document
    Merge(MergeCommand),
    /// Initialize a new .rpgtlrc.json configuration file
    Init,
}
