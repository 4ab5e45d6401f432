//! Core translation engine.
//!
//! ## Module Structure
//!
//! - `data`: records shared by every stage and the persisted document layout
//! - `node_path`: reversible addressing of nodes inside structured data
//! - `scan`: discovery of game files worth extracting
//! - `classify`: script-code detection, unsafe policy and the verdict table
//! - `extract`: structured-data and script extractors
//! - `translate`: backend seams, batching and the concurrent orchestrator
//! - `store`: the durable translation store and its maintenance routines
//! - `format`: final shaping of translations for the writer
//! - `pipeline`: the end-to-end run over a staged game

pub mod classify;
pub mod data;
pub mod extract;
pub mod format;
pub mod node_path;
pub mod pipeline;
pub mod scan;
pub mod store;
pub mod translate;

pub use classify::{Classifier, IgnoreReason, Verdict};
pub use data::{ExtractRecord, FileKind, FileRecord, GameTranslation, Translations};
pub use node_path::NodePath;
pub use pipeline::{PipelineReport, TranslationPipeline};
pub use store::TranslationStore;
