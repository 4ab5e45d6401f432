//! rpgtl - translation toolkit for RPG Maker games
//!
//! rpgtl finds the Japanese text of an RPG Maker project (JSON data files and
//! JavaScript plugins), decides which of it is safe to translate, sends it to a
//! conversational translation backend in token-bounded questions and keeps every
//! answer in a durable translation store that later runs and the writer reuse.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction, classification, translation and the store
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod utils;
