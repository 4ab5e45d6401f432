//! End-to-end translation of a staged game.
//!
//! Structured data goes first so its translations and unsafe values are in the
//! store before scripts are looked at: script literals that repeat an unsafe
//! structured value are left alone, and literals that repeat a translated one
//! reuse it.

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::Config;
use crate::core::classify::Classifier;
use crate::core::data::{ExtractRecord, FileKind, FileRecord};
use crate::core::extract::{FileExtraction, extract_file};
use crate::core::store::TranslationStore;
use crate::core::translate::{
    OperatorPrompt, TranslationBackend, TranslationOrchestrator, TranslationSummary,
};
use crate::utils::trim_quotes;

/// What a pipeline run did.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub files_extracted: usize,
    /// Files that could not be read or parsed, with the reason.
    pub files_skipped: Vec<(PathBuf, String)>,
    /// Safe candidates handed to the orchestrator.
    pub candidates: usize,
    /// New values added to the ignored-unsafe set.
    pub unsafe_values: usize,
    /// Script candidates dropped because their value is unsafe elsewhere.
    pub ignored_script_values: usize,
    pub structured: TranslationSummary,
    /// `None` when script translation is disabled.
    pub scripts: Option<TranslationSummary>,
}

/// Extractions of every file that could be read, and the files that could not.
#[derive(Debug, Default)]
pub struct ExtractionRun {
    pub extractions: Vec<FileExtraction>,
    pub skipped: Vec<(PathBuf, String)>,
}

/// Extract files in parallel, keeping the input order. Failing files are
/// logged and returned with their reason, never fatal.
pub fn extract_all(classifier: &Classifier, files: &[FileRecord]) -> ExtractionRun {
    let results: Vec<_> = files
        .par_iter()
        .map(|file| (file, extract_file(classifier, file)))
        .collect();

    let mut run = ExtractionRun {
        extractions: Vec::with_capacity(results.len()),
        skipped: Vec::new(),
    };
    for (file, result) in results {
        match result {
            Ok(extraction) => run.extractions.push(extraction),
            Err(err) => {
                warn!("Skipping {:?}: {:#}", file.path, err);
                run.skipped.push((file.path.clone(), format!("{:#}", err)));
            }
        }
    }
    run
}

pub struct TranslationPipeline {
    classifier: Arc<Classifier>,
    orchestrator: TranslationOrchestrator,
    store: Arc<TranslationStore>,
    translate_scripts: bool,
}

impl TranslationPipeline {
    pub fn new(
        classifier: Arc<Classifier>,
        orchestrator: TranslationOrchestrator,
        store: Arc<TranslationStore>,
        translate_scripts: bool,
    ) -> Self {
        Self {
            classifier,
            orchestrator,
            store,
            translate_scripts,
        }
    }

    /// Pipeline for the project described by `config`.
    pub fn from_config(
        config: &Config,
        backend: Arc<dyn TranslationBackend>,
        operator: Arc<dyn OperatorPrompt>,
        store: Arc<TranslationStore>,
    ) -> Result<Self> {
        let classifier = Classifier::from_config(config)?;
        let orchestrator =
            TranslationOrchestrator::from_config(backend, operator, Arc::clone(&store), config)?;
        Ok(Self::new(
            Arc::new(classifier),
            orchestrator,
            store,
            config.translate_scripts,
        ))
    }

    pub async fn run(&self, files: Vec<FileRecord>) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();
        let (structured_files, script_files): (Vec<_>, Vec<_>) = files
            .into_iter()
            .partition(|file| file.kind == FileKind::Structured);

        let extractions = self.extract(structured_files, &mut report).await?;
        let candidates = safe_candidates(&extractions);
        report.candidates += candidates.len();
        report.structured = self
            .orchestrator
            .translate(FileKind::Structured, candidates)
            .await?;

        for extraction in &extractions {
            let unsafe_records: Vec<ExtractRecord> =
                extraction.unsafe_records().cloned().collect();
            report.unsafe_values += self
                .store
                .write_ignored_unsafe(&extraction.file, &unsafe_records)
                .await?;
        }
        info!(
            "Structured data done: {} translated, {} unsafe values recorded",
            report.structured.translated, report.unsafe_values
        );

        if !self.translate_scripts {
            return Ok(report);
        }

        let ignored = self.store.read_game().await?.ignored_unsafe;
        let mut extractions = self.extract(script_files, &mut report).await?;
        for extraction in &mut extractions {
            let before = extraction.records.len();
            extraction
                .records
                .retain(|record| !ignored.contains(trim_quotes(&record.value)));
            report.ignored_script_values += before - extraction.records.len();
        }

        let candidates = safe_candidates(&extractions);
        report.candidates += candidates.len();
        report.scripts = Some(
            self.orchestrator
                .translate(FileKind::Script, candidates)
                .await?,
        );

        Ok(report)
    }

    async fn extract(
        &self,
        files: Vec<FileRecord>,
        report: &mut PipelineReport,
    ) -> Result<Vec<FileExtraction>> {
        let classifier = Arc::clone(&self.classifier);
        let run = tokio::task::spawn_blocking(move || extract_all(&classifier, &files)).await?;

        report.files_extracted += run.extractions.len();
        report.files_skipped.extend(run.skipped);
        Ok(run.extractions)
    }
}

fn safe_candidates(extractions: &[FileExtraction]) -> Vec<(FileRecord, ExtractRecord)> {
    extractions
        .iter()
        .flat_map(|extraction| {
            extraction
                .safe()
                .map(|record| (extraction.file.clone(), record.clone()))
        })
        .collect()
}
