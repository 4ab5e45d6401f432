use anyhow::Result;
use tracing::info;

use super::super::{
    args::ExtractCommand,
    exit_status::ExitStatus,
    report::{print_extractions, print_skipped},
};
use super::helper::ProjectContext;
use crate::core::classify::Classifier;
use crate::core::pipeline::extract_all;
use crate::core::scan::{ScanFilter, scan_files};

pub fn extract(cmd: ExtractCommand) -> Result<ExitStatus> {
    let ctx = ProjectContext::load(&cmd.common)?;
    let classifier = Classifier::from_config(&ctx.config)?;
    let filter = ScanFilter::new(
        &ctx.project_root,
        &ctx.config.script_file_patterns,
        &ctx.config.ignores,
    )?;

    let roots = if cmd.paths.is_empty() {
        vec![ctx.project_root.clone()]
    } else {
        cmd.paths.clone()
    };
    let scan = scan_files(&roots, &filter);
    info!("{} files with source text found", scan.files.len());

    let run = extract_all(&classifier, &scan.files);
    print_extractions(&run.extractions, cmd.show_ignored);
    print_skipped(&run.skipped, cmd.common.verbose);

    Ok(ExitStatus::from_skipped(
        run.skipped.len() + scan.skipped_count,
    ))
}
