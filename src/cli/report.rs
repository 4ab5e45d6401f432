//! Report formatting and printing utilities.
//!
//! Kept apart from the core so the library can be used without the CLI output.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::data::{ExtractRecord, FileKind};
use crate::core::extract::FileExtraction;
use crate::core::store::CleanupRule;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Values wider than this are cut in listings.
const MAX_VALUE_WIDTH: usize = 40;

/// Totals of an extraction listing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionTotals {
    pub files: usize,
    pub safe: usize,
    pub unsafe_count: usize,
    pub ignored: usize,
}

impl ExtractionTotals {
    pub fn of(extractions: &[FileExtraction]) -> Self {
        let mut totals = Self {
            files: extractions.len(),
            ..Default::default()
        };
        for extraction in extractions {
            totals.safe += extraction.safe().count();
            totals.unsafe_count += extraction.unsafe_records().count();
            totals.ignored += extraction.ignored.len();
        }
        totals
    }
}

/// Print every candidate of every file, then a summary line.
pub fn print_extractions(extractions: &[FileExtraction], show_ignored: bool) {
    print_extractions_to(extractions, show_ignored, &mut io::stdout().lock());
}

pub fn print_extractions_to<W: Write>(
    extractions: &[FileExtraction],
    show_ignored: bool,
    writer: &mut W,
) {
    for extraction in extractions {
        if extraction.is_empty() && (!show_ignored || extraction.ignored.is_empty()) {
            continue;
        }

        let _ = writeln!(
            writer,
            "{} {} ({})",
            "-->".blue(),
            extraction.file.path.display(),
            extraction.file.kind
        );

        let rows: Vec<(String, &ExtractRecord)> = extraction
            .records
            .iter()
            .map(|record| {
                let label = if record.is_unsafe() { "unsafe" } else { "safe" };
                (label.to_string(), record)
            })
            .chain(
                extraction
                    .ignored
                    .iter()
                    .filter(|_| show_ignored)
                    .map(|(record, reason)| (format!("ignored: {}", reason), record)),
            )
            .collect();

        let values: Vec<String> = rows
            .iter()
            .map(|(_, record)| display_value(&record.value))
            .collect();
        let value_width = values
            .iter()
            .map(|v| UnicodeWidthStr::width(v.as_str()))
            .max()
            .unwrap_or(0);

        for ((label, record), value) in rows.iter().zip(&values) {
            let padding = value_width - UnicodeWidthStr::width(value.as_str());
            let label = match label.as_str() {
                "safe" => label.green(),
                "unsafe" => label.yellow(),
                _ => label.dimmed(),
            };
            let _ = writeln!(
                writer,
                "    {}{:padding$}  {}  {}",
                value,
                "",
                locator(extraction.file.kind, record).dimmed(),
                label,
                padding = padding
            );
        }
        let _ = writeln!(writer);
    }

    print_extraction_summary(&ExtractionTotals::of(extractions), writer);
}

fn print_extraction_summary<W: Write>(totals: &ExtractionTotals, writer: &mut W) {
    let candidates = totals.safe + totals.unsafe_count;
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Found {} {} in {} {} ({} safe, {} unsafe, {} ignored)",
            candidates,
            if candidates == 1 { "candidate" } else { "candidates" },
            totals.files,
            if totals.files == 1 { "file" } else { "files" },
            totals.safe,
            totals.unsafe_count,
            totals.ignored
        )
        .green()
    );
}

/// Print files that could not be extracted.
pub fn print_skipped(skipped: &[(PathBuf, String)], verbose: bool) {
    print_skipped_to(skipped, verbose, &mut io::stderr().lock());
}

pub fn print_skipped_to<W: Write>(
    skipped: &[(PathBuf, String)],
    verbose: bool,
    writer: &mut W,
) {
    if skipped.is_empty() {
        return;
    }
    if verbose {
        for (path, reason) in skipped {
            let _ = writeln!(
                writer,
                "{} {}: {}",
                "warning:".bold().yellow(),
                path.display(),
                reason
            );
        }
    }
    let _ = writeln!(
        writer,
        "{} {} file(s) could not be extracted{}",
        FAILURE_MARK.red(),
        skipped.len(),
        if verbose { "" } else { " (use -v for details)" }
    );
}

/// One line per cleanup pass that ran.
pub fn print_cleanup(results: &[(CleanupRule, usize)]) {
    print_cleanup_to(results, &mut io::stdout().lock());
}

pub fn print_cleanup_to<W: Write>(results: &[(CleanupRule, usize)], writer: &mut W) {
    let name_width = results
        .iter()
        .map(|(rule, _)| rule.name().len())
        .max()
        .unwrap_or(0);

    for (rule, count) in results {
        let verb = match rule {
            CleanupRule::Untranslated | CleanupRule::Code | CleanupRule::Unsafe => "removed",
            CleanupRule::Replace | CleanupRule::Names => "updated",
            CleanupRule::Inconsistencies => "resolved",
        };
        let _ = writeln!(
            writer,
            "{} {:<width$}  {} {} record(s)",
            SUCCESS_MARK.green(),
            rule.name(),
            verb,
            count,
            width = name_width
        );
    }
}

pub fn print_merge(file: &Path, merged: usize) {
    println!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Merged {} translation(s) from {}",
            merged,
            file.display()
        )
        .green()
    );
}

fn locator(kind: FileKind, record: &ExtractRecord) -> String {
    match (kind, record.line, record.column) {
        (FileKind::Script, Some(line), Some(column)) => format!("{}:{}", line, column),
        _ => record.path.clone(),
    }
}

/// Single-line rendering of a value, cut to [`MAX_VALUE_WIDTH`] columns.
fn display_value(value: &str) -> String {
    let flat = value.replace('\n', "\\n");
    if UnicodeWidthStr::width(flat.as_str()) <= MAX_VALUE_WIDTH {
        return flat;
    }

    let mut cut = String::new();
    let mut width = 0;
    for c in flat.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > MAX_VALUE_WIDTH - 1 {
            break;
        }
        width += w;
        cut.push(c);
    }
    cut.push('…');
    cut
}
