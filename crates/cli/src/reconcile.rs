//! `zippkg reconcile`: join processing reports against the request sheet.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use zippkg_io::xlsx::export_table;
use zippkg_io::{load_reports, IoError, ReportPolicy};
use zippkg_recon::{project, reconcile, render_summary, ReconSummary};

use crate::exit_codes::{EXIT_ERROR, EXIT_REPORT_LOAD, EXIT_USAGE};
use crate::requests::{load_requests, print_parsed};
use crate::{CliError, GlobalArgs};

const OUTPUT_SHEET: &str = "Reconcile";

#[derive(Serialize)]
struct ReconcileReport<'a> {
    requests: usize,
    documents: usize,
    report_files: usize,
    summary: &'a ReconSummary,
    skipped: Vec<SkippedJson>,
    output: String,
}

#[derive(Serialize)]
struct SkippedJson {
    path: String,
    reason: String,
}

pub fn cmd_reconcile(
    global: &GlobalArgs,
    report_dir: PathBuf,
    suffix: String,
    strict: bool,
    json: bool,
) -> Result<(), CliError> {
    if suffix.trim().is_empty() {
        return Err(CliError::new(EXIT_USAGE, "--report-file-ends-with must not be empty")
            .with_hint("pass the report file suffix, e.g. --report-file-ends-with .xml"));
    }

    let start = Instant::now();
    let (_settings, parsed) = load_requests(global)?;
    if !json {
        print_parsed(global, &parsed);
    }

    let policy = if strict { ReportPolicy::FailFast } else { ReportPolicy::SkipAndLog };
    let loaded = load_reports(&report_dir, &suffix, policy).map_err(report_error)?;

    let mut outcome = reconcile(&parsed.requests, &loaded.documents);
    outcome.summary.skipped_reports = loaded.skipped.len();

    let table = project(&outcome.results, &parsed.headers());
    let target = output_path(&global.out, &global.sheet);
    fs::create_dir_all(&global.out).map_err(|e| {
        CliError::io(format!("cannot create output directory {}: {e}", global.out.display()))
    })?;
    export_table(&target, OUTPUT_SHEET, &table.header, &table.rows)?;

    if json {
        let report = ReconcileReport {
            requests: parsed.requests.len(),
            documents: loaded.documents.len(),
            report_files: loaded.files_read,
            summary: &outcome.summary,
            skipped: loaded
                .skipped
                .iter()
                .map(|s| SkippedJson {
                    path: s.path.display().to_string(),
                    reason: s.reason.clone(),
                })
                .collect(),
            output: target.display().to_string(),
        };
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
        println!("{text}");
        return Ok(());
    }

    println!("Reconciled {} results", outcome.results.len());
    println!();
    print!("{}", render_summary(&outcome.summary));
    for skipped in &loaded.skipped {
        println!("Skipped: {} ({})", skipped.path.display(), skipped.reason);
    }
    println!();
    println!("Output to: {}", target.display());
    println!("Duration: {:?}", start.elapsed());
    Ok(())
}

fn output_path(out: &Path, sheet: &str) -> PathBuf {
    out.join(format!("reconcile-result--{sheet}.xlsx"))
}

fn report_error(err: IoError) -> CliError {
    match err {
        IoError::Serialization { .. } => CliError::new(EXIT_REPORT_LOAD, err.to_string())
            .with_hint("run without --strict-reports to skip malformed report files"),
        other => CliError::from(other),
    }
}
