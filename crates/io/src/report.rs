//! Loading a directory of processing reports.

use std::fs;
use std::path::{Path, PathBuf};

use zippkg_core::{Report, ReportDocument};

use crate::error::IoError;

pub const DEFAULT_REPORT_SUFFIX: &str = ".xml";

/// What to do with a report file that is not a readable `REPORT` document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportPolicy {
    /// Log a warning, remember the file, keep going.
    #[default]
    SkipAndLog,
    /// Abort on the first bad file.
    FailFast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedReport {
    pub path: PathBuf,
    pub reason: String,
}

/// Every document of every accepted report, in file then document order.
#[derive(Debug, Default)]
pub struct LoadedReports {
    pub documents: Vec<ReportDocument>,
    pub files_read: usize,
    pub skipped: Vec<SkippedReport>,
}

/// Recursively load every file under `dir` whose name ends with `suffix`.
///
/// Files are visited in sorted path order so that key collisions resolve the
/// same way on every run. Directory or read failures are always errors; only
/// content that fails to parse is subject to `policy`.
pub fn load_reports(dir: &Path, suffix: &str, policy: ReportPolicy) -> Result<LoadedReports, IoError> {
    let mut files = Vec::new();
    collect_files(dir, suffix, &mut files)?;
    files.sort();

    let mut loaded = LoadedReports::default();
    for path in files {
        let bytes = fs::read(&path).map_err(|e| IoError::fs("cannot read report", &path, e))?;
        let parsed = String::from_utf8(bytes)
            .map_err(|e| e.to_string())
            .and_then(|text| Report::from_xml(&text).map_err(|e| e.to_string()));

        match parsed {
            Ok(report) => {
                log::debug!("loaded {} documents from {}", report.documents.len(), path.display());
                loaded.documents.extend(report.documents);
                loaded.files_read += 1;
            }
            Err(reason) => match policy {
                ReportPolicy::FailFast => return Err(IoError::serialization(&path, reason)),
                ReportPolicy::SkipAndLog => {
                    log::warn!("skipping report {}: {}", path.display(), reason);
                    loaded.skipped.push(SkippedReport { path, reason });
                }
            },
        }
    }
    Ok(loaded)
}

fn collect_files(dir: &Path, suffix: &str, out: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(|e| IoError::fs("cannot read report directory", dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| IoError::fs("cannot read report directory", dir, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| IoError::fs("cannot stat", &path, e))?;
        if file_type.is_dir() {
            collect_files(&path, suffix, out)?;
        } else if entry.file_name().to_string_lossy().ends_with(suffix) {
            out.push(path);
        }
    }
    Ok(())
}
