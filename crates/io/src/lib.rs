// File I/O operations

pub mod error;
pub mod package;
pub mod report;
pub mod xlsx;

pub use error::IoError;
pub use package::{package, PackageOptions, PackageOutput, SplitPlanner};
pub use report::{load_reports, DEFAULT_REPORT_SUFFIX, LoadedReports, ReportPolicy, SkippedReport};
