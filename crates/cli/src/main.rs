// zippkg CLI - package document batches and reconcile processing reports

mod exit_codes;
mod package;
mod reconcile;
mod requests;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zippkg_io::IoError;

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_SPREADSHEET, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "zippkg")]
#[command(about = "Package files into size-bounded zip archives or reconcile processing reports")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Spreadsheet listing the requests (xlsx, xls, xlsb, ods)
    #[arg(long, value_name = "FILE")]
    excel: PathBuf,

    /// Sheet holding the requests
    #[arg(long, default_value = zippkg_core::parse::DEFAULT_SHEET_NAME)]
    sheet: String,

    /// key=value config file; defaults apply when it is missing
    #[arg(long, value_name = "FILE", default_value = "config.properties")]
    config: PathBuf,

    /// Output directory
    #[arg(long, value_name = "DIR", default_value = "output")]
    out: PathBuf,

    /// Debug logging (otherwise RUST_LOG, default warn)
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Zip the listed files with an XML manifest, split by size
    #[command(after_help = "\
Examples:
  zippkg --excel batch.xlsx package --pdf-dir scans
  zippkg --excel batch.xlsx --sheet Batch2 --out dist package --unzip-off")]
    Package {
        /// Directory holding the files named in the sheet
        #[arg(long, value_name = "DIR", default_value = "sources")]
        pdf_dir: PathBuf,

        /// Do not write the unzipped `<name>.d/` mirror next to each archive
        #[arg(long)]
        unzip_off: bool,
    },

    /// Join processing reports against the sheet and write a result workbook
    #[command(after_help = "\
Examples:
  zippkg --excel batch.xlsx reconcile --report-dir reports
  zippkg --excel batch.xlsx reconcile --report-file-ends-with -report.xml --json")]
    Reconcile {
        /// Directory searched recursively for report files
        #[arg(long, value_name = "DIR", default_value = "report")]
        report_dir: PathBuf,

        /// Only files whose name ends with this suffix are read
        #[arg(long, value_name = "SUFFIX", default_value = zippkg_io::DEFAULT_REPORT_SUFFIX)]
        report_file_ends_with: String,

        /// Fail on the first malformed report instead of skipping it
        #[arg(long)]
        strict_reports: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Options shared by every subcommand.
pub struct GlobalArgs {
    pub excel: PathBuf,
    pub sheet: String,
    pub config: PathBuf,
    pub out: PathBuf,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("ZIPPKG_COMMIT"), ")",
        "\ncore:    zippkg-core ", env!("CARGO_PKG_VERSION"),
    )
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Also installs the log -> tracing bridge used by the library crates
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let global = GlobalArgs {
        excel: cli.excel,
        sheet: cli.sheet,
        config: cli.config,
        out: cli.out,
    };

    let result = match cli.command {
        Commands::Package { pdf_dir, unzip_off } => package::cmd_package(&global, pdf_dir, !unzip_off),
        Commands::Reconcile {
            report_dir,
            report_file_ends_with,
            strict_reports,
            json,
        } => reconcile::cmd_reconcile(&global, report_dir, report_file_ends_with, strict_reports, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn spreadsheet(msg: impl Into<String>) -> Self {
        Self::new(EXIT_SPREADSHEET, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let code = match &err {
            IoError::SpreadsheetOpen { .. } | IoError::SpreadsheetRead { .. } => EXIT_SPREADSHEET,
            IoError::SpreadsheetWrite { .. } | IoError::FileSystem { .. } | IoError::Archive { .. } => EXIT_IO,
            IoError::Serialization { .. } => EXIT_ERROR,
        };
        Self::new(code, err.to_string())
    }
}
