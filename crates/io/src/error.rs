use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum IoError {
    /// Workbook could not be opened.
    SpreadsheetOpen { path: PathBuf, message: String },
    /// Sheet missing or unreadable.
    SpreadsheetRead { path: PathBuf, sheet: String, message: String },
    /// Output workbook could not be built or saved.
    SpreadsheetWrite { path: PathBuf, message: String },
    /// Missing directory or file, permission failure, short write.
    FileSystem { op: &'static str, path: PathBuf, source: std::io::Error },
    /// Zip container error.
    Archive { path: PathBuf, message: String },
    /// XML document could not be written or read.
    Serialization { path: PathBuf, message: String },
}

impl IoError {
    pub(crate) fn fs(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::FileSystem { op, path: path.to_path_buf(), source }
    }

    pub(crate) fn archive(path: &Path, message: impl fmt::Display) -> Self {
        Self::Archive { path: path.to_path_buf(), message: message.to_string() }
    }

    pub(crate) fn serialization(path: &Path, message: impl fmt::Display) -> Self {
        Self::Serialization { path: path.to_path_buf(), message: message.to_string() }
    }

    /// Path the failed operation was working on.
    pub fn path(&self) -> &Path {
        match self {
            Self::SpreadsheetOpen { path, .. }
            | Self::SpreadsheetRead { path, .. }
            | Self::SpreadsheetWrite { path, .. }
            | Self::FileSystem { path, .. }
            | Self::Archive { path, .. }
            | Self::Serialization { path, .. } => path,
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpreadsheetOpen { path, message } => {
                write!(f, "cannot open spreadsheet {}: {message}", path.display())
            }
            Self::SpreadsheetRead { path, sheet, message } => {
                write!(f, "cannot read sheet '{sheet}' of {}: {message}", path.display())
            }
            Self::SpreadsheetWrite { path, message } => {
                write!(f, "cannot write spreadsheet {}: {message}", path.display())
            }
            Self::FileSystem { op, path, source } => {
                write!(f, "{op} {}: {source}", path.display())
            }
            Self::Archive { path, message } => {
                write!(f, "zip error in {}: {message}", path.display())
            }
            Self::Serialization { path, message } => {
                write!(f, "{}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}
