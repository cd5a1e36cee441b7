//! CLI Exit Code Registry
//!
//! Single source of truth for the process exit codes of `zippkg`.
//! Scripts driving the packaging pipeline rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error                                            |
//! | 2    | Usage error (bad arguments)                              |
//! | 3    | I/O error (missing directory or file, archive, output)   |
//! | 4    | Spreadsheet could not be read or has no usable header    |
//! | 5    | Malformed report file with `--strict-reports`            |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap reports parse failures itself with the same code.
pub const EXIT_USAGE: u8 = 2;

/// Filesystem or archive failure.
pub const EXIT_IO: u8 = 3;

/// Workbook missing, sheet missing, or header row without recognized columns.
pub const EXIT_SPREADSHEET: u8 = 4;

/// A report file failed to parse and the strict policy was requested.
pub const EXIT_REPORT_LOAD: u8 = 5;
