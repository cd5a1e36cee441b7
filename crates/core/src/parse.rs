//! Turn sheet rows into [`Request`]s using the header row's [`ColumnSchema`].

use crate::column::{ColumnHeader, ColumnKind, ColumnSchema, HeaderSyntax};
use crate::metadata::Metadata;
use crate::request::{Pkg, Request};

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";
pub const DEFAULT_EMPTY_COL_LIMIT: i8 = 10;
pub const DEFAULT_EMPTY_ROW_LIMIT: i8 = 10;

/// Parser configuration, built once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub sheet_name: String,
    pub syntax: HeaderSyntax,
    pub empty_col_limit: i8,
    pub empty_row_limit: i8,
    pub default_mime_type: Option<String>,
    pub default_doc_name: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.into(),
            syntax: HeaderSyntax::default(),
            empty_col_limit: DEFAULT_EMPTY_COL_LIMIT,
            empty_row_limit: DEFAULT_EMPTY_ROW_LIMIT,
            default_mime_type: None,
            default_doc_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowStatus {
    Empty,
    Ignored,
    Ok,
}

/// Result of one parse: the resolved schema and the accepted requests.
#[derive(Debug, Clone, Default)]
pub struct ParsedSheet {
    pub schema: ColumnSchema,
    pub requests: Vec<Request>,
    /// Rows dropped by a `Skip` column.
    pub ignored_rows: usize,
}

impl ParsedSheet {
    /// Recognized headers in column order, for output projection.
    pub fn headers(&self) -> Vec<ColumnHeader> {
        self.schema.headers()
    }

    /// The whole batch as one manifest (no header, id left blank).
    pub fn to_pkg(&self) -> Pkg {
        Pkg::new("", Default::default(), self.requests.clone())
    }
}

/// Parse `rows` (row 0 is the header row).
pub fn parse_requests<S: AsRef<str>>(rows: &[Vec<S>], options: &ParseOptions) -> ParsedSheet {
    let mut parsed = ParsedSheet::default();
    let Some((header_row, data_rows)) = rows.split_first() else {
        return parsed;
    };

    parsed.schema = ColumnSchema::resolve(header_row, &options.syntax, options.empty_col_limit);
    let Some(max_col) = parsed.schema.max_col else {
        log::warn!("header row has no recognized columns");
        return parsed;
    };

    let mut empty_run: i32 = 0;
    let mut seq: usize = 0;

    for (offset, row) in data_rows.iter().enumerate() {
        let row_number = offset + 1;
        let (mut request, status) = build_request(row, &parsed.schema, max_col);
        match status {
            RowStatus::Empty => {
                empty_run += 1;
                if empty_run > i32::from(options.empty_row_limit) {
                    log::debug!("stopping at row {row_number}: {empty_run} consecutive empty rows");
                    break;
                }
            }
            RowStatus::Ignored => {
                empty_run = 0;
                parsed.ignored_rows += 1;
                log::debug!("row {row_number} skipped");
            }
            RowStatus::Ok => {
                empty_run = 0;
                seq += 1;
                request.row_number = row_number;
                apply_defaults(&mut request, seq, options);
                parsed.requests.push(request);
            }
        }
    }
    parsed
}

fn build_request<S: AsRef<str>>(
    row: &[S],
    schema: &ColumnSchema,
    max_col: usize,
) -> (Request, RowStatus) {
    let mut request = Request::default();
    let mut metadata = Metadata::new();
    let mut status = RowStatus::Empty;

    for (index, cell) in row.iter().enumerate().take(max_col + 1) {
        let value = cell.as_ref().trim();
        if value.is_empty() {
            continue;
        }
        let Some(header) = schema.get(index) else {
            continue;
        };
        status = RowStatus::Ok;

        match header.kind {
            ColumnKind::Skip => {
                if value.eq_ignore_ascii_case("yes") || value.eq_ignore_ascii_case("true") {
                    return (request, RowStatus::Ignored);
                }
            }
            ColumnKind::FileName => request.file_name = value.to_string(),
            ColumnKind::MimeType => request.mime_type = value.to_string(),
            ColumnKind::DocName => request.doc_name = Some(value.to_string()),
            ColumnKind::Id => request.id = value.to_string(),
            ColumnKind::Tag | ColumnKind::GroupTag => metadata.add_tag_or_group_tag(
                header.group_id.as_deref(),
                header.group_name.as_deref(),
                &header.tag_name,
                value,
            ),
        }
    }

    if !metadata.is_empty() {
        request.metadata = Some(metadata);
    }
    (request, status)
}

fn apply_defaults(request: &mut Request, seq: usize, options: &ParseOptions) {
    if request.id.is_empty() {
        request.id = seq.to_string();
    }
    if request.doc_name.is_none() {
        request.doc_name = options.default_doc_name.clone();
    }
    if request.mime_type.is_empty() {
        if let Some(mime) = &options.default_mime_type {
            request.mime_type = mime.clone();
        }
    }
}
