//! Flatten join results into a table: the request columns of the input
//! sheet, followed by the fixed report columns.

use zippkg_core::{ColumnHeader, ColumnKind, ReportDocument, Request};

use crate::model::ReconcileResult;

pub const REPORT_COLUMNS: [&str; 5] = [
    "Report Status",
    "Content ID",
    "Error Code",
    "Error Message",
    "Report DocID",
];

/// Header row plus one row per result; missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn project(results: &[ReconcileResult<'_>], headers: &[ColumnHeader]) -> ReconTable {
    let header = headers
        .iter()
        .map(|h| h.raw_name.clone())
        .chain(REPORT_COLUMNS.iter().map(|c| c.to_string()))
        .collect();

    let rows = results
        .iter()
        .map(|result| {
            let mut row = Vec::with_capacity(headers.len() + REPORT_COLUMNS.len());
            match result.request {
                Some(req) => row.extend(headers.iter().map(|h| request_value(req, h).to_string())),
                None => row.resize(headers.len(), String::new()),
            }
            match result.document {
                Some(doc) => row.extend(document_values(doc)),
                None => row.resize(headers.len() + REPORT_COLUMNS.len(), String::new()),
            }
            row
        })
        .collect();

    ReconTable { header, rows }
}

/// The value a request contributes to `header`'s column.
pub fn request_value<'a>(req: &'a Request, header: &ColumnHeader) -> &'a str {
    match header.kind {
        ColumnKind::Skip => "",
        ColumnKind::FileName => &req.file_name,
        ColumnKind::MimeType => &req.mime_type,
        ColumnKind::DocName => req.doc_name.as_deref().unwrap_or_default(),
        ColumnKind::Id => &req.id,
        ColumnKind::Tag => req.tag_value(&header.tag_name).unwrap_or_default(),
        ColumnKind::GroupTag => req
            .group_tag_value(
                header.group_id.as_deref(),
                header.group_name.as_deref().unwrap_or_default(),
                &header.tag_name,
            )
            .unwrap_or_default(),
    }
}

fn document_values(doc: &ReportDocument) -> [String; 5] {
    [
        doc.status.as_str().to_string(),
        doc.content_id.clone().unwrap_or_default(),
        doc.error_code.clone().unwrap_or_default(),
        doc.error_message.clone().unwrap_or_default(),
        doc.doc_ref(),
    ]
}
