use serde::Serialize;
use zippkg_core::{ReportDocument, Request};

// ---------------------------------------------------------------------------
// Join results
// ---------------------------------------------------------------------------

/// One row of the outer join. At least one side is always present; when both
/// are, they share the same file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileResult<'a> {
    pub request: Option<&'a Request>,
    pub document: Option<&'a ReportDocument>,
}

impl<'a> ReconcileResult<'a> {
    pub fn bucket(&self) -> Bucket {
        match (self.request, self.document) {
            (Some(_), Some(doc)) if doc.status.is_success() => Bucket::RequestOk,
            (Some(_), Some(_)) => Bucket::RequestError,
            (Some(_), None) => Bucket::NoResponse,
            (None, Some(doc)) if doc.status.is_success() => Bucket::ResponseOkNoRequest,
            // (None, None) is never constructed by the engine
            (None, _) => Bucket::ResponseErrorNoRequest,
        }
    }

    pub fn file_name(&self) -> &'a str {
        match (self.request, self.document) {
            (Some(req), _) => &req.file_name,
            (None, Some(doc)) => &doc.file_name,
            (None, None) => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    RequestOk,
    RequestError,
    NoResponse,
    ResponseOkNoRequest,
    ResponseErrorNoRequest,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub requests_ok: usize,
    pub requests_error: usize,
    pub requests_no_response: usize,
    pub responses_ok_no_request: usize,
    pub responses_error_no_request: usize,
    /// Report files that could not be parsed and were left out.
    pub skipped_reports: usize,
}

impl ReconSummary {
    pub fn total_requests(&self) -> usize {
        self.requests_ok + self.requests_error + self.requests_no_response
    }

    /// Distinct report documents (by file name) taking part in the join.
    pub fn total_responses(&self) -> usize {
        self.requests_ok + self.requests_error + self.responses_ok_no_request + self.responses_error_no_request
    }
}

#[derive(Debug, Clone)]
pub struct ReconOutcome<'a> {
    /// Requests in input order, then unmatched documents in report order.
    pub results: Vec<ReconcileResult<'a>>,
    pub summary: ReconSummary,
}
