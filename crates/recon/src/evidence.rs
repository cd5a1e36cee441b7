use std::fmt::Write;

use crate::model::{Bucket, ReconSummary, ReconcileResult};

const RULE: &str = "----------------------------------------------------------------";

/// Tally join results into the five buckets. `skipped_reports` is left at 0
/// for the caller to fill in.
pub fn compute_summary(results: &[ReconcileResult<'_>]) -> ReconSummary {
    let mut summary = ReconSummary::default();
    for r in results {
        match r.bucket() {
            Bucket::RequestOk => summary.requests_ok += 1,
            Bucket::RequestError => summary.requests_error += 1,
            Bucket::NoResponse => summary.requests_no_response += 1,
            Bucket::ResponseOkNoRequest => summary.responses_ok_no_request += 1,
            Bucket::ResponseErrorNoRequest => summary.responses_error_no_request += 1,
        }
    }
    summary
}

/// Human-readable summary table.
pub fn render_summary(summary: &ReconSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Reconcile result:");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Requests OK           : {}", summary.requests_ok);
    let _ = writeln!(out, "Requests Error        : {}", summary.requests_error);
    let _ = writeln!(out, "Requests (No Response): {}", summary.requests_no_response);
    let _ = writeln!(out, "Responses OK (No Req) : {}", summary.responses_ok_no_request);
    let _ = writeln!(out, "Responses Err(No Req) : {}", summary.responses_error_no_request);
    let _ = writeln!(
        out,
        "Total {} requests vs {} responses",
        summary.total_requests(),
        summary.total_responses()
    );
    let _ = writeln!(out, "Skipped report files  : {}", summary.skipped_reports);
    let _ = writeln!(out, "{RULE}");
    out
}
