use std::collections::HashMap;

use zippkg_core::{ReportDocument, Request};

use crate::evidence::compute_summary;
use crate::model::{ReconOutcome, ReconcileResult};

/// Full outer join of `requests` and `documents` by file name.
///
/// When several documents share a file name the last one wins. Results keep
/// request order; unmatched documents follow in the order they were loaded.
pub fn reconcile<'a>(requests: &'a [Request], documents: &'a [ReportDocument]) -> ReconOutcome<'a> {
    let mut pending: HashMap<&str, usize> = HashMap::with_capacity(documents.len());
    for (idx, doc) in documents.iter().enumerate() {
        pending.insert(doc.file_name.as_str(), idx);
    }

    let mut results = Vec::with_capacity(requests.len() + pending.len());
    for request in requests {
        let document = pending
            .remove(request.file_name.as_str())
            .map(|idx| &documents[idx]);
        results.push(ReconcileResult { request: Some(request), document });
    }

    let mut leftover: Vec<usize> = pending.into_values().collect();
    leftover.sort_unstable();
    results.extend(leftover.into_iter().map(|idx| ReconcileResult {
        request: None,
        document: Some(&documents[idx]),
    }));

    let summary = compute_summary(&results);
    ReconOutcome { results, summary }
}
