//! `zippkg-recon`: reconciliation of submitted requests against processing reports.
//!
//! Pure engine crate: receives pre-loaded requests and report documents,
//! returns the outer join by file name. No CLI or IO dependencies.

pub mod engine;
pub mod evidence;
pub mod model;
pub mod output;

pub use engine::reconcile;
pub use evidence::{compute_summary, render_summary};
pub use model::{Bucket, ReconOutcome, ReconSummary, ReconcileResult};
pub use output::{project, ReconTable, REPORT_COLUMNS};
