//! Validation engine contract and the PDF/A implementation

pub mod config;
pub mod pdfa;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::reporting::sink::ReportSink;

pub use config::{Flavour, ValidatorConfig};
pub use pdfa::PdfaValidator;

/// Counts produced by the engine for one batch of files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Files that could not be parsed at all.
    pub failed_parsing_jobs: usize,
    /// Files that parsed and passed every compliance rule.
    pub compliant: usize,
    /// Files that parsed but failed at least one rule.
    pub non_compliant: usize,
}

/// Black-box validation collaborator.
///
/// One instance is shared read-concurrently by all workers; the harness
/// never synchronizes calls into it. Whether `process` is safe to invoke
/// from multiple threads at once is exactly the property under test.
pub trait ValidationEngine: Send + Sync {
    /// Validate a batch of files, writing per-check records to `sink`.
    ///
    /// Returns the batch counts, or an error when the batch as a whole
    /// cannot be processed (e.g. an input file cannot be opened).
    fn process(&self, files: &[PathBuf], sink: &ReportSink) -> Result<BatchSummary>;
}
