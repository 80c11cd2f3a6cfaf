//! PDF/A Validation Stress Harness
//!
//! Exercises a PDF/A validation engine under concurrent load: a fixed-size
//! worker pool runs validation jobs against a single shared engine instance,
//! per-job outcomes are merged into a thread-safe aggregator, and a
//! deterministic summary is computed after the pool drains (or a timeout
//! elapses).

pub mod engine;
pub mod harness;
pub mod reporting;

pub use engine::ValidationEngine;
pub use harness::dispatcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::engine::config::{Flavour, ValidatorConfig};
    pub use crate::engine::pdfa::PdfaValidator;
    pub use crate::engine::{BatchSummary, ValidationEngine};
    pub use crate::harness::aggregator::ResultAggregator;
    pub use crate::harness::dispatcher::{run, run_with_engine};
    pub use crate::harness::job::{Job, JobError, JobOutcome, JobRecord};
    pub use crate::reporting::sink::ReportSink;
    pub use crate::reporting::summary::{print_errors, print_summary, summarize, AggregateReport};
}
