//! Machine-readable report sink and the aggregate summary

pub mod sink;
pub mod summary;

pub use sink::{CheckRecord, ReportSink};
pub use summary::{print_errors, print_summary, summarize, AggregateReport};
