//! Concurrent job dispatch and result aggregation

pub mod aggregator;
pub mod dispatcher;
pub mod job;

pub use aggregator::ResultAggregator;
pub use dispatcher::{run, run_with_engine};
pub use job::{Job, JobError, JobOutcome, JobRecord};
