//! Thread-safe accumulation of per-job outcomes

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::job::{Job, JobOutcome, JobRecord};

/// Merges job outcomes from multiple worker threads.
///
/// The only mutable state shared across workers. Each job reports exactly
/// once; entries are never removed for the lifetime of a run.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Mutex<HashMap<usize, JobRecord>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the terminal outcome for `job`.
    ///
    /// Safe to call concurrently for distinct jobs. Recording the same job
    /// twice is a usage error and panics.
    pub fn record(&self, job: &Job, outcome: JobOutcome) {
        let mut results = self.results.lock().unwrap_or_else(|e| e.into_inner());
        let previous = results.insert(
            job.id,
            JobRecord {
                label: job.label.clone(),
                outcome,
            },
        );
        assert!(
            previous.is_none(),
            "job #{} ({}) reported more than once",
            job.id,
            job.label
        );
    }

    /// Number of outcomes recorded so far.
    pub fn len(&self) -> usize {
        self.results.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all recorded outcomes, ordered by job id.
    pub fn snapshot(&self) -> BTreeMap<usize, JobRecord> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(id, record)| (*id, record.clone()))
            .collect()
    }
}
