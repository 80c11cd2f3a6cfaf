//! Job identity and per-job outcomes

use std::path::PathBuf;

use crate::engine::BatchSummary;

/// One unit of work: a set of input files validated together.
///
/// Created at dispatch time and immutable afterwards. `id` is the
/// aggregation key; `label` is the human-readable identity used in
/// progress and error lines (the file path in per-file mode, the run
/// index in repetition mode).
#[derive(Debug, Clone)]
pub struct Job {
    pub id: usize,
    pub label: String,
    pub files: Vec<PathBuf>,
}

impl Job {
    /// One job per input file, labelled by path.
    pub fn per_file(files: &[PathBuf]) -> Vec<Job> {
        files
            .iter()
            .enumerate()
            .map(|(i, path)| Job {
                id: i,
                label: path.display().to_string(),
                files: vec![path.clone()],
            })
            .collect()
    }

    /// The whole file list as one job, repeated `times` times and
    /// labelled by 1-based run index.
    pub fn repeated_batch(files: &[PathBuf], times: usize) -> Vec<Job> {
        (0..times)
            .map(|i| Job {
                id: i,
                label: (i + 1).to_string(),
                files: files.to_vec(),
            })
            .collect()
    }
}

/// Failure of a single job, caught at the worker boundary.
///
/// Carries kind + message rather than the source error so aggregator
/// snapshots stay cheap to clone.
#[derive(Debug, Clone)]
pub enum JobError {
    /// The engine returned an error for this job.
    Engine { message: String },
    /// The engine panicked; the panic was contained to this job.
    Panic { message: String },
}

impl JobError {
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::Engine { .. } => "EngineError",
            JobError::Panic { .. } => "Panic",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            JobError::Engine { message } | JobError::Panic { message } => message,
        }
    }
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind(), self.message())
    }
}

/// Produced exactly once per job: a summary on success, an error otherwise.
pub type JobOutcome = Result<BatchSummary, JobError>;

/// Aggregator entry: the job's label plus its terminal outcome.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub label: String,
    pub outcome: JobOutcome,
}
