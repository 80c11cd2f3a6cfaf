//! Fan-out of validation jobs across a bounded worker pool

use anyhow::{Context, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use super::aggregator::ResultAggregator;
use super::job::{Job, JobError};
use crate::engine::config::ValidatorConfig;
use crate::engine::pdfa::PdfaValidator;
use crate::engine::ValidationEngine;
use crate::reporting::sink::ReportSink;
use crate::reporting::summary::{print_errors, summarize, AggregateReport};

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `jobs` against a fresh [`PdfaValidator`] and a temp-file report sink.
///
/// Constructs exactly one engine and one sink, shared by all workers; the
/// sink path is printed to stdout before any job starts.
pub fn run(jobs: Vec<Job>, worker_count: usize, timeout: Duration) -> Result<AggregateReport> {
    let engine = Arc::new(PdfaValidator::new(ValidatorConfig::default()));
    let sink = Arc::new(ReportSink::create_temp()?);
    println!("Report output at {}", sink.path().display());
    run_with_engine(engine, sink, jobs, worker_count, timeout, None)
}

/// Run `jobs` on a dedicated pool of `worker_count` threads, blocking until
/// every job has recorded an outcome or `timeout` elapses.
///
/// Each worker invokes the engine inside `catch_unwind`: a failing or
/// panicking job is recorded against its own id and never aborts a sibling.
/// On timeout the remaining jobs are abandoned best-effort (in-flight engine
/// calls are not interrupted; the pool's threads finish detached) and the
/// partial aggregate is returned. Workers consult `shutdown` before picking
/// up a job; jobs skipped after an interrupt count as incomplete.
pub fn run_with_engine(
    engine: Arc<dyn ValidationEngine>,
    sink: Arc<ReportSink>,
    jobs: Vec<Job>,
    worker_count: usize,
    timeout: Duration,
    shutdown: Option<Arc<AtomicBool>>,
) -> Result<AggregateReport> {
    anyhow::ensure!(worker_count > 0, "worker count must be positive");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .thread_name(|i| format!("pdfa-worker-{}", i))
        .build()
        .context("failed to build worker pool")?;

    let total_jobs = jobs.len();
    let aggregator = Arc::new(ResultAggregator::new());
    let (done_tx, done_rx) = mpsc::channel::<usize>();

    for job in jobs {
        let engine = engine.clone();
        let sink = sink.clone();
        let aggregator = aggregator.clone();
        let shutdown = shutdown.clone();
        let done_tx = done_tx.clone();

        pool.spawn(move || {
            // Skip (not fail) jobs once an interrupt was requested.
            if shutdown
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::SeqCst))
            {
                let _ = done_tx.send(job.id);
                return;
            }

            println!("Start #{}", job.label);
            let outcome =
                match panic::catch_unwind(AssertUnwindSafe(|| engine.process(&job.files, &sink))) {
                    Ok(Ok(summary)) => Ok(summary),
                    Ok(Err(e)) => Err(JobError::Engine {
                        message: format!("{:#}", e),
                    }),
                    Err(payload) => Err(JobError::Panic {
                        message: panic_message(payload),
                    }),
                };
            aggregator.record(&job, outcome);
            println!("End #{}", job.label);

            // Receiver may be gone if the dispatcher already timed out.
            let _ = done_tx.send(job.id);
        });
    }
    drop(done_tx);

    // Bounded wait for pool drain. Skipped jobs signal completion without
    // recording, so this counts signals rather than aggregator entries.
    let deadline = Instant::now() + timeout;
    let mut signalled = 0;
    while signalled < total_jobs {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match done_rx.recv_timeout(remaining) {
            Ok(_) => signalled += 1,
            Err(mpsc::RecvTimeoutError::Timeout) => break,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    if signalled < total_jobs {
        eprintln!(
            "Timed out after {:?}; abandoning {} in-flight job(s)",
            timeout,
            total_jobs - signalled
        );
    }
    println!("Terminated parallel execution");

    // Dropping the pool does not join still-running workers; abandoned jobs
    // finish (or hang) on detached threads while we report what we have.
    drop(pool);

    print_errors(&aggregator);
    Ok(summarize(&aggregator, total_jobs))
}
