//! Integration tests for the job dispatcher
//!
//! Exercises the pool with scripted engines: aggregation completeness,
//! failure isolation, determinism of the aggregate, pool-size independence,
//! and the bounded-wait timeout.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

use pdfa_stress_rs::prelude::*;

const LONG_TIMEOUT: Duration = Duration::from_secs(60);

fn sink(dir: &TempDir) -> Arc<ReportSink> {
    Arc::new(ReportSink::at_path(dir.path().join("report.jsonl")).unwrap())
}

/// Decides per file name: "missing" fails the batch, "noncompliant" counts
/// against compliance, anything else is compliant. Never touches disk.
struct ScriptedEngine;

impl ValidationEngine for ScriptedEngine {
    fn process(&self, files: &[PathBuf], _sink: &ReportSink) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        for file in files {
            let name = file.to_string_lossy().to_string();
            if name.contains("missing") {
                anyhow::bail!("file not found: {}", name);
            } else if name.contains("noncompliant") {
                summary.non_compliant += 1;
            } else {
                summary.compliant += 1;
            }
        }
        Ok(summary)
    }
}

/// Counts invocations; each file is compliant.
struct CountingEngine {
    calls: AtomicUsize,
}

impl ValidationEngine for CountingEngine {
    fn process(&self, files: &[PathBuf], _sink: &ReportSink) -> Result<BatchSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(BatchSummary {
            failed_parsing_jobs: 0,
            compliant: files.len(),
            non_compliant: 0,
        })
    }
}

/// Sleeps a long time for files named "hang", instant otherwise.
struct HangingEngine;

impl ValidationEngine for HangingEngine {
    fn process(&self, files: &[PathBuf], _sink: &ReportSink) -> Result<BatchSummary> {
        for file in files {
            if file.to_string_lossy().contains("hang") {
                std::thread::sleep(Duration::from_secs(5));
            }
        }
        Ok(BatchSummary {
            failed_parsing_jobs: 0,
            compliant: files.len(),
            non_compliant: 0,
        })
    }
}

/// Panics for files named "panic".
struct PanickingEngine;

impl ValidationEngine for PanickingEngine {
    fn process(&self, files: &[PathBuf], _sink: &ReportSink) -> Result<BatchSummary> {
        for file in files {
            if file.to_string_lossy().contains("panic") {
                panic!("engine blew up on {}", file.display());
            }
        }
        Ok(BatchSummary {
            failed_parsing_jobs: 0,
            compliant: files.len(),
            non_compliant: 0,
        })
    }
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

#[test]
fn test_example_scenario_three_files_two_workers() {
    let dir = TempDir::new().unwrap();
    let jobs = Job::per_file(&paths(&["good.pdf", "noncompliant.pdf", "missing.pdf"]));

    let report = run_with_engine(
        Arc::new(ScriptedEngine),
        sink(&dir),
        jobs,
        2,
        LONG_TIMEOUT,
        None,
    )
    .unwrap();

    assert_eq!(report.total_jobs, 3);
    assert_eq!(report.exceptions, 1);
    assert_eq!(report.incomplete, 0);
    assert_eq!(report.compliant_sum, 1);
    assert_eq!(report.non_compliant_sum, 1);
}

#[test]
fn test_every_job_is_aggregated_exactly_once() {
    let dir = TempDir::new().unwrap();
    let files: Vec<PathBuf> = (0..20).map(|i| PathBuf::from(format!("f{}.pdf", i))).collect();
    let engine = Arc::new(CountingEngine {
        calls: AtomicUsize::new(0),
    });

    let report = run_with_engine(
        engine.clone(),
        sink(&dir),
        Job::per_file(&files),
        4,
        LONG_TIMEOUT,
        None,
    )
    .unwrap();

    assert_eq!(report.total_jobs, 20);
    assert_eq!(report.incomplete, 0);
    assert_eq!(report.exceptions, 0);
    assert_eq!(report.compliant_sum, 20);
    assert_eq!(engine.calls.load(Ordering::SeqCst), 20);
}

#[test]
fn test_aggregate_is_deterministic_across_runs() {
    let files = paths(&["a.pdf", "noncompliant_b.pdf", "missing_c.pdf", "d.pdf"]);

    let mut reports = Vec::new();
    for _ in 0..5 {
        let dir = TempDir::new().unwrap();
        let report = run_with_engine(
            Arc::new(ScriptedEngine),
            sink(&dir),
            Job::per_file(&files),
            3,
            LONG_TIMEOUT,
            None,
        )
        .unwrap();
        reports.push(report);
    }

    for report in &reports[1..] {
        assert_eq!(report, &reports[0]);
    }
}

#[test]
fn test_pool_size_does_not_change_the_aggregate() {
    let files = paths(&["a.pdf", "b.pdf", "missing.pdf"]);

    let run_with = |workers: usize| {
        let dir = TempDir::new().unwrap();
        run_with_engine(
            Arc::new(ScriptedEngine),
            sink(&dir),
            Job::per_file(&files),
            workers,
            LONG_TIMEOUT,
            None,
        )
        .unwrap()
    };

    // 16 workers for 3 jobs must match 2 workers for 3 jobs.
    assert_eq!(run_with(16), run_with(2));
}

#[test]
fn test_zero_jobs_returns_immediately() {
    let dir = TempDir::new().unwrap();
    let start = Instant::now();

    let report = run_with_engine(
        Arc::new(ScriptedEngine),
        sink(&dir),
        Vec::new(),
        8,
        LONG_TIMEOUT,
        None,
    )
    .unwrap();

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(report.total_jobs, 0);
    assert_eq!(report.exceptions, 0);
    assert_eq!(report.compliant_sum, 0);
    assert_eq!(report.non_compliant_sum, 0);
}

#[test]
fn test_timeout_abandons_hanging_job() {
    let dir = TempDir::new().unwrap();
    let jobs = Job::per_file(&paths(&["quick.pdf", "hang.pdf"]));
    let start = Instant::now();

    let report = run_with_engine(
        Arc::new(HangingEngine),
        sink(&dir),
        jobs,
        2,
        Duration::from_millis(300),
        None,
    )
    .unwrap();

    // Returned well before the hanging engine call finished.
    assert!(start.elapsed() < Duration::from_secs(4));
    assert_eq!(report.total_jobs, 2);
    assert_eq!(report.incomplete, 1);
    assert_eq!(report.exceptions, 0);
    assert_eq!(report.compliant_sum, 1);
}

#[test]
fn test_panicking_job_does_not_abort_siblings() {
    let dir = TempDir::new().unwrap();
    let jobs = Job::per_file(&paths(&["a.pdf", "panic.pdf", "c.pdf"]));

    let report = run_with_engine(
        Arc::new(PanickingEngine),
        sink(&dir),
        jobs,
        2,
        LONG_TIMEOUT,
        None,
    )
    .unwrap();

    assert_eq!(report.total_jobs, 3);
    assert_eq!(report.exceptions, 1);
    assert_eq!(report.incomplete, 0);
    assert_eq!(report.compliant_sum, 2);
}

#[test]
fn test_single_failure_only_affects_its_own_job() {
    let files = paths(&["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);

    let baseline = {
        let dir = TempDir::new().unwrap();
        run_with_engine(
            Arc::new(ScriptedEngine),
            sink(&dir),
            Job::per_file(&files),
            2,
            LONG_TIMEOUT,
            None,
        )
        .unwrap()
    };

    let with_failure = {
        let dir = TempDir::new().unwrap();
        let mut files = files.clone();
        files.push(PathBuf::from("missing.pdf"));
        run_with_engine(
            Arc::new(ScriptedEngine),
            sink(&dir),
            Job::per_file(&files),
            2,
            LONG_TIMEOUT,
            None,
        )
        .unwrap()
    };

    assert_eq!(with_failure.exceptions, baseline.exceptions + 1);
    assert_eq!(with_failure.compliant_sum, baseline.compliant_sum);
    assert_eq!(with_failure.non_compliant_sum, baseline.non_compliant_sum);
}

#[test]
fn test_zero_workers_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let result = run_with_engine(
        Arc::new(ScriptedEngine),
        sink(&dir),
        Job::per_file(&paths(&["a.pdf"])),
        0,
        LONG_TIMEOUT,
        None,
    );
    assert!(result.is_err());
}

#[test]
fn test_shutdown_flag_skips_queued_jobs() {
    let dir = TempDir::new().unwrap();
    let shutdown = Arc::new(AtomicBool::new(true));

    let report = run_with_engine(
        Arc::new(ScriptedEngine),
        sink(&dir),
        Job::per_file(&paths(&["a.pdf", "b.pdf"])),
        2,
        LONG_TIMEOUT,
        Some(shutdown),
    )
    .unwrap();

    // Nothing processed, nothing lost track of: both jobs incomplete.
    assert_eq!(report.total_jobs, 2);
    assert_eq!(report.incomplete, 2);
    assert_eq!(report.exceptions, 0);
}

#[test]
fn test_repeated_batch_aggregates_one_summary_per_run() {
    let dir = TempDir::new().unwrap();
    let files = paths(&["a.pdf", "noncompliant.pdf"]);
    let jobs = Job::repeated_batch(&files, 4);

    let report = run_with_engine(
        Arc::new(ScriptedEngine),
        sink(&dir),
        jobs,
        3,
        LONG_TIMEOUT,
        None,
    )
    .unwrap();

    assert_eq!(report.total_jobs, 4);
    assert_eq!(report.compliant_sum, 4);
    assert_eq!(report.non_compliant_sum, 4);
    assert_eq!(report.distinct_failed_parsing, vec![0]);
}

#[test]
fn test_run_with_real_engine_records_missing_files_as_exceptions() {
    let files = paths(&[
        "/tmp/pdfa_stress_no_such_file_1.pdf",
        "/tmp/pdfa_stress_no_such_file_2.pdf",
    ]);

    let report = run(Job::per_file(&files), 2, LONG_TIMEOUT).unwrap();
    assert_eq!(report.total_jobs, 2);
    assert_eq!(report.exceptions, 2);
    assert_eq!(report.incomplete, 0);
}
