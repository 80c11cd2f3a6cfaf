use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pdfa_stress_rs::prelude::*;

#[derive(Parser)]
#[command(name = "pdfa_stress_rs")]
#[command(about = "Exercises a PDF/A validation engine under concurrent load", long_about = None)]
#[command(override_usage = "pdfa_stress_rs [OPTIONS] THREAD_COUNT [TIMES] FILE...")]
struct Cli {
    /// Size of the worker pool
    #[arg(value_name = "THREAD_COUNT")]
    thread_count: usize,

    /// Optional repetition count followed by input files; if the first
    /// value is an integer and at least one file follows, the whole file
    /// list is submitted that many times as one job per run, otherwise
    /// every value is a file and each file is its own job
    #[arg(value_name = "[TIMES] FILE...", required = true)]
    inputs: Vec<String>,

    /// Maximum time to wait for the pool to drain, in seconds
    #[arg(long, default_value_t = 3600)]
    timeout_secs: u64,

    /// Verbose engine diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

enum Mode {
    PerFile(Vec<PathBuf>),
    Batch { times: usize, files: Vec<PathBuf> },
}

fn split_inputs(inputs: &[String]) -> Mode {
    if inputs.len() >= 2 {
        if let Ok(times) = inputs[0].parse::<usize>() {
            return Mode::Batch {
                times,
                files: inputs[1..].iter().map(PathBuf::from).collect(),
            };
        }
    }
    Mode::PerFile(inputs.iter().map(PathBuf::from).collect())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    anyhow::ensure!(cli.thread_count > 0, "THREAD_COUNT must be positive");

    // Ctrl-C stops workers from picking up further jobs; in-flight jobs
    // still finish and get reported.
    let shutdown_requested = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown_requested.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nShutdown requested; skipping queued jobs...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let jobs = match split_inputs(&cli.inputs) {
        Mode::PerFile(files) => Job::per_file(&files),
        Mode::Batch { times, files } => Job::repeated_batch(&files, times),
    };

    println!("PDF/A Stress Harness");
    println!(
        "Dispatching {} job(s) across {} worker thread(s)",
        jobs.len(),
        cli.thread_count
    );

    let engine = Arc::new(PdfaValidator::new(ValidatorConfig {
        verbose: cli.verbose,
        ..ValidatorConfig::default()
    }));
    let sink = Arc::new(ReportSink::create_temp()?);
    println!("Report output at {}", sink.path().display());

    let report = run_with_engine(
        engine,
        sink,
        jobs,
        cli.thread_count,
        Duration::from_secs(cli.timeout_secs),
        Some(shutdown_requested),
    )?;

    print_summary(&report);

    // Exception count doubles as the exit code so callers can assert on
    // "errors == 0" directly.
    std::process::exit(i32::try_from(report.exceptions.min(100)).unwrap_or(100));
}
