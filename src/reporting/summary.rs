//! Aggregate report over the drained result set

use serde::Serialize;

use crate::harness::aggregator::ResultAggregator;

/// Read-only view computed after the pool has drained (or the wait timed
/// out). Re-running [`summarize`] on the same aggregator state yields an
/// identical report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    /// Jobs submitted to the pool.
    pub total_jobs: usize,
    /// Jobs whose outcome is an error.
    pub exceptions: usize,
    /// Jobs abandoned by timeout or interrupt (no recorded outcome).
    pub incomplete: usize,
    pub failed_parsing_sum: usize,
    pub compliant_sum: usize,
    pub non_compliant_sum: usize,
    /// Distinct failed-parsing counts across successful jobs, sorted.
    pub distinct_failed_parsing: Vec<usize>,
}

/// Fold the aggregator's final state into an [`AggregateReport`].
///
/// Pure over a snapshot of the aggregator; valid for the all-failed and
/// the no-failure states alike.
pub fn summarize(aggregator: &ResultAggregator, total_jobs: usize) -> AggregateReport {
    let snapshot = aggregator.snapshot();

    let mut report = AggregateReport {
        total_jobs,
        incomplete: total_jobs - snapshot.len(),
        ..AggregateReport::default()
    };

    for record in snapshot.values() {
        match &record.outcome {
            Ok(summary) => {
                report.failed_parsing_sum += summary.failed_parsing_jobs;
                report.compliant_sum += summary.compliant;
                report.non_compliant_sum += summary.non_compliant;
                report.distinct_failed_parsing.push(summary.failed_parsing_jobs);
            }
            Err(_) => report.exceptions += 1,
        }
    }

    report.distinct_failed_parsing.sort_unstable();
    report.distinct_failed_parsing.dedup();
    report
}

/// Per-job error lines to stderr, in job-id order.
pub fn print_errors(aggregator: &ResultAggregator) {
    for record in aggregator.snapshot().values() {
        if let Err(e) = &record.outcome {
            eprintln!("Job #{} exception: {}", record.label, e);
        }
    }
}

/// Human-readable summary block to stdout.
pub fn print_summary(report: &AggregateReport) {
    println!();
    println!("SUMMARY");
    println!("Jobs: {}", report.total_jobs);
    println!("Exceptions: {}", report.exceptions);
    if report.incomplete > 0 {
        println!("Incomplete: {}", report.incomplete);
    }
    println!(
        "Failed parsing: {} (distinct: {:?})",
        report.failed_parsing_sum, report.distinct_failed_parsing
    );
    println!("Compliant: {}", report.compliant_sum);
    println!("NonCompliant: {}", report.non_compliant_sum);
    println!();
}
