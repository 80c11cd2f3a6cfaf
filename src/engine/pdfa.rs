//! PDF/A validation engine

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use super::config::ValidatorConfig;
use super::{BatchSummary, ValidationEngine};
use crate::reporting::sink::{CheckRecord, ReportSink};

// lopdf has known issues with parallel processing of malformed PDFs.
// Capping concurrent parses balances safety with throughput.
const MAX_CONCURRENT_PARSES: usize = 12;

/// A single failed compliance rule for one file.
struct RuleFailure {
    rule: &'static str,
    detail: String,
}

/// PDF/A validator backed by lopdf.
///
/// Parses each input under a concurrency-limiting semaphore and inside
/// `catch_unwind`, then checks a small PDF/A rule set (encryption, XMP
/// metadata, output intent, page tree). Per-check records go to the shared
/// report sink; failures beyond `max_fails_per_rule` are counted but not
/// written.
pub struct PdfaValidator {
    config: ValidatorConfig,
    parse_permits: Arc<Semaphore>,
    rule_fail_counts: Mutex<HashMap<&'static str, usize>>,
}

impl PdfaValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            parse_permits: Arc::new(Semaphore::new(MAX_CONCURRENT_PARSES)),
            rule_fail_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Quick pre-validation before attempting full parse
    /// Checks PDF magic bytes, file size, and EOF marker
    fn quick_validate(&self, path: &Path) -> Result<()> {
        let mut file = File::open(path)?;

        let mut header = [0u8; 8];
        file.read_exact(&mut header)?;
        if &header[0..5] != b"%PDF-" {
            anyhow::bail!("invalid PDF header");
        }

        let file_size = file.metadata()?.len();
        if file_size > 500_000_000 {
            anyhow::bail!("file too large: {} bytes", file_size);
        }
        if file_size < 100 {
            anyhow::bail!("file too small: {} bytes", file_size);
        }

        // %%EOF must appear in the last 1KB
        let tail_size = std::cmp::min(1024, file_size);
        file.seek(SeekFrom::End(-(tail_size as i64)))?;
        let mut tail = vec![0u8; tail_size as usize];
        file.read_exact(&mut tail)?;
        if !tail.windows(5).any(|w| w == b"%%EOF") {
            anyhow::bail!("missing %%EOF marker");
        }

        Ok(())
    }

    /// Full parse with semaphore-capped concurrency and panic isolation.
    fn parse(&self, path: &Path) -> Result<lopdf::Document> {
        self.quick_validate(path)?;

        let _permit = loop {
            if let Ok(permit) = self.parse_permits.clone().try_acquire_owned() {
                break permit;
            }
            std::thread::yield_now();
        };

        let path_buf = path.to_path_buf();
        let result = panic::catch_unwind(AssertUnwindSafe(|| lopdf::Document::load(&path_buf)));

        match result {
            Ok(Ok(doc)) => Ok(doc),
            Ok(Err(e)) => anyhow::bail!("parse error: {}", e),
            Err(_panic) => anyhow::bail!("panic during parse"),
        }
    }

    /// Check the parsed document against the PDF/A rule set.
    fn check_rules(&self, doc: &lopdf::Document) -> Vec<RuleFailure> {
        let mut failures = Vec::new();

        if doc.trailer.has(b"Encrypt") {
            failures.push(RuleFailure {
                rule: "6.1.3-encryption",
                detail: "document is encrypted".to_string(),
            });
        }

        if doc.get_pages().is_empty() {
            failures.push(RuleFailure {
                rule: "6.1.7-page-tree",
                detail: "document has no pages".to_string(),
            });
        }

        match doc.catalog() {
            Ok(catalog) => {
                if !catalog.has(b"Metadata") {
                    failures.push(RuleFailure {
                        rule: "6.7.2-xmp-metadata",
                        detail: "catalog has no Metadata stream".to_string(),
                    });
                }
                if !catalog.has(b"OutputIntents") {
                    failures.push(RuleFailure {
                        rule: "6.2.2-output-intent",
                        detail: "catalog has no OutputIntents".to_string(),
                    });
                }
            }
            Err(e) => {
                failures.push(RuleFailure {
                    rule: "6.1.1-catalog",
                    detail: format!("catalog unavailable: {}", e),
                });
            }
        }

        failures
    }

    /// Write one check outcome to the sink, honoring the per-rule cap and
    /// the log-passed flag.
    fn record_check(
        &self,
        sink: &ReportSink,
        path: &Path,
        rule: &'static str,
        passed: bool,
        detail: Option<&str>,
    ) -> Result<()> {
        if passed {
            if self.config.log_passed {
                sink.write_record(&CheckRecord::passed(path, rule))?;
            }
            return Ok(());
        }

        let over_cap = {
            let mut counts = self
                .rule_fail_counts
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            let count = counts.entry(rule).or_insert(0);
            *count += 1;
            *count > self.config.max_fails_per_rule
        };
        if !over_cap {
            sink.write_record(&CheckRecord::failed(path, rule, detail))?;
        }
        Ok(())
    }

    const RULES: [&'static str; 5] = [
        "6.1.1-catalog",
        "6.1.3-encryption",
        "6.1.7-page-tree",
        "6.2.2-output-intent",
        "6.7.2-xmp-metadata",
    ];
}

impl ValidationEngine for PdfaValidator {
    fn process(&self, files: &[PathBuf], sink: &ReportSink) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for path in files {
            // An unreadable input fails the whole batch; the worker records
            // it as this job's exception.
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?;

            match self.parse(path) {
                Ok(doc) => {
                    let failures = self.check_rules(&doc);
                    for rule in Self::RULES {
                        match failures.iter().find(|f| f.rule == rule) {
                            Some(failure) => self.record_check(
                                sink,
                                path,
                                rule,
                                false,
                                Some(&failure.detail),
                            )?,
                            None => self.record_check(sink, path, rule, true, None)?,
                        }
                    }

                    if failures.is_empty() {
                        summary.compliant += 1;
                    } else {
                        summary.non_compliant += 1;
                        if self.config.verbose {
                            for failure in &failures {
                                eprintln!(
                                    "Non-compliant {}: {} ({})",
                                    path.display(),
                                    failure.rule,
                                    failure.detail
                                );
                            }
                        }
                    }
                }
                Err(e) => {
                    summary.failed_parsing_jobs += 1;
                    sink.write_record(&CheckRecord::failed(
                        path,
                        "parse",
                        Some(&format!("{:#}", e)),
                    ))?;
                    if self.config.verbose {
                        eprintln!("Failed to parse {}: {:#}", path.display(), e);
                    }
                }
            }
        }

        Ok(summary)
    }
}
