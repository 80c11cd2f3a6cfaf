//! Shared machine-readable report sink

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One check outcome written by the validation engine.
#[derive(Debug, Serialize)]
pub struct CheckRecord {
    pub file: String,
    pub rule: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CheckRecord {
    pub fn passed(file: &Path, rule: &str) -> Self {
        Self {
            file: file.display().to_string(),
            rule: rule.to_string(),
            status: "passed",
            detail: None,
        }
    }

    pub fn failed(file: &Path, rule: &str, detail: Option<&str>) -> Self {
        Self {
            file: file.display().to_string(),
            rule: rule.to_string(),
            status: "failed",
            detail: detail.map(str::to_string),
        }
    }
}

/// Append-only JSON-lines report file, shared by all workers.
///
/// Created once per run; its contents are produced entirely by the
/// validation engine and are opaque to the harness, which only prints the
/// path. Writes are serialized by a mutex so records from concurrent jobs
/// never interleave mid-line.
pub struct ReportSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl ReportSink {
    /// Create the sink as a temp file that persists for the run.
    pub fn create_temp() -> Result<Self> {
        let (file, path) = tempfile::Builder::new()
            .prefix("pdfa-report-")
            .suffix(".jsonl")
            .tempfile()
            .context("failed to create report file")?
            .keep()
            .context("failed to persist report file")?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Create the sink at a caller-chosen path.
    pub fn at_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path)
            .with_context(|| format!("failed to create report file {}", path.display()))?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a JSON line.
    pub fn write_record(&self, record: &CheckRecord) -> Result<()> {
        let line = serde_json::to_string(record).context("failed to serialize check record")?;
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(writer, "{}", line).context("failed to write check record")?;
        writer.flush().context("failed to flush report sink")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_records_are_whole_json_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.jsonl");
        let sink = Arc::new(ReportSink::at_path(&path).unwrap());

        let mut handles = Vec::new();
        for i in 0..16 {
            let sink = sink.clone();
            handles.push(thread::spawn(move || {
                let record =
                    CheckRecord::failed(Path::new(&format!("f{}.pdf", i)), "parse", Some("bad"));
                sink.write_record(&record).unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 16);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["status"], "failed");
        }
    }

    #[test]
    fn test_passed_record_omits_detail() {
        let record = CheckRecord::passed(Path::new("a.pdf"), "6.1.3-encryption");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("detail"));
    }
}
