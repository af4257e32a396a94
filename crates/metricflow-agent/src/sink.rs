//! Flush destinations.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use metricflow_core::error::{MetricsError, Result};
use metricflow_core::FlushRecord;

/// Receives one record per flush. Calls are never concurrent with each
/// other for a given registry.
pub trait MetricSink: Send + Sync {
    fn write(&self, record: &FlushRecord) -> Result<()>;
}

/// Appends one text line per flush to a file.
///
/// The file is opened (and created if missing) on every write, so rotating
/// or deleting it between flushes is harmless.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetricSink for FileSink {
    fn write(&self, record: &FlushRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(MetricsError::SinkWriteFailure)?;
        file.write_all(record.to_line().as_bytes())
            .map_err(MetricsError::SinkWriteFailure)
    }
}

/// Keeps records in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<FlushRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<FlushRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetricSink for MemorySink {
    fn write(&self, record: &FlushRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Local;

    #[test]
    fn file_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("metrics.log"));
        let rec = FlushRecord::new(Local::now(), vec![("RPS".into(), "1".into())]);

        sink.write(&rec).unwrap();
        sink.write(&rec).unwrap();

        let body = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] \"RPS\" 1"));
    }

    #[test]
    fn file_sink_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("missing").join("metrics.log"));
        let rec = FlushRecord::new(Local::now(), vec![]);

        let err = sink.write(&rec).unwrap_err();
        assert_eq!(err.kind().as_str(), "SINK_WRITE_FAILURE");
    }
}
