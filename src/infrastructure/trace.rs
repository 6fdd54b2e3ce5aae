//! Worker trace side-channel.
//!
//! Appends one JSON line per worker invocation (resolved input context plus
//! raw output) to an auxiliary log. Purely observational: the orchestrator
//! never reads it back, and trace failures are logged and swallowed by the
//! dispatcher rather than failing a repair.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::ports::{TraceEntry, TraceSink};

/// Trace sink appending JSONL records to a file.
#[derive(Clone)]
pub struct FileTraceSink {
    log_file: Arc<Mutex<File>>,
}

impl FileTraceSink {
    /// Create a sink writing to the specified file.
    ///
    /// Creates parent directories if they don't exist and opens the file in
    /// append mode to preserve any existing trace.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("failed to create trace directory")?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .context("failed to open trace file")?;

        Ok(Self {
            log_file: Arc::new(Mutex::new(file)),
        })
    }
}

#[async_trait]
impl TraceSink for FileTraceSink {
    async fn record(&self, entry: TraceEntry) -> OrchestratorResult<()> {
        let json = serde_json::to_string(&entry)?;

        {
            let mut file = self.log_file.lock().map_err(|e| {
                OrchestratorError::Io(std::io::Error::other(format!("trace mutex poisoned: {e}")))
            })?;
            writeln!(file, "{json}")?;
            file.flush()?;
        }

        debug!(
            attempt = entry.attempt,
            tests = ?entry.test_ids,
            "worker trace recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(attempt: u32, id: &str) -> TraceEntry {
        TraceEntry {
            timestamp: Utc::now(),
            attempt,
            test_ids: vec![id.to_string()],
            input: serde_json::json!({"group": id}),
            output: serde_json::json!({"outcome": "report"}),
        }
    }

    #[tokio::test]
    async fn records_are_appended_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace").join("trace.jsonl");

        let sink = FileTraceSink::new(&path).await.unwrap();
        sink.record(entry(1, "a")).await.unwrap();
        sink.record(entry(1, "b")).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["attempt"], 1);
        }
    }

    #[tokio::test]
    async fn reopening_preserves_existing_trace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");

        let sink = FileTraceSink::new(&path).await.unwrap();
        sink.record(entry(1, "a")).await.unwrap();
        drop(sink);

        let sink = FileTraceSink::new(&path).await.unwrap();
        sink.record(entry(2, "b")).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
