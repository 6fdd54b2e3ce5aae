//! Process-based worker runtime adapter.
//!
//! One child process per repair invocation: the work assignment is written
//! to the worker's stdin as JSON and the fix report is read back from its
//! stdout. The worker performs its own source edits; this adapter only
//! carries the contract.
//!
//! Any breakdown (spawn failure, non-zero exit, unparseable output) is a
//! `WorkerFailed` for that unit; the dispatcher absorbs it and the tests
//! stay failing.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{FixReport, WorkAssignment, WorkerConfig};
use crate::domain::ports::WorkerRuntime;

/// Worker runtime that shells out one process per assignment.
pub struct ProcessWorkerRuntime {
    program: String,
    args: Vec<String>,
}

impl ProcessWorkerRuntime {
    /// Create a worker runtime from its configuration.
    pub fn new(config: &WorkerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    fn failed(unit: &str, reason: impl Into<String>) -> OrchestratorError {
        OrchestratorError::WorkerFailed {
            unit: unit.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl WorkerRuntime for ProcessWorkerRuntime {
    async fn repair(&self, assignment: WorkAssignment) -> OrchestratorResult<FixReport> {
        let unit = assignment.group.test_ids().join(", ");
        debug!(unit = %unit, program = %self.program, "spawning repair worker");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::failed(&unit, format!("failed to spawn worker: {e}")))?;

        let payload = serde_json::to_vec(&assignment)?;
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| Self::failed(&unit, "worker stdin unavailable"))?;
            stdin
                .write_all(&payload)
                .await
                .map_err(|e| Self::failed(&unit, format!("failed to write assignment: {e}")))?;
            // Dropping stdin closes the pipe and signals end of input.
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Self::failed(&unit, format!("failed to collect worker output: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Self::failed(
                &unit,
                format!(
                    "worker exited with {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            ));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| Self::failed(&unit, format!("unparseable fix report: {e}")))
    }
}
