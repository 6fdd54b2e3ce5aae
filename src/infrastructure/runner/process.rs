//! Process-based test runner adapter.
//!
//! Invokes a configurable external command (e.g. `cargo test` behind a
//! reporter shim, `pytest --json-report`) and reads the structured JSON
//! report it leaves at a known path. The command's exit status is not an
//! error signal by itself: a failing suite exits non-zero and still
//! produces a report. What matters is whether the report exists.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tracing::info;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::RunnerConfig;
use crate::domain::ports::TestRunner;

/// Test runner that shells out to an external command.
pub struct ProcessTestRunner {
    program: String,
    args: Vec<String>,
    report_path: PathBuf,
}

impl ProcessTestRunner {
    /// Create a runner from its configuration.
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            report_path: config.report_path.clone(),
        }
    }
}

#[async_trait]
impl TestRunner for ProcessTestRunner {
    async fn run(&self) -> OrchestratorResult<String> {
        // Drop any stale report so a failed run cannot be mistaken for a
        // fresh result.
        match fs::remove_file(&self.report_path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        info!(program = %self.program, args = ?self.args, "running test suite");

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| {
                OrchestratorError::report_unavailable(format!(
                    "failed to run `{}`: {e}",
                    self.program
                ))
            })?;

        info!(
            exit = output.status.code().unwrap_or(-1),
            "test suite finished"
        );

        fs::read_to_string(&self.report_path).await.map_err(|e| {
            OrchestratorError::report_unavailable(format!(
                "no report at {}: {e}",
                self.report_path.display()
            ))
        })
    }
}
