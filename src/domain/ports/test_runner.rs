/// Test runner port (trait) for dependency injection.
///
/// The runner is an external collaborator: it executes the suite and leaves
/// a structured, machine-readable report behind. The orchestrator only ever
/// sees the raw report text; parsing belongs to the result store.
use async_trait::async_trait;

use crate::domain::errors::OrchestratorResult;

/// Executes the test suite and returns the raw structured report.
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Run the suite to completion and return the report contents.
    ///
    /// This call blocks until the external run finishes; it is one of the
    /// two externally-timed operations in the system (the other is worker
    /// execution).
    ///
    /// # Errors
    /// Returns `ReportUnavailable` if the runner could not be executed or
    /// produced no report. A malformed report is the result store's call.
    async fn run(&self) -> OrchestratorResult<String>;
}
