/// Worker runtime port (trait) for dependency injection.
///
/// A worker is an opaque repair function: it receives a fresh, isolated
/// context bundle and answers with a fix report. The orchestrator never
/// inspects how the fix was produced.
use async_trait::async_trait;

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::{FixReport, WorkAssignment};

/// Executes one repair worker against a work assignment.
#[async_trait]
pub trait WorkerRuntime: Send + Sync {
    /// Attempt to repair the assigned group.
    ///
    /// Each invocation is stateless: the assignment is the worker's entire
    /// context. Implementations must be safe to call concurrently up to the
    /// dispatcher's pool cap.
    ///
    /// # Errors
    /// Returns `WorkerFailed` when no usable change could be produced; the
    /// dispatcher absorbs this and the unit stays failing.
    async fn repair(&self, assignment: WorkAssignment) -> OrchestratorResult<FixReport>;
}
