/// Directive source port (trait) for interactive mode.
///
/// When the state machine suspends after a continuing attempt in
/// interactive mode, it asks this port what to do next. Unattended runs
/// never consult it.
use async_trait::async_trait;

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::Directive;

/// Supplies directives while the orchestrator is suspended between attempts.
#[async_trait]
pub trait DirectiveSource: Send + Sync {
    /// Wait for the next directive.
    ///
    /// `attempt` is the attempt that just completed; `still_failing` is how
    /// many tests remain, for the prompt.
    async fn next_directive(
        &self,
        attempt: u32,
        still_failing: usize,
    ) -> OrchestratorResult<Directive>;
}
