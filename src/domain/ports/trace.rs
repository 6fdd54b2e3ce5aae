/// Trace sink port (trait): the optional debug side-channel.
///
/// When enabled, every worker's resolved input context and raw output are
/// appended to an auxiliary log. Purely observational; nothing in the
/// orchestrator ever reads it back.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::OrchestratorResult;

/// One trace record: a worker invocation's input and output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// When the worker returned.
    pub timestamp: DateTime<Utc>,
    /// Attempt the invocation belonged to.
    pub attempt: u32,
    /// Test ids of the dispatched group.
    pub test_ids: Vec<String>,
    /// The resolved work assignment handed to the worker.
    pub input: Value,
    /// The worker's raw output, or the failure reason.
    pub output: Value,
}

/// Append-only sink for worker traces.
#[async_trait]
pub trait TraceSink: Send + Sync {
    /// Append one entry. Failures are the caller's to log-and-ignore; a
    /// broken trace must never fail a repair attempt.
    async fn record(&self, entry: TraceEntry) -> OrchestratorResult<()>;
}
