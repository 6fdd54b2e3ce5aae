/// Session store port (trait) for dependency injection.
///
/// One durable record per working directory. The orchestrator is the only
/// writer; the only legitimate concurrent reader is a human inspecting
/// state. Writes must be atomic (write-then-publish).
use async_trait::async_trait;

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::Session;

/// Durable persistence for the session aggregate.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the persisted session.
    ///
    /// # Errors
    /// `SessionNotFound` if none exists; `SessionCorrupt` if the record
    /// fails deserialization or its invariant checks.
    async fn load(&self) -> OrchestratorResult<Session>;

    /// Persist the session atomically.
    async fn save(&self, session: &Session) -> OrchestratorResult<()>;

    /// True if a persisted session exists.
    async fn exists(&self) -> OrchestratorResult<bool>;

    /// Delete the persisted session, if any.
    async fn delete(&self) -> OrchestratorResult<()>;
}
