//! Domain errors for the Mender orchestrator.

use thiserror::Error;

/// Errors raised by the orchestrator and its components.
///
/// Two families: environment-level conditions (`ReportUnavailable`,
/// `SessionCorrupt`) halt the whole run and are reported verbatim to the
/// operator; component-local conditions (`WorkerFailed`) are absorbed by the
/// dispatcher and folded into the next attempt's failing set.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("test report unavailable: {reason}")]
    ReportUnavailable { reason: String },

    #[error("worker failed on [{unit}]: {reason}")]
    WorkerFailed { unit: String, reason: String },

    #[error("session state is corrupt: {reason}")]
    SessionCorrupt { reason: String },

    #[error("no session to resume")]
    SessionNotFound,

    #[error("a session already exists; resume it or reset first")]
    SessionExists,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrchestratorError {
    /// Shorthand for a `ReportUnavailable` with a formatted reason.
    pub fn report_unavailable(reason: impl Into<String>) -> Self {
        Self::ReportUnavailable {
            reason: reason.into(),
        }
    }

    /// Shorthand for a `SessionCorrupt` with a formatted reason.
    pub fn session_corrupt(reason: impl Into<String>) -> Self {
        Self::SessionCorrupt {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias used throughout the domain and services layers.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
