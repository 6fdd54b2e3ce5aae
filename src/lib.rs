//! Mender - Test-Repair Orchestrator
//!
//! Mender runs an automated test suite, classifies the failures into
//! independent and coupled groups, repairs them by dispatching isolated
//! worker processes with minimal focused context, and iterates until the
//! suite passes, the retry budget is exhausted, or no measurable progress
//! is made. Progress is persisted after every attempt so an interrupted run
//! can be resumed.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure models, port traits, and errors
//! - **Service Layer** (`services`): Discovery, classification, dispatch,
//!   progress evaluation, and the orchestrator state machine
//! - **Infrastructure Layer** (`infrastructure`): Process adapters for the
//!   runner and worker collaborators, file-backed session persistence,
//!   configuration loading, and the worker trace side-channel
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use mender::services::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Wire ports and run to a terminal state
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{OrchestratorError, OrchestratorResult};
pub use domain::models::{
    Attempt, Config, Decision, Directive, DispatchPlan, FailingSet, FailureGroup, FailureUnit,
    FinalReport, FixReport, GroupKind, RunMode, RunOutcome, Session, SessionStatus, StopReason,
    TestOutcome, TestStatus, WorkAssignment,
};
pub use domain::ports::{DirectiveSource, SessionStore, TestRunner, TraceSink, WorkerRuntime};
pub use infrastructure::{ConfigError, ConfigLoader, FileSessionStore};
pub use services::{
    Dispatcher, FailureClassifier, Orchestrator, OrchestratorConfig, ProgressEvaluator,
    ResultStore,
};
