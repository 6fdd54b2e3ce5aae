//! Domain models for the Mender test-repair orchestrator.

pub mod attempt;
pub mod config;
pub mod failure;
pub mod outcome;
pub mod plan;
pub mod report;
pub mod session;

pub use attempt::Attempt;
pub use config::{Config, LoggingConfig, RunnerConfig, TraceConfig, WorkerConfig};
pub use failure::{CouplingSignal, FailureGroup, FailureUnit, GroupKind, PriorAttempt};
pub use outcome::{Diagnostic, ErrorSignature, FailingSet, TestOutcome, TestStatus};
pub use plan::{DispatchPlan, FixReport, GroupOutcome, GroupResult, WorkAssignment};
pub use report::{FinalReport, RunOutcome};
pub use session::{Decision, Directive, RunMode, Session, SessionStatus, StopReason};
