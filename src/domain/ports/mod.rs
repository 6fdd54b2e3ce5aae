//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interfaces that infrastructure
//! adapters must implement:
//! - `TestRunner`: invoke the external test runner and fetch its raw report
//! - `WorkerRuntime`: execute one repair worker against a work assignment
//! - `SessionStore`: durable persistence of the session aggregate
//! - `DirectiveSource`: interactive-mode directives at attempt boundaries
//! - `TraceSink`: optional append-only worker trace side-channel
//!
//! These traits define the contracts that keep the orchestration services
//! independent of specific infrastructure implementations.

pub mod directive;
pub mod session_store;
pub mod test_runner;
pub mod trace;
pub mod worker_runtime;

pub use directive::DirectiveSource;
pub use session_store::SessionStore;
pub use test_runner::TestRunner;
pub use trace::{TraceEntry, TraceSink};
pub use worker_runtime::WorkerRuntime;
