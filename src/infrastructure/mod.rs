//! Infrastructure layer: adapters for the domain ports plus configuration.

pub mod config;
pub mod runner;
pub mod session;
pub mod trace;
pub mod worker;

pub use config::{ConfigError, ConfigLoader};
pub use runner::ProcessTestRunner;
pub use session::FileSessionStore;
pub use trace::FileTraceSink;
pub use worker::ProcessWorkerRuntime;
