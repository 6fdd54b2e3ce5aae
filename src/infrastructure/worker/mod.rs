//! Repair worker adapters.

pub mod process;

pub use process::ProcessWorkerRuntime;
