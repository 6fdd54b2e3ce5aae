//! Test runner adapters.

pub mod process;

pub use process::ProcessTestRunner;
