//! CLI command implementations.

pub mod plan;
pub mod resume;
pub mod run;
pub mod session;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::prompt::StdinDirectiveSource;
use crate::domain::models::Config;
use crate::infrastructure::{
    FileSessionStore, FileTraceSink, ProcessTestRunner, ProcessWorkerRuntime,
};
use crate::services::{Dispatcher, Orchestrator, OrchestratorConfig, ResultStore};

/// The fully wired orchestrator used by the CLI.
pub type CliOrchestrator =
    Orchestrator<ProcessTestRunner, ProcessWorkerRuntime, FileSessionStore, StdinDirectiveSource>;

/// Wire the orchestrator from configuration.
pub(crate) async fn build_orchestrator(config: &Config) -> Result<CliOrchestrator> {
    let result_store = ResultStore::new(Arc::new(ProcessTestRunner::new(&config.runner)));

    let mut dispatcher = Dispatcher::new(Arc::new(ProcessWorkerRuntime::new(&config.worker)));
    if config.trace.enabled {
        let sink = FileTraceSink::new(&config.trace.path)
            .await
            .context("failed to open worker trace")?;
        dispatcher = dispatcher.with_trace(Arc::new(sink));
    }

    let session_store = Arc::new(FileSessionStore::new(&config.session_path));

    Ok(Orchestrator::new(
        result_store,
        dispatcher,
        session_store,
        Arc::new(StdinDirectiveSource::new()),
        OrchestratorConfig {
            concurrency_cap: config.concurrency_cap,
            retry_budget: config.retry_budget,
            no_progress_threshold: config.no_progress_threshold,
        },
    ))
}
