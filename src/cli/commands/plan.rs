//! `mender plan`: dry run.
//!
//! Discovers and classifies, then prints the dispatch plan (groups,
//! batching, lane assignment) without dispatching and without touching the
//! session.

use anyhow::Result;
use clap::Args;

use crate::cli::display;
use crate::infrastructure::ConfigLoader;

#[derive(Args, Debug)]
pub struct PlanArgs {}

pub async fn execute(_args: PlanArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;

    let orchestrator = super::build_orchestrator(&config).await?;
    let plan = orchestrator.plan().await?;

    display::print_plan(&plan, json_mode);
    Ok(())
}
