//! `mender resume`: pick up a persisted session.
//!
//! Resume never trusts the persisted failing set: the orchestrator discards
//! any in-flight attempt and re-discovers before classifying.

use anyhow::Result;
use clap::Args;

use crate::cli::display;
use crate::infrastructure::ConfigLoader;

#[derive(Args, Debug)]
pub struct ResumeArgs {}

pub async fn execute(_args: ResumeArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;

    let orchestrator = super::build_orchestrator(&config).await?;
    let report = orchestrator.resume().await?;

    display::print_final_report(&report, json_mode);
    Ok(())
}
