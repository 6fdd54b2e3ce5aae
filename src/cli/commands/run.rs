//! `mender run`: start a fresh repair session.

use anyhow::Result;
use clap::Args;

use crate::cli::display;
use crate::domain::models::RunMode;
use crate::domain::ports::SessionStore;
use crate::infrastructure::{ConfigLoader, FileSessionStore};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run unattended: no pause between attempts
    #[arg(long)]
    pub unattended: bool,

    /// Discard any existing session and start over
    #[arg(long)]
    pub fresh: bool,

    /// Override the parallel worker cap
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Override the retry budget
    #[arg(long)]
    pub retry_budget: Option<u32>,
}

pub async fn execute(args: RunArgs, json_mode: bool) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    if let Some(cap) = args.concurrency {
        config.concurrency_cap = cap;
    }
    if let Some(budget) = args.retry_budget {
        config.retry_budget = budget;
    }
    ConfigLoader::validate(&config)?;

    if args.fresh {
        FileSessionStore::new(&config.session_path).delete().await?;
    }

    let mode = if args.unattended {
        RunMode::Unattended
    } else {
        RunMode::Interactive
    };

    let orchestrator = super::build_orchestrator(&config).await?;
    let report = orchestrator.start(mode).await?;

    display::print_final_report(&report, json_mode);
    Ok(())
}
