//! Command-line interface.

pub mod commands;
pub mod display;
pub mod prompt;

use clap::{Parser, Subcommand};

/// Mender: test-repair orchestrator.
///
/// Runs the test suite, classifies failures into independent and coupled
/// groups, dispatches isolated repair workers, and iterates until the suite
/// passes, the retry budget runs out, or no progress is made.
#[derive(Parser, Debug)]
#[command(name = "mender", version, about)]
pub struct Cli {
    /// Emit machine-readable JSON instead of human output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a fresh repair session
    Run(commands::run::RunArgs),
    /// Resume a persisted session
    Resume(commands::resume::ResumeArgs),
    /// Dry run: print the dispatch plan without repairing anything
    Plan(commands::plan::PlanArgs),
    /// Inspect or reset the persisted session
    Session(commands::session::SessionArgs),
}

/// Print a top-level error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) {
    if json_mode {
        eprintln!(
            "{}",
            serde_json::json!({ "error": format!("{err:#}") })
        );
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1);
}
