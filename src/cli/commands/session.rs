//! `mender session`: inspect or reset the persisted session.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;

use crate::cli::display;
use crate::domain::ports::SessionStore;
use crate::infrastructure::{ConfigLoader, FileSessionStore};

#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Show the persisted session and its attempt history
    Show,
    /// Delete the persisted session
    Reset,
}

pub async fn execute(args: SessionArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let store = FileSessionStore::new(&config.session_path);

    match args.command {
        SessionCommand::Show => {
            let session = store.load().await?;
            display::print_session(&session, json_mode);
        }
        SessionCommand::Reset => {
            store.delete().await?;
            if json_mode {
                println!("{}", serde_json::json!({ "reset": true }));
            } else {
                println!(
                    "{} session at {} removed",
                    style("reset:").bold(),
                    config.session_path.display()
                );
            }
        }
    }

    Ok(())
}
