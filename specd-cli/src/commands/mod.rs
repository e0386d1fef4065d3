//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod spec;

pub use spec::SpecCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job spec management
    Specs {
        #[command(subcommand)]
        command: SpecCommands,
    },
}

pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Specs { command } => spec::handle_spec_command(command, config).await,
    }
}
