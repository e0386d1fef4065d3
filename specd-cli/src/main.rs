//! specd CLI
//!
//! Command-line interface for the job spec API.

mod commands;
mod config;
mod id_resolver;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "specd")]
#[command(about = "Job specification CLI", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, env = "SPECD_URL", default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config { server_url: cli.url };

    handle_command(cli.command, &config).await
}
