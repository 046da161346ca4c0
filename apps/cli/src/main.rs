//! Vilabot CLI: local events for Catalonia, gathered from agenda sites.
//!
//! Turns a search intent into deduplicated event records pulled
//! concurrently from the configured sources.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
