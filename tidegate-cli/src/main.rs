//! Tidegate CLI - Command-line interface
//!
//! Provides command-line access to Tidegate functionality.

mod commands;

use clap::Parser;
use tidegate_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "tidegate")]
#[command(about = "An authenticated range-streaming media server")]
struct Cli {
    /// Console log verbosity
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level());

    commands::handle_command(cli.command).await?;

    Ok(())
}
