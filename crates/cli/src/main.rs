//! pool-mirror CLI - inspect lending pool state from a ledger snapshot.

mod cli;
mod commands;
mod output;
mod snapshot;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use commands::{run_health, run_limits, run_rates, run_repay};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rates(args) => {
            run_rates(&args, cli.format)?;
        }
        Commands::Health(args) => {
            run_health(&args, cli.format)?;
        }
        Commands::Limits(args) => {
            run_limits(&args, cli.format)?;
        }
        Commands::Repay(args) => {
            run_repay(&args, cli.format)?;
        }
    }

    Ok(())
}
