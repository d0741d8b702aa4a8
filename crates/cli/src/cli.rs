//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// pool-mirror - off-chain view of a collateralized lending pool
#[derive(Parser, Debug)]
#[command(name = "pool-mirror")]
#[command(about = "Inspect lending pool accounting from a ledger snapshot", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show per-reserve utilization and interest rates
    Rates(RatesArgs),
    /// Show the account's collateral, debt and health factor
    Health(HealthArgs),
    /// Show max safe withdraw and borrow amounts for one asset
    Limits(LimitsArgs),
    /// Plan a repay: full settlement, or an explicit partial amount
    Repay(RepayArgs),
}

#[derive(Parser, Debug)]
pub struct RatesArgs {
    /// Path to the snapshot JSON produced by the ledger reader
    pub snapshot: PathBuf,
}

#[derive(Parser, Debug)]
pub struct HealthArgs {
    /// Path to the snapshot JSON produced by the ledger reader
    pub snapshot: PathBuf,
}

#[derive(Parser, Debug)]
pub struct LimitsArgs {
    /// Path to the snapshot JSON produced by the ledger reader
    pub snapshot: PathBuf,

    /// Asset symbol (e.g. USDC) or token address
    pub asset: String,
}

#[derive(Parser, Debug)]
pub struct RepayArgs {
    /// Path to the snapshot JSON produced by the ledger reader
    pub snapshot: PathBuf,

    /// Asset symbol (e.g. USDC) or token address
    pub asset: String,

    /// Human-readable amount to repay (e.g. "100.5"). Omit to plan a
    /// full settlement of the outstanding debt.
    #[arg(long)]
    pub amount: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
