//! Repay planning command implementation.

use anyhow::Result;
use pool_mirror_core::{partial_repay_units, FullSettlement, SettlementConfig};
use serde_json::json;

use crate::cli::{OutputFormat, RepayArgs};
use crate::output::{format_repay_plan, RepayPlan};
use crate::snapshot::{self, parse_amount_wad};

pub fn run_repay(args: &RepayArgs, format: OutputFormat) -> Result<()> {
    let snapshot = snapshot::load(&args.snapshot)?;
    let asset = snapshot.resolve_asset(&args.asset)?;
    let reserve = snapshot.reserve(asset)?;
    let position = snapshot.position(asset);
    let symbol = snapshot.symbol(asset);

    let plan = match &args.amount {
        Some(amount) => {
            // user picked the amount: ceil conversion, no buffer
            let units = partial_repay_units(parse_amount_wad(amount)?, reserve.decimals)?;
            RepayPlan::Partial { units }
        }
        None => {
            let debt = position.borrow_balance(reserve)?;
            let config = SettlementConfig::default();
            let settlement = FullSettlement::new(debt, config.clone())?;
            RepayPlan::Full {
                debt,
                fallback_amount: settlement.buffered_amount()?,
                config,
            }
        }
    };

    match format {
        OutputFormat::Table => {
            println!("{}", format_repay_plan(&symbol, reserve.decimals, &plan));
        }
        OutputFormat::Json => {
            let payload = match &plan {
                RepayPlan::Full {
                    debt,
                    fallback_amount,
                    config,
                } => json!({
                    "asset": asset.to_string(),
                    "symbol": symbol,
                    "mode": "full",
                    "debt": debt.to_string(),
                    "preferred": "unlimited",
                    "fallback_amount": fallback_amount.to_string(),
                    "dust_threshold": config.dust_threshold.to_string(),
                }),
                RepayPlan::Partial { units } => json!({
                    "asset": asset.to_string(),
                    "symbol": symbol,
                    "mode": "partial",
                    "amount": units.to_string(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}
