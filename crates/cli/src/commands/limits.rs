//! Safe withdraw/borrow limits command implementation.

use alloy_primitives::U256;
use anyhow::Result;
use pool_mirror_core::{account_health, max_safe_borrow, max_safe_withdraw};
use serde_json::json;

use crate::cli::{LimitsArgs, OutputFormat};
use crate::output::format_limits_detail;
use crate::snapshot;

pub fn run_limits(args: &LimitsArgs, format: OutputFormat) -> Result<()> {
    let snapshot = snapshot::load(&args.snapshot)?;
    let asset = snapshot.resolve_asset(&args.asset)?;
    let reserve = snapshot.reserve(asset)?;
    let price = snapshot.price(asset)?;
    let position = snapshot.position(asset);

    let health = account_health(&snapshot.positions, &snapshot.reserves, &snapshot.prices)?;
    let supply_balance = position.supply_balance(reserve)?;

    let max_withdraw = max_safe_withdraw(
        health.collateral_value_usd,
        health.debt_value_usd,
        price,
        reserve.risk.liquidation_threshold_bps,
        reserve.decimals,
        supply_balance,
        reserve.cash,
    )?;
    let max_borrow = if reserve.is_borrowable {
        max_safe_borrow(
            health.collateral_value_usd,
            health.debt_value_usd,
            price,
            reserve.risk.ltv_bps,
            reserve.decimals,
            reserve.cash,
        )?
    } else {
        U256::ZERO
    };

    let symbol = snapshot.symbol(asset);
    match format {
        OutputFormat::Table => {
            println!(
                "{}",
                format_limits_detail(
                    &symbol,
                    max_withdraw,
                    max_borrow,
                    reserve.is_borrowable,
                    reserve.decimals,
                )
            );
        }
        OutputFormat::Json => {
            let payload = json!({
                "timestamp": snapshot.timestamp,
                "asset": asset.to_string(),
                "symbol": symbol,
                "max_safe_withdraw": max_withdraw.to_string(),
                "max_safe_borrow": max_borrow.to_string(),
                "is_borrowable": reserve.is_borrowable,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}
