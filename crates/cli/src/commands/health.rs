//! Account health command implementation.

use anyhow::Result;
use pool_mirror_core::{account_health, is_liquidatable, HEALTH_FACTOR_INFINITE};
use serde_json::json;

use crate::cli::{HealthArgs, OutputFormat};
use crate::output::{format_balances_table, format_health_detail, BalanceLine};
use crate::snapshot;

pub fn run_health(args: &HealthArgs, format: OutputFormat) -> Result<()> {
    let snapshot = snapshot::load(&args.snapshot)?;

    let health = account_health(&snapshot.positions, &snapshot.reserves, &snapshot.prices)?;

    let mut lines = Vec::new();
    for position in &snapshot.positions {
        let reserve = snapshot.reserve(position.asset)?;
        lines.push(BalanceLine {
            symbol: snapshot.symbol(position.asset),
            supplied: position.supply_balance(reserve)?,
            borrowed: position.borrow_balance(reserve)?,
            decimals: reserve.decimals,
            collateral: position.use_as_collateral,
        });
    }
    lines.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    match format {
        OutputFormat::Table => {
            println!("{}", format_health_detail(&health));
            println!("{}", format_balances_table(&lines));
        }
        OutputFormat::Json => {
            let positions: Vec<_> = lines
                .iter()
                .map(|line| {
                    json!({
                        "symbol": line.symbol,
                        "supplied": line.supplied.to_string(),
                        "borrowed": line.borrowed.to_string(),
                        "use_as_collateral": line.collateral,
                    })
                })
                .collect();
            let health_factor = if health.health_factor == HEALTH_FACTOR_INFINITE {
                json!("infinite")
            } else {
                json!(health.health_factor.to_string())
            };
            let payload = json!({
                "timestamp": snapshot.timestamp,
                "user": snapshot.user.to_string(),
                "collateral_value_usd_wad": health.collateral_value_usd.to_string(),
                "debt_value_usd_wad": health.debt_value_usd.to_string(),
                "health_factor_wad": health_factor,
                "liquidatable": is_liquidatable(health.health_factor),
                "positions": positions,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}
