//! Per-reserve rates command implementation.

use anyhow::Result;
use serde_json::json;

use crate::cli::{OutputFormat, RatesArgs};
use crate::output::{self, format_rates_table, RatesLine};
use crate::snapshot;

pub fn run_rates(args: &RatesArgs, format: OutputFormat) -> Result<()> {
    let snapshot = snapshot::load(&args.snapshot)?;

    let mut lines = Vec::new();
    for (asset, reserve) in &snapshot.reserves {
        lines.push(RatesLine {
            symbol: snapshot.symbol(*asset),
            utilization: reserve.utilization(),
            rates: reserve.current_rates()?,
            cash: reserve.cash,
            total_debt: reserve.total_debt_principal,
            decimals: reserve.decimals,
        });
    }
    lines.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    match format {
        OutputFormat::Table => {
            println!("{}", format_rates_table(&lines));
        }
        OutputFormat::Json => {
            let reserves: Vec<_> = lines
                .iter()
                .map(|line| {
                    json!({
                        "symbol": line.symbol,
                        "utilization_wad": line.utilization.to_string(),
                        "borrow_rate_per_second_ray": line.rates.borrow_rate_per_second.to_string(),
                        "supply_rate_per_second_ray": line.rates.supply_rate_per_second.to_string(),
                        "borrow_apr": output::per_second_to_apr(line.rates.borrow_rate_per_second),
                        "supply_apr": output::per_second_to_apr(line.rates.supply_rate_per_second),
                        "available": line.cash.to_string(),
                        "total_debt": line.total_debt.to_string(),
                    })
                })
                .collect();
            let payload = json!({
                "timestamp": snapshot.timestamp,
                "reserves": reserves,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}
