//! Table formatting for reserve and balance listings.

use alloy_primitives::U256;
use pool_mirror_core::Rates;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use super::{format_apr, format_units, format_wad_pct};

/// One reserve's rate state, ready for display.
pub struct RatesLine {
    pub symbol: String,
    pub utilization: U256,
    pub rates: Rates,
    pub cash: U256,
    pub total_debt: U256,
    pub decimals: u8,
}

#[derive(Tabled)]
struct RatesRow {
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Utilization")]
    utilization: String,
    #[tabled(rename = "Borrow APR")]
    borrow_apr: String,
    #[tabled(rename = "Supply APR")]
    supply_apr: String,
    #[tabled(rename = "Available")]
    available: String,
    #[tabled(rename = "Total Debt")]
    total_debt: String,
}

pub fn format_rates_table(lines: &[RatesLine]) -> String {
    if lines.is_empty() {
        return "No reserves in snapshot.".to_string();
    }

    let rows: Vec<RatesRow> = lines
        .iter()
        .map(|line| RatesRow {
            asset: line.symbol.clone(),
            utilization: format_wad_pct(line.utilization),
            borrow_apr: format_apr(line.rates.borrow_rate_per_second),
            supply_apr: format_apr(line.rates.supply_rate_per_second),
            available: format_units(line.cash, line.decimals),
            total_debt: format_units(line.total_debt, line.decimals),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::sharp())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()));
    table.to_string()
}

/// One position's live balances, ready for display.
pub struct BalanceLine {
    pub symbol: String,
    pub supplied: U256,
    pub borrowed: U256,
    pub decimals: u8,
    pub collateral: bool,
}

#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Supplied")]
    supplied: String,
    #[tabled(rename = "Borrowed")]
    borrowed: String,
    #[tabled(rename = "Collateral")]
    collateral: String,
}

pub fn format_balances_table(lines: &[BalanceLine]) -> String {
    if lines.is_empty() {
        return "No positions in snapshot.".to_string();
    }

    let rows: Vec<BalanceRow> = lines
        .iter()
        .map(|line| BalanceRow {
            asset: line.symbol.clone(),
            supplied: format_units(line.supplied, line.decimals),
            borrowed: format_units(line.borrowed, line.decimals),
            collateral: if line.collateral { "Yes" } else { "No" }.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::sharp())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()));
    table.to_string()
}
