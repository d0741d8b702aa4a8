//! Detailed output formatting for account health, limits and repay plans.

use alloy_primitives::U256;
use colored::Colorize;
use pool_mirror_core::{is_liquidatable, AccountHealth, SettlementConfig};

use super::{format_health_factor, format_units, format_usd};

pub fn format_health_detail(health: &AccountHealth) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", "Account Health".cyan().bold()));
    output.push_str(&format!(
        "  Collateral (USD): {}\n",
        format_usd(health.collateral_value_usd)
    ));
    output.push_str(&format!(
        "  Debt (USD):       {}\n",
        format_usd(health.debt_value_usd)
    ));

    let hf = format_health_factor(health.health_factor);
    let hf = if is_liquidatable(health.health_factor) {
        hf.red().bold()
    } else {
        hf.green()
    };
    output.push_str(&format!("  Health Factor:    {hf}\n"));

    if is_liquidatable(health.health_factor) {
        output.push_str(&format!(
            "  {}\n",
            "Position is eligible for liquidation".red().bold()
        ));
    }

    output
}

pub fn format_limits_detail(
    symbol: &str,
    max_withdraw: U256,
    max_borrow: U256,
    is_borrowable: bool,
    decimals: u8,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", format!("Limits - {symbol}").cyan().bold()));
    output.push_str(&format!(
        "  Max Safe Withdraw: {} {symbol}\n",
        format_units(max_withdraw, decimals)
    ));
    if is_borrowable {
        output.push_str(&format!(
            "  Max Safe Borrow:   {} {symbol}\n",
            format_units(max_borrow, decimals)
        ));
    } else {
        output.push_str("  Max Safe Borrow:   - (reserve not borrowable)\n");
    }
    output.push_str("\n  Amounts are advisory as of the snapshot timestamp.\n");

    output
}

/// A repay plan, either full-settlement (two tiers) or an explicit partial.
pub enum RepayPlan {
    Full {
        debt: U256,
        fallback_amount: U256,
        config: SettlementConfig,
    },
    Partial {
        units: U256,
    },
}

pub fn format_repay_plan(symbol: &str, decimals: u8, plan: &RepayPlan) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}\n",
        format!("Repay Plan - {symbol}").cyan().bold()
    ));

    match plan {
        RepayPlan::Full {
            debt,
            fallback_amount,
            config,
        } => {
            output.push_str(&format!(
                "  Outstanding Debt:  {} {symbol} ({debt} raw units)\n",
                format_units(*debt, decimals)
            ));
            output.push_str("  Preferred:         approve and repay the unlimited sentinel\n");
            output.push_str(&format!(
                "  Fallback:          approve and repay {fallback_amount} raw units ({}x buffer)\n",
                config.buffer_numerator as f64 / config.buffer_denominator as f64
            ));
            output.push_str(&format!(
                "  Dust Tolerance:    residue under {} raw units is a soft success\n",
                config.dust_threshold
            ));
        }
        RepayPlan::Partial { units } => {
            output.push_str(&format!(
                "  Repay:             {} {symbol} ({units} raw units)\n",
                format_units(*units, decimals)
            ));
        }
    }

    output
}
