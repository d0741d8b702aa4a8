//! Output formatting: tables, colored detail views, and the numeric
//! display helpers layered on top of the core's per-second, WAD/RAY-scaled
//! values (annualization and human rounding happen here, not in the core).

mod detail;
mod table;

pub use detail::{format_health_detail, format_limits_detail, format_repay_plan, RepayPlan};
pub use table::{format_balances_table, format_rates_table, BalanceLine, RatesLine};

use alloy_primitives::U256;
use pool_mirror_core::{HEALTH_FACTOR_INFINITE, SECONDS_PER_YEAR};

/// Lossy conversion for display math only.
pub(crate) fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap_or(f64::MAX)
}

/// Annualizes a per-second RAY-scaled rate to an APR fraction.
pub fn per_second_to_apr(rate: U256) -> f64 {
    u256_to_f64(rate) / 1e27 * SECONDS_PER_YEAR as f64
}

/// Formats a WAD-scaled ratio (e.g. utilization) as a percentage.
pub fn format_wad_pct(value: U256) -> String {
    format!("{:.2}%", u256_to_f64(value) / 1e18 * 100.0)
}

pub fn format_apr(rate: U256) -> String {
    format!("{:.2}%", per_second_to_apr(rate) * 100.0)
}

/// Formats a WAD-scaled USD value.
pub fn format_usd(value: U256) -> String {
    format!("${:.2}", u256_to_f64(value) / 1e18)
}

/// Renders a native-unit amount as a decimal token quantity, trailing
/// zeros trimmed.
pub fn format_units(value: U256, decimals: u8) -> String {
    let raw = value.to_string();
    if decimals == 0 {
        return raw;
    }

    let decimals = usize::from(decimals);
    let padded = format!("{raw:0>width$}", width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

/// Health factors: the infinite sentinel renders as a symbol, everything
/// else as a plain ratio.
pub fn format_health_factor(health_factor: U256) -> String {
    if health_factor == HEALTH_FACTOR_INFINITE {
        "∞".to_string()
    } else {
        format!("{:.2}", u256_to_f64(health_factor) / 1e18)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(1_000_000u64), 6), "1");
        assert_eq!(format_units(U256::from(1u64), 6), "0.000001");
        assert_eq!(format_units(U256::from(42u64), 0), "42");
        assert_eq!(format_units(U256::ZERO, 18), "0");
    }

    #[test]
    fn test_format_health_factor_sentinel() {
        assert_eq!(format_health_factor(HEALTH_FACTOR_INFINITE), "∞");
        assert_eq!(
            format_health_factor(U256::from(1_500_000_000_000_000_000u64)),
            "1.50"
        );
    }
}
