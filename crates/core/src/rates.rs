//! Two-slope utilization-driven interest rate model.
//!
//! The borrow rate follows a kinked curve: a gentle `slope1` segment from
//! zero up to the optimal utilization, then a steep `slope2` segment above
//! it. The supply rate is the borrow rate scaled by utilization and reduced
//! by the reserve factor (the protocol's cut of interest).
//!
//! ```text
//! U <= Uopt:  borrow = base + slope1 * (U / Uopt)
//! U >  Uopt:  borrow = base + slope1 + slope2 * ((U - Uopt) / (1 - Uopt))
//! supply = borrow * U * (1 - reserve_factor)
//! ```
//!
//! Both rates are per-second RAY-scaled fractions. Annualization to an APR
//! percentage is a display-layer concern and deliberately absent here.

use alloy_primitives::{U256, U512};

use crate::error::CoreError;
use crate::math::{bps_to_wad, mul_div, narrow, wad_div, RoundingDirection, BPS_DENOMINATOR, WAD};

/// Parameters of the two-slope rate curve for one reserve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterestRateConfig {
    /// Utilization at the kink, in basis points. Must be nonzero.
    pub optimal_utilization_bps: u16,
    /// Borrow rate at 0% utilization (RAY-scaled, per second).
    pub base_rate_per_second: U256,
    /// Rate increase across the 0..optimal segment (RAY-scaled, per second).
    pub slope1_per_second: U256,
    /// Rate increase across the optimal..100% segment (RAY-scaled, per second).
    pub slope2_per_second: U256,
    /// Protocol's cut of borrow interest, in basis points.
    pub reserve_factor_bps: u16,
}

impl InterestRateConfig {
    /// Rejects parameter sets the model cannot evaluate. A zero optimal
    /// utilization is a configuration error, not a runtime case.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.optimal_utilization_bps == 0 {
            return Err(CoreError::Configuration(
                "optimal utilization must be nonzero".to_string(),
            ));
        }
        if self.optimal_utilization_bps > 10_000 {
            return Err(CoreError::Configuration(format!(
                "optimal utilization {} bps exceeds 100%",
                self.optimal_utilization_bps
            )));
        }
        if self.reserve_factor_bps > 10_000 {
            return Err(CoreError::Configuration(format!(
                "reserve factor {} bps exceeds 100%",
                self.reserve_factor_bps
            )));
        }
        Ok(())
    }
}

/// Per-second rates produced by the model (RAY-scaled).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rates {
    /// Rate paid by borrowers.
    pub borrow_rate_per_second: U256,
    /// Rate earned by suppliers after the reserve factor.
    pub supply_rate_per_second: U256,
}

/// Fraction of pool liquidity currently borrowed (WAD-scaled).
///
/// Zero when there is no debt regardless of cash; 100% when debt exists and
/// cash is exhausted; otherwise `debt / (cash + debt)`.
pub fn utilization(cash: U256, debt: U256) -> U256 {
    if debt.is_zero() {
        return U256::ZERO;
    }
    if cash.is_zero() {
        return WAD;
    }

    // cash + debt can exceed U256; the quotient is bounded by WAD
    let total = U512::from(cash) + U512::from(debt);
    let scaled = U512::from(debt) * U512::from(WAD) / total;
    narrow(scaled).unwrap_or(WAD)
}

/// Evaluates the two-slope curve for the given pool state.
pub fn get_rates(cash: U256, debt: U256, config: &InterestRateConfig) -> Result<Rates, CoreError> {
    config.validate()?;

    let u = utilization(cash, debt);
    let u_opt = bps_to_wad(config.optimal_utilization_bps);

    let borrow_rate = if u <= u_opt {
        let ratio = wad_div(u, u_opt)?;
        let slope_term = mul_div(
            config.slope1_per_second,
            ratio,
            WAD,
            RoundingDirection::Down,
        )?;
        config
            .base_rate_per_second
            .checked_add(slope_term)
            .ok_or(CoreError::Overflow)?
    } else {
        // u > u_opt implies u_opt < WAD, so the excess denominator is nonzero
        let excess = wad_div(u - u_opt, WAD - u_opt)?;
        let slope_term = mul_div(
            config.slope2_per_second,
            excess,
            WAD,
            RoundingDirection::Down,
        )?;
        config
            .base_rate_per_second
            .checked_add(config.slope1_per_second)
            .and_then(|rate| rate.checked_add(slope_term))
            .ok_or(CoreError::Overflow)?
    };

    let gross = mul_div(borrow_rate, u, WAD, RoundingDirection::Down)?;
    let kept_bps = U256::from(10_000 - config.reserve_factor_bps);
    let supply_rate = mul_div(gross, kept_bps, BPS_DENOMINATOR, RoundingDirection::Down)?;

    Ok(Rates {
        borrow_rate_per_second: borrow_rate,
        supply_rate_per_second: supply_rate,
    })
}
