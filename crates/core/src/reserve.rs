//! Reserve snapshots and discrete interest accrual.
//!
//! A [`Reserve`] is a read-only snapshot of one listed asset's pool state as
//! read from contract storage. The core never mutates the authoritative
//! state: [`Reserve::accrue`] returns a new value with the indices advanced,
//! leaving the original untouched.

use alloy_primitives::{Address, U256};

use crate::error::CoreError;
use crate::math::{ray_mul, RAY};
use crate::rates::{self, InterestRateConfig, Rates};

/// Collateralization parameters for one reserve, in basis points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskConfig {
    /// Maximum borrow power granted per unit of collateral value.
    pub ltv_bps: u16,
    /// Collateral weighting at which a position becomes liquidatable.
    pub liquidation_threshold_bps: u16,
    /// Discount granted to liquidators on seized collateral.
    pub liquidation_bonus_bps: u16,
    /// Maximum fraction of a liquidatable position's debt one liquidation
    /// call may repay. Carried for completeness; liquidation execution is
    /// contract-side.
    pub close_factor_bps: u16,
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, bps) in [
            ("ltv", self.ltv_bps),
            ("liquidation threshold", self.liquidation_threshold_bps),
            ("liquidation bonus", self.liquidation_bonus_bps),
            ("close factor", self.close_factor_bps),
        ] {
            if bps > 10_000 {
                return Err(CoreError::Configuration(format!(
                    "{name} {bps} bps exceeds 100%"
                )));
            }
        }
        if self.ltv_bps > self.liquidation_threshold_bps {
            return Err(CoreError::Configuration(format!(
                "ltv {} bps exceeds liquidation threshold {} bps",
                self.ltv_bps, self.liquidation_threshold_bps
            )));
        }
        Ok(())
    }
}

/// Snapshot of one listed asset's pool state.
#[derive(Debug, Clone)]
pub struct Reserve {
    /// The underlying token.
    pub asset: Address,
    /// Available liquidity, in native token units.
    pub cash: U256,
    /// Debt principal outstanding as of the snapshot, in native units.
    pub total_debt_principal: U256,
    /// Cumulative supply-side interest accumulator (RAY, starts at 1.0).
    pub liquidity_index: U256,
    /// Cumulative borrow-side interest accumulator (RAY, starts at 1.0).
    pub variable_borrow_index: U256,
    /// Supply rate currently applied by the pool (RAY, per second).
    pub liquidity_rate_per_second: U256,
    /// Borrow rate currently applied by the pool (RAY, per second).
    pub variable_borrow_rate_per_second: U256,
    /// Native decimals of the token.
    pub decimals: u8,
    /// Whether the pool accepts new borrows of this asset.
    pub is_borrowable: bool,
    /// Rate curve parameters.
    pub interest: InterestRateConfig,
    /// Collateralization parameters.
    pub risk: RiskConfig,
    /// Unix timestamp of the last on-chain accrual.
    pub last_update_timestamp: u64,
}

impl Reserve {
    /// Checks the snapshot invariants: both indices at or above 1.0 RAY
    /// (indices start at 1.0 and only grow), sane decimals, and valid
    /// rate/risk configuration.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.liquidity_index < RAY {
            return Err(CoreError::InvalidInput(format!(
                "liquidity index below RAY for asset {}",
                self.asset
            )));
        }
        if self.variable_borrow_index < RAY {
            return Err(CoreError::InvalidInput(format!(
                "variable borrow index below RAY for asset {}",
                self.asset
            )));
        }
        if self.decimals > 18 {
            return Err(CoreError::InvalidInput(format!(
                "unsupported token decimals: {}",
                self.decimals
            )));
        }
        self.interest.validate()?;
        self.risk.validate()
    }

    /// Utilization of this reserve (WAD-scaled), from the cash and debt
    /// outstanding as of the snapshot.
    pub fn utilization(&self) -> U256 {
        rates::utilization(self.cash, self.total_debt_principal)
    }

    /// Re-evaluates the rate curve against the snapshot's pool state.
    pub fn current_rates(&self) -> Result<Rates, CoreError> {
        rates::get_rates(self.cash, self.total_debt_principal, &self.interest)
    }

    /// Advances both indices to `now` using the stored per-second rates.
    ///
    /// The update is the discrete linear step the on-chain contract applies:
    /// `index' = index * (1 + rate * dt)`. This is deliberately not
    /// continuous compounding; the mirror must reproduce the authoritative
    /// ledger's per-call accrual granularity exactly.
    ///
    /// Re-accruing at an unchanged (or earlier) timestamp returns the
    /// reserve unchanged, so the operation is idempotent per timestamp.
    /// Principals and cash are untouched: accrual moves indices only.
    pub fn accrue(&self, now: u64) -> Result<Reserve, CoreError> {
        if now <= self.last_update_timestamp {
            return Ok(self.clone());
        }

        let dt = U256::from(now - self.last_update_timestamp);
        let liquidity_factor = RAY
            .checked_add(
                self.liquidity_rate_per_second
                    .checked_mul(dt)
                    .ok_or(CoreError::Overflow)?,
            )
            .ok_or(CoreError::Overflow)?;
        let borrow_factor = RAY
            .checked_add(
                self.variable_borrow_rate_per_second
                    .checked_mul(dt)
                    .ok_or(CoreError::Overflow)?,
            )
            .ok_or(CoreError::Overflow)?;

        Ok(Reserve {
            liquidity_index: ray_mul(self.liquidity_index, liquidity_factor)?,
            variable_borrow_index: ray_mul(self.variable_borrow_index, borrow_factor)?,
            last_update_timestamp: now,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::SECONDS_PER_YEAR;

    fn test_reserve() -> Reserve {
        Reserve {
            asset: Address::ZERO,
            cash: U256::from(200_000_000_000u64),       // 200K at 6 decimals
            total_debt_principal: U256::from(800_000_000_000u64),
            liquidity_index: RAY,
            variable_borrow_index: RAY,
            // ~1.6% / ~2% APR expressed per second (RAY)
            liquidity_rate_per_second: U256::from(507_356_671_000_000_000u64),
            variable_borrow_rate_per_second: U256::from(634_195_839_675_291_699u64),
            decimals: 6,
            is_borrowable: true,
            interest: InterestRateConfig {
                optimal_utilization_bps: 8_000,
                base_rate_per_second: U256::ZERO,
                slope1_per_second: U256::from(634_195_840_000_000_000u64),
                slope2_per_second: U256::from(95_129_375_951_000_000_000u128),
                reserve_factor_bps: 1_000,
            },
            risk: RiskConfig {
                ltv_bps: 7_500,
                liquidation_threshold_bps: 8_000,
                liquidation_bonus_bps: 500,
                close_factor_bps: 5_000,
            },
            last_update_timestamp: 1_000,
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(test_reserve().validate().is_ok());
    }

    #[test]
    fn test_validate_index_below_ray() {
        let mut reserve = test_reserve();
        reserve.liquidity_index = RAY - U256::from(1);
        assert!(matches!(
            reserve.validate(),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_ltv_above_threshold() {
        let mut reserve = test_reserve();
        reserve.risk.ltv_bps = 8_500;
        assert!(matches!(
            reserve.validate(),
            Err(CoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_accrue_no_elapsed_time() {
        let reserve = test_reserve();
        let accrued = reserve.accrue(1_000).unwrap();
        assert_eq!(accrued.liquidity_index, reserve.liquidity_index);
        assert_eq!(accrued.variable_borrow_index, reserve.variable_borrow_index);
        assert_eq!(accrued.last_update_timestamp, 1_000);
    }

    #[test]
    fn test_accrue_earlier_timestamp_is_noop() {
        let reserve = test_reserve();
        let accrued = reserve.accrue(500).unwrap();
        assert_eq!(accrued.last_update_timestamp, 1_000);
        assert_eq!(accrued.liquidity_index, reserve.liquidity_index);
    }

    #[test]
    fn test_accrue_idempotent() {
        // accrue(accrue(r, t), t) == accrue(r, t)
        let reserve = test_reserve();
        let t = 1_000 + 86_400;
        let once = reserve.accrue(t).unwrap();
        let twice = once.accrue(t).unwrap();
        assert_eq!(twice.liquidity_index, once.liquidity_index);
        assert_eq!(twice.variable_borrow_index, once.variable_borrow_index);
    }

    #[test]
    fn test_accrue_grows_indices() {
        let reserve = test_reserve();
        let accrued = reserve.accrue(1_000 + 86_400).unwrap();
        assert!(accrued.liquidity_index > reserve.liquidity_index);
        assert!(accrued.variable_borrow_index > reserve.variable_borrow_index);
        // principals are not touched by accrual
        assert_eq!(accrued.cash, reserve.cash);
        assert_eq!(accrued.total_debt_principal, reserve.total_debt_principal);
    }

    #[test]
    fn test_accrue_linear_step() {
        // One year at ~2% per-second rate: index' = index * (1 + r * dt),
        // exactly the discrete formula, not e^(r * dt).
        let reserve = test_reserve();
        let accrued = reserve.accrue(1_000 + SECONDS_PER_YEAR).unwrap();

        let growth = reserve.variable_borrow_rate_per_second * U256::from(SECONDS_PER_YEAR);
        let expected = (RAY + growth) * reserve.variable_borrow_index / RAY;
        assert_eq!(accrued.variable_borrow_index, expected);
    }

    #[test]
    fn test_reserve_utilization() {
        let reserve = test_reserve();
        assert_eq!(
            reserve.utilization(),
            U256::from(800_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_reserve_current_rates() {
        let reserve = test_reserve();
        let rates = reserve.current_rates().unwrap();
        // 80% utilization sits exactly at the kink
        assert_eq!(
            rates.borrow_rate_per_second,
            reserve.interest.slope1_per_second
        );
    }
}
