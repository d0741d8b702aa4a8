//! Account-level risk aggregation: collateral and debt valuation, health
//! factor, and safe bounds for withdraw/borrow actions.
//!
//! All USD values are WAD-scaled. Every bound computed here is advisory as
//! of the snapshot it was computed from; the authoritative ledger keeps
//! accruing while a transaction is in flight, so callers re-validate or
//! buffer (see [`crate::settlement`]) rather than assume exactness.

use std::cmp::min;
use std::collections::HashMap;

use alloy_primitives::{Address, U256, U512};

use crate::error::CoreError;
use crate::math::{
    from_wad, mul_div, to_wad, wad_div, wad_mul, zero_floor_sub, RoundingDirection,
    BPS_DENOMINATOR, WAD,
};
use crate::position::UserPosition;
use crate::reserve::Reserve;

/// Sentinel health factor for a debt-free account: no amount of collateral
/// growth on a genuinely debt-bearing account can reach it (finite factors
/// cap just below). Callers treat it as "safe, no liquidation risk".
pub const HEALTH_FACTOR_INFINITE: U256 = U256::MAX;

/// Aggregated risk signal for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountHealth {
    /// Liquidation-threshold-weighted collateral value (USD, WAD).
    pub collateral_value_usd: U256,
    /// Total debt value (USD, WAD).
    pub debt_value_usd: U256,
    /// Collateral over debt (WAD), or [`HEALTH_FACTOR_INFINITE`].
    pub health_factor: U256,
}

fn reserve_for<'a>(
    reserves: &'a HashMap<Address, Reserve>,
    asset: Address,
) -> Result<&'a Reserve, CoreError> {
    reserves
        .get(&asset)
        .ok_or(CoreError::MissingReserve { asset })
}

fn price_for(prices: &HashMap<Address, U256>, asset: Address) -> Result<U256, CoreError> {
    prices
        .get(&asset)
        .copied()
        .ok_or(CoreError::MissingPrice { asset })
}

/// USD value of one native-unit balance at a WAD price.
fn value_usd(balance: U256, decimals: u8, price: U256) -> Result<U256, CoreError> {
    wad_mul(to_wad(balance, decimals)?, price)
}

/// Sums the liquidation-threshold-weighted USD value of every supplied
/// balance flagged as collateral. Supplied assets not flagged contribute
/// nothing, whatever their size.
pub fn collateral_value_usd(
    positions: &[UserPosition],
    reserves: &HashMap<Address, Reserve>,
    prices: &HashMap<Address, U256>,
) -> Result<U256, CoreError> {
    let mut total = U256::ZERO;

    for position in positions.iter().filter(|p| p.use_as_collateral) {
        let reserve = reserve_for(reserves, position.asset)?;
        let balance = position.supply_balance(reserve)?;
        if balance.is_zero() {
            continue;
        }

        let price = price_for(prices, position.asset)?;
        let value = value_usd(balance, reserve.decimals, price)?;
        let weighted = mul_div(
            value,
            U256::from(reserve.risk.liquidation_threshold_bps),
            BPS_DENOMINATOR,
            RoundingDirection::Down,
        )?;
        total = total.checked_add(weighted).ok_or(CoreError::Overflow)?;
    }

    Ok(total)
}

/// Sums the USD value of every borrowed balance, unweighted.
pub fn debt_value_usd(
    positions: &[UserPosition],
    reserves: &HashMap<Address, Reserve>,
    prices: &HashMap<Address, U256>,
) -> Result<U256, CoreError> {
    let mut total = U256::ZERO;

    for position in positions {
        let reserve = reserve_for(reserves, position.asset)?;
        let balance = position.borrow_balance(reserve)?;
        if balance.is_zero() {
            continue;
        }

        let price = price_for(prices, position.asset)?;
        let value = value_usd(balance, reserve.decimals, price)?;
        total = total.checked_add(value).ok_or(CoreError::Overflow)?;
    }

    Ok(total)
}

/// Ratio of weighted collateral to debt (WAD-scaled). Total: a debt-free
/// account gets the infinite sentinel, never a division failure.
pub fn health_factor(collateral_usd: U256, debt_usd: U256) -> U256 {
    if debt_usd.is_zero() {
        return HEALTH_FACTOR_INFINITE;
    }

    let quotient = U512::from(collateral_usd) * U512::from(WAD) / U512::from(debt_usd);
    let finite_cap = U512::from(HEALTH_FACTOR_INFINITE - U256::from(1));
    let limbs = min(quotient, finite_cap).into_limbs();
    U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]])
}

/// A position is liquidatable iff its health factor is below 1.0.
pub fn is_liquidatable(health_factor: U256) -> bool {
    health_factor < WAD
}

/// Computes the full aggregate for one account.
pub fn account_health(
    positions: &[UserPosition],
    reserves: &HashMap<Address, Reserve>,
    prices: &HashMap<Address, U256>,
) -> Result<AccountHealth, CoreError> {
    let collateral_value = collateral_value_usd(positions, reserves, prices)?;
    let debt_value = debt_value_usd(positions, reserves, prices)?;
    Ok(AccountHealth {
        collateral_value_usd: collateral_value,
        debt_value_usd: debt_value,
        health_factor: health_factor(collateral_value, debt_value),
    })
}

/// Largest amount of one asset that can be withdrawn without making the
/// account unsafe, in native token units.
///
/// Zero when the account is already at or past the safety boundary.
/// Otherwise the net collateral headroom is un-weighted through the asset's
/// liquidation threshold, converted to token units at `price`, then clamped
/// to the tighter of the user's own supplied balance and the pool's
/// available cash.
pub fn max_safe_withdraw(
    collateral_usd: U256,
    debt_usd: U256,
    price: U256,
    liquidation_threshold_bps: u16,
    decimals: u8,
    user_supply_balance: U256,
    pool_cash: U256,
) -> Result<U256, CoreError> {
    if liquidation_threshold_bps == 0 || liquidation_threshold_bps > 10_000 {
        return Err(CoreError::InvalidInput(format!(
            "liquidation threshold {liquidation_threshold_bps} bps out of range"
        )));
    }
    if collateral_usd <= debt_usd {
        return Ok(U256::ZERO);
    }

    let net_collateral = collateral_usd - debt_usd;
    let max_usd = mul_div(
        net_collateral,
        BPS_DENOMINATOR,
        U256::from(liquidation_threshold_bps),
        RoundingDirection::Down,
    )?;
    let tokens = from_wad(wad_div(max_usd, price)?, decimals)?;

    Ok(min(tokens, min(user_supply_balance, pool_cash)))
}

/// Largest additional borrow of one asset the account's LTV headroom
/// permits, in native token units, clamped to the pool's available cash.
pub fn max_safe_borrow(
    collateral_usd: U256,
    debt_usd: U256,
    price: U256,
    ltv_bps: u16,
    decimals: u8,
    pool_cash: U256,
) -> Result<U256, CoreError> {
    if ltv_bps > 10_000 {
        return Err(CoreError::InvalidInput(format!(
            "ltv {ltv_bps} bps out of range"
        )));
    }

    let capacity = mul_div(
        collateral_usd,
        U256::from(ltv_bps),
        BPS_DENOMINATOR,
        RoundingDirection::Down,
    )?;
    let headroom_usd = zero_floor_sub(capacity, debt_usd);
    if headroom_usd.is_zero() {
        return Ok(U256::ZERO);
    }

    let tokens = from_wad(wad_div(headroom_usd, price)?, decimals)?;
    Ok(min(tokens, pool_cash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::RAY;
    use crate::rates::InterestRateConfig;
    use crate::reserve::RiskConfig;

    fn asset(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn test_reserve(token: Address, decimals: u8, liquidation_threshold_bps: u16) -> Reserve {
        Reserve {
            asset: token,
            cash: U256::from(1_000_000u64) * U256::from(10u64).pow(U256::from(decimals)),
            total_debt_principal: U256::ZERO,
            liquidity_index: RAY,
            variable_borrow_index: RAY,
            liquidity_rate_per_second: U256::ZERO,
            variable_borrow_rate_per_second: U256::ZERO,
            decimals,
            is_borrowable: true,
            interest: InterestRateConfig {
                optimal_utilization_bps: 8_000,
                base_rate_per_second: U256::ZERO,
                slope1_per_second: U256::ZERO,
                slope2_per_second: U256::ZERO,
                reserve_factor_bps: 0,
            },
            risk: RiskConfig {
                ltv_bps: 7_500,
                liquidation_threshold_bps,
                liquidation_bonus_bps: 500,
                close_factor_bps: 5_000,
            },
            last_update_timestamp: 0,
        }
    }

    fn supply_position(token: Address, units: u64, collateral: bool) -> UserPosition {
        UserPosition {
            user: Address::ZERO,
            asset: token,
            supply_principal: U256::from(units),
            supply_snapshot_index: RAY,
            borrow_principal: U256::ZERO,
            borrow_snapshot_index: U256::ZERO,
            use_as_collateral: collateral,
        }
    }

    fn borrow_position(token: Address, units: u64) -> UserPosition {
        UserPosition {
            user: Address::ZERO,
            asset: token,
            supply_principal: U256::ZERO,
            supply_snapshot_index: U256::ZERO,
            borrow_principal: U256::from(units),
            borrow_snapshot_index: RAY,
            use_as_collateral: false,
        }
    }

    #[test]
    fn test_collateral_value_weighted() {
        // 1000 tokens at 6 decimals, $1, 80% threshold -> $800
        let token = asset(1);
        let reserves = HashMap::from([(token, test_reserve(token, 6, 8_000))]);
        let prices = HashMap::from([(token, WAD)]);
        let positions = vec![supply_position(token, 1_000_000_000, true)];

        let value = collateral_value_usd(&positions, &reserves, &prices).unwrap();
        assert_eq!(value, U256::from(800u64) * WAD);
    }

    #[test]
    fn test_collateral_flag_off_contributes_zero() {
        let token = asset(1);
        let reserves = HashMap::from([(token, test_reserve(token, 6, 8_000))]);
        let prices = HashMap::from([(token, WAD)]);
        let positions = vec![supply_position(token, 1_000_000_000, false)];

        let value = collateral_value_usd(&positions, &reserves, &prices).unwrap();
        assert_eq!(value, U256::ZERO);
    }

    #[test]
    fn test_debt_value_unweighted() {
        let token = asset(2);
        let reserves = HashMap::from([(token, test_reserve(token, 6, 8_000))]);
        let prices = HashMap::from([(token, U256::from(2) * WAD)]);
        let positions = vec![borrow_position(token, 500_000_000)];

        let value = debt_value_usd(&positions, &reserves, &prices).unwrap();
        assert_eq!(value, U256::from(1_000u64) * WAD);
    }

    #[test]
    fn test_missing_reserve() {
        let token = asset(3);
        let reserves = HashMap::new();
        let prices = HashMap::from([(token, WAD)]);
        let positions = vec![supply_position(token, 1, true)];

        let result = collateral_value_usd(&positions, &reserves, &prices);
        assert!(matches!(result, Err(CoreError::MissingReserve { .. })));
    }

    #[test]
    fn test_missing_price() {
        let token = asset(3);
        let reserves = HashMap::from([(token, test_reserve(token, 6, 8_000))]);
        let prices = HashMap::new();
        let positions = vec![supply_position(token, 1, true)];

        let result = collateral_value_usd(&positions, &reserves, &prices);
        assert!(matches!(result, Err(CoreError::MissingPrice { .. })));
    }

    #[test]
    fn test_health_factor_infinite_sentinel() {
        assert_eq!(health_factor(U256::ZERO, U256::ZERO), HEALTH_FACTOR_INFINITE);
        assert_eq!(
            health_factor(U256::from(1_000_000u64) * WAD, U256::ZERO),
            HEALTH_FACTOR_INFINITE
        );
        // a debt-bearing account never reaches the sentinel, however lopsided
        let extreme = health_factor(U256::MAX - U256::from(1), U256::from(1));
        assert!(extreme < HEALTH_FACTOR_INFINITE);
    }

    #[test]
    fn test_health_factor_ratio() {
        let hf = health_factor(U256::from(1_500u64) * WAD, U256::from(1_000u64) * WAD);
        assert_eq!(hf, WAD + WAD / U256::from(2));
        assert!(!is_liquidatable(hf));

        let unsafe_hf = health_factor(U256::from(900u64) * WAD, U256::from(1_000u64) * WAD);
        assert!(unsafe_hf < WAD);
        assert!(is_liquidatable(unsafe_hf));
    }

    #[test]
    fn test_account_health_aggregate() {
        let collateral_token = asset(1);
        let debt_token = asset(2);
        let reserves = HashMap::from([
            (collateral_token, test_reserve(collateral_token, 18, 8_000)),
            (debt_token, test_reserve(debt_token, 6, 8_000)),
        ]);
        let prices = HashMap::from([(collateral_token, WAD), (debt_token, WAD)]);

        let supply = supply_position(collateral_token, 0, true);
        let supply = UserPosition {
            supply_principal: U256::from(1_000u64) * WAD,
            ..supply
        };
        let positions = vec![supply, borrow_position(debt_token, 400_000_000)];

        let health = account_health(&positions, &reserves, &prices).unwrap();
        assert_eq!(health.collateral_value_usd, U256::from(800u64) * WAD);
        assert_eq!(health.debt_value_usd, U256::from(400u64) * WAD);
        assert_eq!(health.health_factor, U256::from(2) * WAD);
    }

    #[test]
    fn test_max_safe_withdraw_zero_at_boundary() {
        let thousand = U256::from(1_000u64) * WAD;
        // at and past the boundary, nothing is safely withdrawable
        for debt in [thousand, thousand + WAD] {
            let amount = max_safe_withdraw(
                thousand,
                debt,
                WAD,
                8_000,
                18,
                U256::from(500u64) * WAD,
                U256::from(10_000u64) * WAD,
            )
            .unwrap();
            assert_eq!(amount, U256::ZERO);
        }
    }

    #[test]
    fn test_max_safe_withdraw_headroom() {
        // collateral 1000, debt 400, threshold 80% -> net 600, max 750 USD
        let amount = max_safe_withdraw(
            U256::from(1_000u64) * WAD,
            U256::from(400u64) * WAD,
            WAD,
            8_000,
            18,
            U256::from(10_000u64) * WAD,
            U256::from(10_000u64) * WAD,
        )
        .unwrap();
        assert_eq!(amount, U256::from(750u64) * WAD);
    }

    #[test]
    fn test_max_safe_withdraw_clamped_to_balance() {
        // same headroom, but the user only supplied 500
        let amount = max_safe_withdraw(
            U256::from(1_000u64) * WAD,
            U256::from(400u64) * WAD,
            WAD,
            8_000,
            18,
            U256::from(500u64) * WAD,
            U256::from(10_000u64) * WAD,
        )
        .unwrap();
        assert_eq!(amount, U256::from(500u64) * WAD);
    }

    #[test]
    fn test_max_safe_withdraw_clamped_to_cash() {
        let amount = max_safe_withdraw(
            U256::from(1_000u64) * WAD,
            U256::from(400u64) * WAD,
            WAD,
            8_000,
            18,
            U256::from(10_000u64) * WAD,
            U256::from(100u64) * WAD,
        )
        .unwrap();
        assert_eq!(amount, U256::from(100u64) * WAD);
    }

    #[test]
    fn test_max_safe_withdraw_zero_threshold_rejected() {
        let result = max_safe_withdraw(
            U256::from(1_000u64) * WAD,
            U256::ZERO,
            WAD,
            0,
            18,
            U256::ZERO,
            U256::ZERO,
        );
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_max_safe_borrow_headroom() {
        // collateral 1000 at 75% ltv, debt 400 -> 350 USD of headroom
        let amount = max_safe_borrow(
            U256::from(1_000u64) * WAD,
            U256::from(400u64) * WAD,
            WAD,
            7_500,
            18,
            U256::from(10_000u64) * WAD,
        )
        .unwrap();
        assert_eq!(amount, U256::from(350u64) * WAD);
    }

    #[test]
    fn test_max_safe_borrow_exhausted() {
        // debt already above the ltv capacity floors at zero
        let amount = max_safe_borrow(
            U256::from(1_000u64) * WAD,
            U256::from(900u64) * WAD,
            WAD,
            7_500,
            18,
            U256::from(10_000u64) * WAD,
        )
        .unwrap();
        assert_eq!(amount, U256::ZERO);
    }

    #[test]
    fn test_max_safe_borrow_clamped_to_cash() {
        let amount = max_safe_borrow(
            U256::from(1_000u64) * WAD,
            U256::ZERO,
            WAD,
            7_500,
            18,
            U256::from(50u64) * WAD,
        )
        .unwrap();
        assert_eq!(amount, U256::from(50u64) * WAD);
    }
}
