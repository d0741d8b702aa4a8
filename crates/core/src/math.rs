//! WAD/RAY fixed-point arithmetic over `U256`.
//!
//! All amounts crossing the core boundary are scaled integers: WAD (1e18) for
//! human-facing token/USD values, RAY (1e27) for interest rates and indices.
//! Every multiply-then-divide routes through a 512-bit intermediate so that
//! precision is never lost silently; the only failure modes are the explicit
//! [`CoreError::Overflow`] and [`CoreError::DivisionByZero`].

use alloy_primitives::{U256, U512};

use crate::error::CoreError;

/// Fixed-point scale of 10^18, used for token and USD amounts.
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Fixed-point scale of 10^27, used for interest rate and index precision.
pub const RAY: U256 = U256::from_limbs([11_515_845_246_265_065_472, 54_210_108, 0, 0]);

/// Basis-point denominator (100% = 10_000 bps).
pub const BPS_DENOMINATOR: U256 = U256::from_limbs([10_000, 0, 0, 0]);

/// Seconds in a 365-day year, used by display layers to annualize
/// per-second rates.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Rounding applied to the final division of a `mul_div`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingDirection {
    /// Truncate toward zero.
    Down,
    /// Round away from zero.
    Up,
}

/// Narrow a 512-bit value back to `U256`, failing on overflow.
pub(crate) fn narrow(value: U512) -> Result<U256, CoreError> {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|&limb| limb != 0) {
        return Err(CoreError::Overflow);
    }
    Ok(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

/// Computes `a * b / denominator` with a 512-bit intermediate.
pub fn mul_div(
    a: U256,
    b: U256,
    denominator: U256,
    rounding: RoundingDirection,
) -> Result<U256, CoreError> {
    if denominator.is_zero() {
        return Err(CoreError::DivisionByZero);
    }

    let numerator = U512::from(a) * U512::from(b);
    let denominator = U512::from(denominator);
    let quotient = match rounding {
        RoundingDirection::Down => numerator / denominator,
        RoundingDirection::Up => {
            if numerator.is_zero() {
                U512::ZERO
            } else {
                (numerator - U512::from(1u8)) / denominator + U512::from(1u8)
            }
        }
    };

    narrow(quotient)
}

/// WAD-scaled multiplication, rounding down.
pub fn wad_mul(a: U256, b: U256) -> Result<U256, CoreError> {
    mul_div(a, b, WAD, RoundingDirection::Down)
}

/// WAD-scaled division, rounding down.
pub fn wad_div(a: U256, b: U256) -> Result<U256, CoreError> {
    mul_div(a, WAD, b, RoundingDirection::Down)
}

/// RAY-scaled multiplication, rounding down. Used exclusively for
/// index and rate math.
pub fn ray_mul(a: U256, b: U256) -> Result<U256, CoreError> {
    mul_div(a, b, RAY, RoundingDirection::Down)
}

/// RAY-scaled division, rounding down.
pub fn ray_div(a: U256, b: U256) -> Result<U256, CoreError> {
    mul_div(a, RAY, b, RoundingDirection::Down)
}

/// Ceiling division. Used wherever under-approving a repay amount would
/// strand a wei of dust debt.
pub fn ceil_div(a: U256, b: U256) -> Result<U256, CoreError> {
    if b.is_zero() {
        return Err(CoreError::DivisionByZero);
    }
    if a.is_zero() {
        return Ok(U256::ZERO);
    }
    // (a - 1) / b + 1 cannot overflow for a, b >= 1
    Ok((a - U256::from(1)) / b + U256::from(1))
}

/// Subtraction floored at zero.
pub fn zero_floor_sub(a: U256, b: U256) -> U256 {
    a.saturating_sub(b)
}

/// 10^(18 - decimals), the factor between native token units and WAD.
fn unit_scale(decimals: u8) -> Result<U256, CoreError> {
    if decimals > 18 {
        return Err(CoreError::InvalidInput(format!(
            "unsupported token decimals: {decimals}"
        )));
    }
    Ok(U256::from(10u64.pow(u32::from(18 - decimals))))
}

/// Scales a token-native integer amount up to WAD.
pub fn to_wad(amount: U256, decimals: u8) -> Result<U256, CoreError> {
    let scale = unit_scale(decimals)?;
    amount.checked_mul(scale).ok_or(CoreError::Overflow)
}

/// Scales a WAD value down to token-native units, truncating toward zero.
/// Truncation never rounds up an amount a user would receive.
pub fn from_wad(value: U256, decimals: u8) -> Result<U256, CoreError> {
    Ok(value / unit_scale(decimals)?)
}

/// Scales a WAD value down to token-native units, rounding up. Used for
/// repay amounts, where rounding down would leave residual debt.
pub fn to_units_ceil(value: U256, decimals: u8) -> Result<U256, CoreError> {
    ceil_div(value, unit_scale(decimals)?)
}

/// Converts a basis-point fraction to WAD. Exact for all `bps`.
pub fn bps_to_wad(bps: u16) -> U256 {
    U256::from(bps) * WAD / BPS_DENOMINATOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_constants() {
        assert_eq!(WAD, U256::from(10u64).pow(U256::from(18)));
        assert_eq!(RAY, U256::from(10u64).pow(U256::from(27)));
    }

    #[test]
    fn test_wad_mul_identity() {
        let x = U256::from(123_456_789u64);
        assert_eq!(wad_mul(x, WAD).unwrap(), x);
        assert_eq!(wad_mul(x, U256::ZERO).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_wad_div_by_zero() {
        let result = wad_div(WAD, U256::ZERO);
        assert!(matches!(result, Err(CoreError::DivisionByZero)));
    }

    #[test]
    fn test_ray_mul_identity() {
        let x = U256::from(42u64) * RAY;
        assert_eq!(ray_mul(x, RAY).unwrap(), x);
        assert_eq!(ray_div(x, RAY).unwrap(), x);
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // a * b overflows U256 but the quotient fits
        let a = U256::MAX / U256::from(2);
        let result = mul_div(a, WAD, WAD, RoundingDirection::Down).unwrap();
        assert_eq!(result, a);
    }

    #[test]
    fn test_mul_div_overflow() {
        let result = mul_div(U256::MAX, U256::MAX, U256::from(1), RoundingDirection::Down);
        assert!(matches!(result, Err(CoreError::Overflow)));
    }

    #[test]
    fn test_mul_div_rounding() {
        let seven = U256::from(7);
        let three = U256::from(3);
        let one = U256::from(1);
        assert_eq!(
            mul_div(seven, one, three, RoundingDirection::Down).unwrap(),
            U256::from(2)
        );
        assert_eq!(
            mul_div(seven, one, three, RoundingDirection::Up).unwrap(),
            U256::from(3)
        );
    }

    #[test]
    fn test_ceil_div() {
        assert_eq!(ceil_div(U256::ZERO, U256::from(5)).unwrap(), U256::ZERO);
        assert_eq!(ceil_div(U256::from(10), U256::from(5)).unwrap(), U256::from(2));
        assert_eq!(ceil_div(U256::from(11), U256::from(5)).unwrap(), U256::from(3));
        assert!(matches!(
            ceil_div(U256::from(1), U256::ZERO),
            Err(CoreError::DivisionByZero)
        ));
    }

    #[test]
    fn test_wad_round_trip() {
        // from_wad(to_wad(n, d), d) == n for every supported decimals value
        let n = U256::from(123_456_789_012u64);
        for decimals in 0u8..=18 {
            let wad = to_wad(n, decimals).unwrap();
            assert_eq!(from_wad(wad, decimals).unwrap(), n, "decimals {decimals}");
        }
    }

    #[test]
    fn test_from_wad_truncates() {
        // 1.9 tokens at 6 decimals -> 1_900_000 units, but a value one wei
        // short of that truncates down
        let value = U256::from(1_900_000u64) * U256::from(10u64).pow(U256::from(12)) - U256::from(1);
        assert_eq!(from_wad(value, 6).unwrap(), U256::from(1_899_999u64));
    }

    #[test]
    fn test_to_units_ceil() {
        let value = U256::from(10u64).pow(U256::from(12)) + U256::from(1);
        // just over one raw unit at 6 decimals rounds up to two
        assert_eq!(to_units_ceil(value, 6).unwrap(), U256::from(2));
    }

    #[test]
    fn test_to_wad_overflow() {
        let result = to_wad(U256::MAX, 0);
        assert!(matches!(result, Err(CoreError::Overflow)));
    }

    #[test]
    fn test_decimals_out_of_range() {
        let result = to_wad(U256::from(1), 19);
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_bps_to_wad() {
        assert_eq!(bps_to_wad(10_000), WAD);
        assert_eq!(bps_to_wad(8_000), U256::from(800_000_000_000_000_000u64));
        assert_eq!(bps_to_wad(0), U256::ZERO);
    }

    #[test]
    fn test_zero_floor_sub() {
        assert_eq!(zero_floor_sub(U256::from(5), U256::from(3)), U256::from(2));
        assert_eq!(zero_floor_sub(U256::from(3), U256::from(5)), U256::ZERO);
    }
}
