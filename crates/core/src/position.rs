//! User positions and live balance derivation.
//!
//! Balances are stored contract-side as a principal plus the index observed
//! when the principal last changed. The live balance is the principal scaled
//! by the ratio of the current index to that snapshot index, so interest
//! accrues without touching the stored principal.

use alloy_primitives::{Address, U256};

use crate::error::CoreError;
use crate::math::{mul_div, RoundingDirection};
use crate::reserve::Reserve;

/// Derives a live balance from a principal/snapshot-index pair.
///
/// A zero snapshot index marks a never-initialized position; the principal
/// (necessarily zero for such positions) is returned unchanged rather than
/// dividing by zero. For fixed principal and snapshot, the result is
/// monotonically non-decreasing as `current_index` grows: interest never
/// reduces a balance.
pub fn current_balance(
    principal: U256,
    snapshot_index: U256,
    current_index: U256,
    rounding: RoundingDirection,
) -> Result<U256, CoreError> {
    if snapshot_index.is_zero() {
        return Ok(principal);
    }
    mul_div(principal, current_index, snapshot_index, rounding)
}

/// One user's stance in one reserve, as read from contract storage.
#[derive(Debug, Clone)]
pub struct UserPosition {
    /// The position holder.
    pub user: Address,
    /// The reserve's underlying token.
    pub asset: Address,
    /// Supplied principal, in native units.
    pub supply_principal: U256,
    /// Liquidity index observed when the supply principal last changed (RAY).
    pub supply_snapshot_index: U256,
    /// Borrowed principal, in native units.
    pub borrow_principal: U256,
    /// Borrow index observed when the borrow principal last changed (RAY).
    pub borrow_snapshot_index: U256,
    /// Whether the supplied balance counts toward collateral.
    pub use_as_collateral: bool,
}

impl UserPosition {
    /// A position that has never touched the reserve.
    pub fn empty(user: Address, asset: Address) -> Self {
        Self {
            user,
            asset,
            supply_principal: U256::ZERO,
            supply_snapshot_index: U256::ZERO,
            borrow_principal: U256::ZERO,
            borrow_snapshot_index: U256::ZERO,
            use_as_collateral: false,
        }
    }

    /// Live supplied balance against the reserve's current liquidity index.
    /// Rounds down: a withdrawal must never be over-credited.
    pub fn supply_balance(&self, reserve: &Reserve) -> Result<U256, CoreError> {
        current_balance(
            self.supply_principal,
            self.supply_snapshot_index,
            reserve.liquidity_index,
            RoundingDirection::Down,
        )
    }

    /// Live debt against the reserve's current borrow index. Rounds up:
    /// understating debt would leave it partially unsettled.
    pub fn borrow_balance(&self, reserve: &Reserve) -> Result<U256, CoreError> {
        current_balance(
            self.borrow_principal,
            self.borrow_snapshot_index,
            reserve.variable_borrow_index,
            RoundingDirection::Up,
        )
    }
}
