//! Dust-safe full-debt settlement planning.
//!
//! Clearing a debt to exactly zero races the authoritative ledger: interest
//! keeps accruing between the moment the debt is read and the moment the
//! repay executes. The resolver encodes the two-tier strategy as an explicit
//! state machine driven by the caller, so both tiers are testable without
//! any transaction-submission side effects:
//!
//! ```text
//! Idle -> UnlimitedAttempted -> ExactWithBufferAttempted -> Cleared | Failed
//! ```
//!
//! The preferred tier asks the collaborator to approve and repay its
//! unbounded-amount sentinel, letting the ledger clear whatever the debt
//! turns out to be at execution time. If the collaborator rejects that
//! (external policy), the fallback approves and repays the read debt scaled
//! by a small buffer, ceiling-rounded, sized to absorb the interest accrued
//! during confirmation latency. Residue below the dust threshold counts as a
//! soft success the caller must surface as a warning; some ledgers retain
//! unrecoverable rounding dust.

use std::cmp::max;

use alloy_primitives::U256;

use crate::error::CoreError;
use crate::math::{mul_div, to_units_ceil, RoundingDirection};

/// Tuning for the full-settlement resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementConfig {
    /// Buffer numerator applied to the debt read before submission.
    pub buffer_numerator: u64,
    /// Buffer denominator.
    pub buffer_denominator: u64,
    /// Remaining principal (raw units) below which settlement counts as a
    /// soft success. A magic constant in the source ledger; configurable
    /// here.
    pub dust_threshold: U256,
}

impl Default for SettlementConfig {
    /// 1.0001x buffer, 1000 raw units of dust tolerance.
    fn default() -> Self {
        Self {
            buffer_numerator: 10_001,
            buffer_denominator: 10_000,
            dust_threshold: U256::from_limbs([1_000, 0, 0, 0]),
        }
    }
}

impl SettlementConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.buffer_denominator == 0 {
            return Err(CoreError::Configuration(
                "settlement buffer denominator must be nonzero".to_string(),
            ));
        }
        if self.buffer_numerator < self.buffer_denominator {
            return Err(CoreError::Configuration(
                "settlement buffer must not shrink the repay amount".to_string(),
            ));
        }
        Ok(())
    }
}

/// What the caller should submit next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepayAction {
    /// Approve and repay the collaborator's unbounded-amount sentinel.
    Unlimited,
    /// Approve and repay exactly this many raw units.
    Exact { amount: U256 },
}

/// Resolver states. `Cleared` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementState {
    Idle,
    UnlimitedAttempted,
    ExactWithBufferAttempted,
    Cleared,
    Failed,
}

/// Tagged result of a settlement attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// Remaining principal read back as exactly zero.
    Cleared,
    /// Residue below the dust threshold: success, but the caller must warn.
    ClearedWithDust { remaining: U256 },
    /// Both tiers exhausted; further retries are the caller's policy call.
    Failed { reason: String },
}

impl SettlementOutcome {
    /// Maps a failed outcome into the core error taxonomy.
    pub fn as_result(&self) -> Result<(), CoreError> {
        match self {
            SettlementOutcome::Failed { reason } => Err(CoreError::SettlementFailed {
                reason: reason.clone(),
            }),
            _ => Ok(()),
        }
    }
}

/// One full-repay attempt against one asset's debt.
#[derive(Debug, Clone)]
pub struct FullSettlement {
    config: SettlementConfig,
    debt_at_read: U256,
    state: SettlementState,
}

impl FullSettlement {
    /// Starts a resolver for the debt principal read from the snapshot.
    pub fn new(debt_at_read: U256, config: SettlementConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            config,
            debt_at_read,
            state: SettlementState::Idle,
        })
    }

    pub fn state(&self) -> SettlementState {
        self.state
    }

    /// The fallback-tier amount: the read debt scaled by the buffer,
    /// ceiling-rounded so the approval never undershoots, and never zero.
    pub fn buffered_amount(&self) -> Result<U256, CoreError> {
        let scaled = mul_div(
            self.debt_at_read,
            U256::from(self.config.buffer_numerator),
            U256::from(self.config.buffer_denominator),
            RoundingDirection::Up,
        )?;
        Ok(max(scaled, U256::from(1)))
    }

    /// Hands the caller the next action to submit, advancing into the
    /// corresponding attempt state. Returns `None` once an attempt is in
    /// flight or the resolver is terminal.
    pub fn next_action(&mut self) -> Result<Option<RepayAction>, CoreError> {
        match self.state {
            SettlementState::Idle => {
                self.state = SettlementState::UnlimitedAttempted;
                Ok(Some(RepayAction::Unlimited))
            }
            _ => Ok(None),
        }
    }

    /// Records that the collaborator rejected the in-flight action. After
    /// the first tier this yields the fallback action; after the second it
    /// reports terminal failure.
    pub fn record_rejection(
        &mut self,
        reason: &str,
    ) -> Result<Option<RepayAction>, CoreError> {
        match self.state {
            SettlementState::UnlimitedAttempted => {
                self.state = SettlementState::ExactWithBufferAttempted;
                let amount = self.buffered_amount()?;
                Ok(Some(RepayAction::Exact { amount }))
            }
            SettlementState::ExactWithBufferAttempted => {
                self.state = SettlementState::Failed;
                Err(CoreError::SettlementFailed {
                    reason: reason.to_string(),
                })
            }
            _ => Err(CoreError::InvalidInput(
                "rejection recorded with no attempt in flight".to_string(),
            )),
        }
    }

    /// Records the post-action principal read back from the ledger and
    /// closes the resolver with a tagged outcome.
    pub fn record_settled(&mut self, remaining_principal: U256) -> Result<SettlementOutcome, CoreError> {
        match self.state {
            SettlementState::UnlimitedAttempted | SettlementState::ExactWithBufferAttempted => {
                if remaining_principal.is_zero() {
                    self.state = SettlementState::Cleared;
                    Ok(SettlementOutcome::Cleared)
                } else if remaining_principal < self.config.dust_threshold {
                    self.state = SettlementState::Cleared;
                    Ok(SettlementOutcome::ClearedWithDust {
                        remaining: remaining_principal,
                    })
                } else {
                    self.state = SettlementState::Failed;
                    Ok(SettlementOutcome::Failed {
                        reason: format!(
                            "remaining principal {remaining_principal} exceeds dust threshold {}",
                            self.config.dust_threshold
                        ),
                    })
                }
            }
            _ => Err(CoreError::InvalidInput(
                "settlement recorded with no attempt in flight".to_string(),
            )),
        }
    }
}

/// Raw units to submit for a user-chosen partial repay. Stateless: the user
/// picked the amount, so no buffer applies; the conversion rounds up and is
/// clamped to at least one raw unit so a zero-amount repay is never
/// submitted.
pub fn partial_repay_units(amount_wad: U256, decimals: u8) -> Result<U256, CoreError> {
    let units = to_units_ceil(amount_wad, decimals)?;
    Ok(max(units, U256::from(1)))
}
