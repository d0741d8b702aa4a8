//! Off-chain accounting core for a collateralized lending pool.
//!
//! This crate mirrors, off-chain, the accounting logic the authoritative
//! pool contract applies on-chain: per-asset interest accrual, a two-slope
//! utilization-driven rate curve, health-factor computation, and safe
//! bounds for withdraw/borrow/repay actions. It is a pure function of the
//! snapshots it is given — the contract remains the source of truth, and
//! the core never submits, signs, or persists anything.
//!
//! # Overview
//!
//! - [`math`] — WAD (1e18) / RAY (1e27) fixed-point arithmetic with explicit
//!   rounding and tagged overflow/division failures
//! - [`rates`] — the two-slope utilization curve, producing per-second
//!   RAY-scaled borrow and supply rates
//! - [`reserve`] — reserve snapshots and the discrete index accrual step
//! - [`position`] — user positions and principal-times-index-ratio balances
//! - [`risk`] — collateral/debt valuation, health factor, and max safe
//!   withdraw/borrow amounts
//! - [`settlement`] — the two-tier, dust-tolerant full-repay resolver
//!
//! # Example
//!
//! ```rust,ignore
//! use pool_mirror_core::{account_health, Reserve, UserPosition};
//!
//! // Snapshot structs come from the (out-of-scope) ledger and oracle readers
//! let reserve = reserve.accrue(now)?;
//! let health = account_health(&positions, &reserves, &prices)?;
//!
//! if pool_mirror_core::is_liquidatable(health.health_factor) {
//!     // surface the warning; acting on it is the caller's business
//! }
//! ```
//!
//! Every computed bound is advisory as of read time. The authoritative
//! ledger keeps accruing while a transaction is in flight; callers
//! re-validate against a fresh snapshot or buffer (see [`settlement`])
//! rather than assume exactness at submission time.

pub mod error;
pub mod math;
pub mod position;
pub mod rates;
pub mod reserve;
pub mod risk;
pub mod settlement;

// Re-export commonly used types
pub use error::CoreError;

// Math exports
pub use math::{RoundingDirection, BPS_DENOMINATOR, RAY, SECONDS_PER_YEAR, WAD};

// Rate model exports
pub use rates::{get_rates, utilization, InterestRateConfig, Rates};

// Reserve exports
pub use reserve::{Reserve, RiskConfig};

// Position exports
pub use position::{current_balance, UserPosition};

// Risk exports
pub use risk::{
    account_health, collateral_value_usd, debt_value_usd, health_factor, is_liquidatable,
    max_safe_borrow, max_safe_withdraw, AccountHealth, HEALTH_FACTOR_INFINITE,
};

// Settlement exports
pub use settlement::{
    partial_repay_units, FullSettlement, RepayAction, SettlementConfig, SettlementOutcome,
    SettlementState,
};
