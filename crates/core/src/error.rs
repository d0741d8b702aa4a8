//! Error types for the accounting core.

use alloy_primitives::Address;
use thiserror::Error;

/// Errors produced by the accounting core.
///
/// All arithmetic errors are local and recoverable: the usual caller response
/// is to re-fetch a fresh snapshot and recompute. [`CoreError::SettlementFailed`]
/// is surfaced to the end user with its underlying reason instead of being
/// retried automatically.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A fixed-point operation result exceeds the representable range.
    #[error("arithmetic overflow")]
    Overflow,

    /// Explicit division by zero (e.g. `wad_div` with a zero divisor).
    #[error("division by zero")]
    DivisionByZero,

    /// A contract-violating input to an otherwise total function.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A reserve or rate-model parameter set that is rejected up front
    /// (e.g. a zero optimal-utilization threshold).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Both settlement tiers were exhausted without clearing the debt.
    #[error("settlement failed: {reason}")]
    SettlementFailed { reason: String },

    /// A position or price references an asset with no listed reserve.
    #[error("no reserve listed for asset {asset}")]
    MissingReserve { asset: Address },

    /// No oracle price was supplied for an asset the computation needs.
    #[error("no oracle price for asset {asset}")]
    MissingPrice { asset: Address },
}
