//! Command implementations.

mod health;
mod limits;
mod rates;
mod repay;

pub use health::run_health;
pub use limits::run_limits;
pub use rates::run_rates;
pub use repay::run_repay;
