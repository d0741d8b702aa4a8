//! Snapshot loading and validation.
//!
//! The snapshot JSON file is the boundary where the out-of-scope ledger and
//! oracle readers deliver their raw structs: reserve state, user positions
//! and WAD-scaled USD prices, stamped with the timestamp of the read. All
//! large integers travel as decimal (or 0x-hex) strings so no precision is
//! lost to JSON number parsing.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use alloy_primitives::{Address, U256};
use anyhow::{bail, Context, Result};
use serde::Deserialize;

use pool_mirror_core::{InterestRateConfig, Reserve, RiskConfig, UserPosition, WAD};

/// On-disk snapshot layout.
#[derive(Debug, Deserialize)]
pub struct SnapshotFile {
    /// Unix timestamp of the read; the staleness marker for everything below.
    pub timestamp: u64,
    /// The account the positions belong to.
    pub user: Address,
    pub reserves: Vec<ReserveEntry>,
    pub positions: Vec<PositionEntry>,
    /// WAD-scaled USD price per whole token.
    pub prices: HashMap<Address, String>,
}

/// One reserve as read from contract storage, flattened for transport.
#[derive(Debug, Deserialize)]
pub struct ReserveEntry {
    pub asset: Address,
    pub symbol: String,
    pub cash: String,
    pub total_debt_principal: String,
    pub liquidity_index: String,
    pub variable_borrow_index: String,
    pub liquidity_rate_per_second: String,
    pub variable_borrow_rate_per_second: String,
    pub decimals: u8,
    pub is_borrowable: bool,
    pub optimal_utilization_bps: u16,
    pub base_rate_per_second: String,
    pub slope1_per_second: String,
    pub slope2_per_second: String,
    pub reserve_factor_bps: u16,
    pub ltv_bps: u16,
    pub liquidation_threshold_bps: u16,
    pub liquidation_bonus_bps: u16,
    pub close_factor_bps: u16,
    pub last_update_timestamp: u64,
}

/// One user-reserve pair as read from contract storage.
#[derive(Debug, Deserialize)]
pub struct PositionEntry {
    pub asset: Address,
    pub supply_principal: String,
    pub supply_snapshot_index: String,
    pub borrow_principal: String,
    pub borrow_snapshot_index: String,
    pub use_as_collateral: bool,
}

/// A loaded snapshot, validated and with every reserve accrued to the
/// read timestamp.
pub struct Snapshot {
    pub timestamp: u64,
    pub user: Address,
    pub symbols: HashMap<Address, String>,
    pub reserves: HashMap<Address, Reserve>,
    pub positions: Vec<UserPosition>,
    pub prices: HashMap<Address, U256>,
}

fn parse_u256(value: &str, field: &str) -> Result<U256> {
    value
        .parse::<U256>()
        .with_context(|| format!("snapshot field {field} is not a valid integer: {value}"))
}

impl ReserveEntry {
    fn into_reserve(self) -> Result<Reserve> {
        let symbol = &self.symbol;
        let reserve = Reserve {
            asset: self.asset,
            cash: parse_u256(&self.cash, "cash")?,
            total_debt_principal: parse_u256(&self.total_debt_principal, "total_debt_principal")?,
            liquidity_index: parse_u256(&self.liquidity_index, "liquidity_index")?,
            variable_borrow_index: parse_u256(&self.variable_borrow_index, "variable_borrow_index")?,
            liquidity_rate_per_second: parse_u256(
                &self.liquidity_rate_per_second,
                "liquidity_rate_per_second",
            )?,
            variable_borrow_rate_per_second: parse_u256(
                &self.variable_borrow_rate_per_second,
                "variable_borrow_rate_per_second",
            )?,
            decimals: self.decimals,
            is_borrowable: self.is_borrowable,
            interest: InterestRateConfig {
                optimal_utilization_bps: self.optimal_utilization_bps,
                base_rate_per_second: parse_u256(&self.base_rate_per_second, "base_rate_per_second")?,
                slope1_per_second: parse_u256(&self.slope1_per_second, "slope1_per_second")?,
                slope2_per_second: parse_u256(&self.slope2_per_second, "slope2_per_second")?,
                reserve_factor_bps: self.reserve_factor_bps,
            },
            risk: RiskConfig {
                ltv_bps: self.ltv_bps,
                liquidation_threshold_bps: self.liquidation_threshold_bps,
                liquidation_bonus_bps: self.liquidation_bonus_bps,
                close_factor_bps: self.close_factor_bps,
            },
            last_update_timestamp: self.last_update_timestamp,
        };
        reserve
            .validate()
            .with_context(|| format!("invalid reserve snapshot for {symbol}"))?;
        Ok(reserve)
    }
}

/// Loads a snapshot file, validates every reserve, and accrues indices to
/// the snapshot timestamp.
pub fn load(path: &Path) -> Result<Snapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let file: SnapshotFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;

    let mut symbols = HashMap::new();
    let mut reserves = HashMap::new();
    for entry in file.reserves {
        let asset = entry.asset;
        symbols.insert(asset, entry.symbol.clone());
        let reserve = entry.into_reserve()?.accrue(file.timestamp)?;
        reserves.insert(asset, reserve);
    }

    let mut positions = Vec::new();
    for entry in file.positions {
        if !reserves.contains_key(&entry.asset) {
            bail!("position references unlisted asset {}", entry.asset);
        }
        positions.push(UserPosition {
            user: file.user,
            asset: entry.asset,
            supply_principal: parse_u256(&entry.supply_principal, "supply_principal")?,
            supply_snapshot_index: parse_u256(&entry.supply_snapshot_index, "supply_snapshot_index")?,
            borrow_principal: parse_u256(&entry.borrow_principal, "borrow_principal")?,
            borrow_snapshot_index: parse_u256(&entry.borrow_snapshot_index, "borrow_snapshot_index")?,
            use_as_collateral: entry.use_as_collateral,
        });
    }

    let mut prices = HashMap::new();
    for (asset, price) in file.prices {
        prices.insert(asset, parse_u256(&price, "price")?);
    }

    Ok(Snapshot {
        timestamp: file.timestamp,
        user: file.user,
        symbols,
        reserves,
        positions,
        prices,
    })
}

impl Snapshot {
    /// Resolves a user-supplied asset reference: a token address, or a
    /// listed symbol (case-insensitive).
    pub fn resolve_asset(&self, needle: &str) -> Result<Address> {
        if let Ok(address) = needle.parse::<Address>() {
            if self.reserves.contains_key(&address) {
                return Ok(address);
            }
            bail!("no reserve listed for asset {address}");
        }

        for (asset, symbol) in &self.symbols {
            if symbol.eq_ignore_ascii_case(needle) {
                return Ok(*asset);
            }
        }
        bail!("unknown asset: {needle}");
    }

    pub fn reserve(&self, asset: Address) -> Result<&Reserve> {
        self.reserves
            .get(&asset)
            .with_context(|| format!("no reserve listed for asset {asset}"))
    }

    pub fn price(&self, asset: Address) -> Result<U256> {
        self.prices
            .get(&asset)
            .copied()
            .with_context(|| format!("no oracle price for asset {asset}"))
    }

    pub fn symbol(&self, asset: Address) -> String {
        self.symbols
            .get(&asset)
            .cloned()
            .unwrap_or_else(|| asset.to_string())
    }

    /// The user's position in one reserve; empty if they never touched it.
    pub fn position(&self, asset: Address) -> UserPosition {
        self.positions
            .iter()
            .find(|p| p.asset == asset)
            .cloned()
            .unwrap_or_else(|| UserPosition::empty(self.user, asset))
    }
}

/// Parses a human-readable decimal amount (e.g. "100.5") into WAD.
pub fn parse_amount_wad(input: &str) -> Result<U256> {
    let (integer, fraction) = match input.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (input, ""),
    };

    if integer.is_empty() && fraction.is_empty() {
        bail!("empty amount");
    }
    if fraction.len() > 18 {
        bail!("amount has more than 18 fractional digits: {input}");
    }
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !digits_only(integer) || !digits_only(fraction) {
        bail!("invalid amount: {input}");
    }

    let whole = if integer.is_empty() {
        U256::ZERO
    } else {
        parse_u256(integer, "amount")?
    };
    let frac = if fraction.is_empty() {
        U256::ZERO
    } else {
        parse_u256(&format!("{fraction:0<18}"), "amount")?
    };

    whole
        .checked_mul(WAD)
        .and_then(|scaled| scaled.checked_add(frac))
        .context("amount out of range")
}
