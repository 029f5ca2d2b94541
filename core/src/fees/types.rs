//! Vocabulary of the fee engine: exact multipliers, transaction kinds and
//! the quote the engine hands back.

use ethereum_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Multiplier
// ---------------------------------------------------------------------------

/// An exact rational multiplier `num / den`.
///
/// All fee math is integer math. The two application modes are the only
/// rounding rules the engine uses: ceiling for gas limits (running out of
/// gas costs more than a few spare units), nearest for prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Multiplier {
    num: u64,
    den: u64,
}

impl Multiplier {
    /// Builds `num / den`. `den` must be non-zero.
    pub const fn new(num: u64, den: u64) -> Self {
        assert!(den != 0, "multiplier denominator must be non-zero");
        Self { num, den }
    }

    pub const fn numerator(&self) -> u64 {
        self.num
    }

    pub const fn denominator(&self) -> u64 {
        self.den
    }

    /// `ceil(value * num / den)`, saturating at `U256::MAX`.
    pub fn apply_ceil(&self, value: U256) -> U256 {
        let scaled = value.saturating_mul(U256::from(self.num));
        let den = U256::from(self.den);
        let (q, r) = scaled.div_mod(den);
        if r.is_zero() {
            q
        } else {
            q.saturating_add(U256::one())
        }
    }

    /// `round(value * num / den)` with halves rounded up, saturating.
    pub fn apply_round(&self, value: U256) -> U256 {
        let scaled = value.saturating_mul(U256::from(self.num));
        scaled.saturating_add(U256::from(self.den / 2)) / U256::from(self.den)
    }

    /// [`apply_ceil`](Self::apply_ceil) for gas quantities. Saturates at
    /// `u64::MAX`.
    pub fn apply_ceil_u64(&self, value: u64) -> u64 {
        let scaled = value as u128 * self.num as u128;
        let den = self.den as u128;
        let result = scaled.div_ceil(den);
        u64::try_from(result).unwrap_or(u64::MAX)
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.num / self.den;
        let rem = self.num % self.den;
        if rem == 0 {
            write!(f, "x{whole}")
        } else {
            // Two decimals is all any configured ratio needs.
            let hundredths = (rem * 100).div_ceil(self.den);
            write!(f, "x{whole}.{hundredths:02}")
        }
    }
}

// ---------------------------------------------------------------------------
// TxKind
// ---------------------------------------------------------------------------

/// What a transaction does, as far as gas buffering is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxKind {
    /// Native value to an externally-owned account (no code at `to`).
    NativeEoa,
    /// Native value, or arbitrary call data, to an address with code.
    NativeContract,
    /// ERC-20 `transfer` call.
    TokenTransfer,
}

impl TxKind {
    /// Returns `true` for anything that executes contract code.
    pub fn is_contract_call(&self) -> bool {
        !matches!(self, Self::NativeEoa)
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativeEoa => write!(f, "NativeEoa"),
            Self::NativeContract => write!(f, "NativeContract"),
            Self::TokenTransfer => write!(f, "TokenTransfer"),
        }
    }
}

// ---------------------------------------------------------------------------
// FeeQuote
// ---------------------------------------------------------------------------

/// Gas price and gas limit the engine decided to offer. Both are always
/// positive once produced by the policy functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub gas_price: U256,
    pub gas_limit: u64,
}

impl FeeQuote {
    pub fn new(gas_price: U256, gas_limit: u64) -> Self {
        Self {
            gas_price,
            gas_limit,
        }
    }

    /// `gas_limit * gas_price`, or `None` on overflow.
    pub fn max_fee(&self) -> Option<U256> {
        self.gas_price.checked_mul(U256::from(self.gas_limit))
    }

    /// `max_fee + value`, or `None` on overflow.
    pub fn total_cost(&self, value: U256) -> Option<U256> {
        self.max_fee()?.checked_add(value)
    }
}
