//! The fee policy table.
//!
//! Pure functions from (fee model, kind, raw node data) to the numbers we
//! actually sign. No I/O, no clocks. The transaction service feeds these
//! with whatever the chain client returned.

use ethereum_types::U256;

use super::types::{FeeQuote, Multiplier, TxKind};
use crate::config::{
    ARBITRUM_L1_BUFFER, CONTRACT_BUFFER, CONTRACT_FALLBACK_GAS, PLAIN_TRANSFER_BUFFER,
    PLAIN_TRANSFER_GAS, POLYGON_PRIORITY_MULTIPLIER, REPLACEMENT_PRICE_BUMP,
    SPEED_UP_LIMIT_FALLBACK,
};
use crate::network::FeeModel;

// ---------------------------------------------------------------------------
// Gas price
// ---------------------------------------------------------------------------

/// Gas price to offer given the node's raw `eth_gasPrice`.
///
/// Standard and Arbitrum networks pay the quote as-is. Polygon gets a 25%
/// priority surcharge, rounded to the nearest wei.
pub fn gas_price(model: FeeModel, raw: U256) -> U256 {
    match model {
        FeeModel::PolygonPriority => POLYGON_PRIORITY_MULTIPLIER.apply_round(raw),
        FeeModel::Standard | FeeModel::ArbitrumL1 => raw,
    }
}

/// Gas price for a same-nonce replacement.
///
/// `max(policy(current), max(ceil(original * 1.15), original + 1))`. The
/// `+1` only matters for tiny originals where the 15% bump rounds to
/// nothing, but a replacement that is not strictly pricier is rejected.
pub fn replacement_gas_price(model: FeeModel, current_raw: U256, original: U256) -> U256 {
    let bumped = REPLACEMENT_PRICE_BUMP
        .apply_ceil(original)
        .max(original.saturating_add(U256::one()));
    gas_price(model, current_raw).max(bumped)
}

// ---------------------------------------------------------------------------
// Gas limit
// ---------------------------------------------------------------------------

/// Base estimate used when `eth_estimateGas` failed.
pub fn fallback_estimate(kind: TxKind) -> u64 {
    if kind.is_contract_call() {
        CONTRACT_FALLBACK_GAS
    } else {
        PLAIN_TRANSFER_GAS
    }
}

/// Buffer applied over the base estimate.
pub fn limit_buffer(model: FeeModel, kind: TxKind) -> Multiplier {
    match model {
        FeeModel::ArbitrumL1 => ARBITRUM_L1_BUFFER,
        FeeModel::Standard | FeeModel::PolygonPriority => {
            if kind.is_contract_call() {
                CONTRACT_BUFFER
            } else {
                PLAIN_TRANSFER_BUFFER
            }
        }
    }
}

/// Gas limit to sign: buffered estimate (or fallback), rounded up, never
/// below the intrinsic 21000.
pub fn gas_limit(model: FeeModel, kind: TxKind, estimate: Option<u64>) -> u64 {
    let base = estimate.unwrap_or_else(|| fallback_estimate(kind));
    limit_buffer(model, kind)
        .apply_ceil_u64(base)
        .max(PLAIN_TRANSFER_GAS)
}

/// A cancellation is a zero-value self-transfer with no data. Always 21000.
pub fn cancel_gas_limit() -> u64 {
    PLAIN_TRANSFER_GAS
}

/// Gas limit for a speed-up of a transaction whose original limit was
/// `original_limit`.
///
/// - No call data: the original limit is reused as-is (floored at 21000).
/// - Call data and a fresh estimate: normal buffer table over the estimate.
/// - Call data but estimation failed: original limit x1.2.
pub fn speed_up_gas_limit(
    model: FeeModel,
    kind: TxKind,
    original_limit: u64,
    has_data: bool,
    re_estimate: Option<u64>,
) -> u64 {
    if !has_data {
        return original_limit.max(PLAIN_TRANSFER_GAS);
    }
    match re_estimate {
        Some(estimate) => gas_limit(model, kind, Some(estimate)),
        None => SPEED_UP_LIMIT_FALLBACK
            .apply_ceil_u64(original_limit)
            .max(PLAIN_TRANSFER_GAS),
    }
}

/// Price and limit for a fresh send in one go.
pub fn quote(model: FeeModel, kind: TxKind, raw_gas_price: U256, estimate: Option<u64>) -> FeeQuote {
    FeeQuote::new(gas_price(model, raw_gas_price), gas_limit(model, kind, estimate))
}
