//! # Fee Policy Engine
//!
//! Turns "the node says gas costs X and this call uses about Y" into a gas
//! price and gas limit we are willing to sign. Underpay and the transaction
//! sits in the mempool forever; overpay and the user notices. The numbers
//! here were tuned against real stuck transactions, so change them with care.
//!
//! ## Rules at a glance
//!
//! | Fee model        | Gas price     | Limit buffer (EOA / contract or token) |
//! |------------------|---------------|----------------------------------------|
//! | Standard         | raw           | x1.10 / x1.30                          |
//! | PolygonPriority  | raw x1.25     | x1.10 / x1.30                          |
//! | ArbitrumL1       | raw           | x2.0 / x2.0                            |
//!
//! Failed estimates fall back to 21000 (plain) or 100000 (contract/token)
//! before buffering. Limits round up. Replacements pay at least 15% more
//! than the transaction they replace.

pub mod policy;
pub mod types;

pub use policy::{
    cancel_gas_limit, fallback_estimate, gas_limit, gas_price, limit_buffer, quote,
    replacement_gas_price, speed_up_gas_limit,
};
pub use types::{FeeQuote, Multiplier, TxKind};
