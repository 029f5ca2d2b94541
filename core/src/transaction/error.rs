//! The build failure taxonomy.

use ethereum_types::{H256, U256};
use thiserror::Error;

use crate::identity::KeyError;
use crate::primitives::ParseError;
use crate::rpc::ChainError;

/// Why a send, cancel or speed-up did not go out.
///
/// Everything here reaches the caller. Nothing that could lose funds or
/// strand a nonce is ever defaulted away.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    /// Malformed address, amount, hash or call data. Raised before any I/O.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A read the build depends on (nonce, price, balance, lookup) failed.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// A call or the whole build ran out of time.
    #[error("{operation} timed out after {after_ms} ms")]
    Timeout { operation: String, after_ms: u64 },

    /// Balance cannot cover `value + gas_limit * gas_price`.
    #[error("insufficient funds: required {required} wei, available {available} wei")]
    InsufficientFunds { required: U256, available: U256 },

    /// Replacement requested for a transaction that is already in a block.
    #[error("transaction {hash:?} already mined in block {block}")]
    AlreadyMined { hash: H256, block: u64 },

    /// Replacement target unknown to the node.
    #[error("transaction {0:?} not found")]
    NotFound(H256),

    /// The node refused the payload. Message is the node's, verbatim.
    #[error("{0}")]
    BroadcastRejected(String),

    /// The node returned neither a hash nor an error.
    #[error("{0}")]
    UnknownFailure(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("wallet is locked")]
    Locked,
}

impl From<ChainError> for TxError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Timeout { method, after_ms } => Self::Timeout {
                operation: method,
                after_ms,
            },
            other => Self::NetworkUnavailable(other.to_string()),
        }
    }
}

impl From<KeyError> for TxError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::Locked | KeyError::NoWalletStored => Self::Locked,
            other => Self::Signing(other.to_string()),
        }
    }
}

impl From<ParseError> for TxError {
    fn from(err: ParseError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
