//! Value types shared by the builder, the signer and the service.

use std::fmt;

use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

use super::error::TxError;
use crate::fees::FeeQuote;
use crate::rpc::client::quantity_to_u64;
use crate::rpc::RpcTransaction;

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

/// The four things a user can ask the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Native asset to any address.
    NativeTransfer,
    /// ERC-20 `transfer`.
    TokenTransfer,
    /// Zero-value self-transfer replacing a pending transaction.
    Cancel,
    /// Same payload as a pending transaction, higher price.
    SpeedUp,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativeTransfer => write!(f, "NativeTransfer"),
            Self::TokenTransfer => write!(f, "TokenTransfer"),
            Self::Cancel => write!(f, "Cancel"),
            Self::SpeedUp => write!(f, "SpeedUp"),
        }
    }
}

// ---------------------------------------------------------------------------
// BuildStage
// ---------------------------------------------------------------------------

/// Where a build is. Every operation walks the same sequence; a failure
/// at any stage ends the build with no later stage reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildStage {
    Start,
    NonceFetched,
    FeeComputed,
    PreflightChecked,
    Signed,
    Broadcast,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::NonceFetched => write!(f, "NonceFetched"),
            Self::FeeComputed => write!(f, "FeeComputed"),
            Self::PreflightChecked => write!(f, "PreflightChecked"),
            Self::Signed => write!(f, "Signed"),
            Self::Broadcast => write!(f, "Broadcast"),
        }
    }
}

// ---------------------------------------------------------------------------
// PendingTransaction
// ---------------------------------------------------------------------------

/// A previously broadcast transaction, as the node reports it. Input to
/// cancel and speed-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: H256,
    pub from: Address,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub value: U256,
    pub data: Vec<u8>,
    /// `None` while unconfirmed.
    pub block_number: Option<u64>,
}

impl PendingTransaction {
    pub fn is_pending(&self) -> bool {
        self.block_number.is_none()
    }
}

impl TryFrom<RpcTransaction> for PendingTransaction {
    type Error = TxError;

    fn try_from(tx: RpcTransaction) -> Result<Self, Self::Error> {
        let data = tx
            .input_bytes()
            .map_err(|e| TxError::InvalidInput(format!("original call data: {e}")))?;
        let gas_price = tx.gas_price.ok_or_else(|| {
            TxError::InvalidInput("original transaction reports no gas price".into())
        })?;
        let block_number = tx
            .block_number
            .map(|b| quantity_to_u64(b, "block number"))
            .transpose()?;

        Ok(Self {
            hash: tx.hash,
            from: tx.from,
            to: tx.to,
            nonce: quantity_to_u64(tx.nonce, "nonce")?,
            gas_price,
            gas_limit: quantity_to_u64(tx.gas, "gas")?,
            value: tx.value,
            data,
            block_number,
        })
    }
}

// ---------------------------------------------------------------------------
// SubmittedTransaction
// ---------------------------------------------------------------------------

/// What a successful broadcast hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    /// Hash reported by the node.
    pub hash: H256,
    pub from: Address,
    pub nonce: u64,
    pub fee: FeeQuote,
    pub kind: OperationKind,
    /// Transaction-level recipient (the token contract for token sends).
    pub to: Address,
    /// Native value carried.
    pub value: U256,
    /// Calldata, empty for plain transfers.
    pub data: Vec<u8>,
}
