//! # Ethereum JSON-RPC Types
//!
//! Wire types for the handful of `eth_*` methods the wallet speaks. Quantities
//! and addresses travel as `0x`-prefixed hex; `ethereum-types` already knows
//! how to (de)serialize that, so these structs are mostly field renames.
//!
//! ## Method Index
//!
//! | Method                       | Used for                                  |
//! |------------------------------|-------------------------------------------|
//! | `eth_chainId`                | sanity check before signing               |
//! | `eth_getBalance`             | native balance, send preflight            |
//! | `eth_getCode`                | contract detection                        |
//! | `eth_getTransactionCount`    | nonce                                     |
//! | `eth_gasPrice`               | fee policy input                          |
//! | `eth_estimateGas`            | gas limit input                           |
//! | `eth_call`                   | token `balanceOf`                         |
//! | `eth_getTransactionByHash`   | replacement target lookup                 |
//! | `eth_getTransactionReceipt`  | confirmation tracking                     |
//! | `eth_sendRawTransaction`     | broadcast                                 |

use std::fmt;

use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

use crate::primitives::{decode_hex, encode_hex, ParseError};

// ---------------------------------------------------------------------------
// RPC Method Enumeration
// ---------------------------------------------------------------------------

/// Supported JSON-RPC methods. The wire name is the serde rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RpcMethod {
    /// Parameters: none.
    #[serde(rename = "eth_chainId")]
    ChainId,
    /// Parameters: `[address, block_tag]`
    #[serde(rename = "eth_getBalance")]
    GetBalance,
    /// Parameters: `[address, block_tag]`
    #[serde(rename = "eth_getCode")]
    GetCode,
    /// Parameters: `[address, block_tag]`
    #[serde(rename = "eth_getTransactionCount")]
    GetTransactionCount,
    /// Parameters: none.
    #[serde(rename = "eth_gasPrice")]
    GasPrice,
    /// Parameters: `[call_request]`
    #[serde(rename = "eth_estimateGas")]
    EstimateGas,
    /// Parameters: `[call_request, block_tag]`
    #[serde(rename = "eth_call")]
    Call,
    /// Parameters: `[tx_hash]`
    #[serde(rename = "eth_getTransactionByHash")]
    GetTransactionByHash,
    /// Parameters: `[tx_hash]`
    #[serde(rename = "eth_getTransactionReceipt")]
    GetTransactionReceipt,
    /// Parameters: `[raw_tx_hex]`
    #[serde(rename = "eth_sendRawTransaction")]
    SendRawTransaction,
}

impl RpcMethod {
    /// The method name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChainId => "eth_chainId",
            Self::GetBalance => "eth_getBalance",
            Self::GetCode => "eth_getCode",
            Self::GetTransactionCount => "eth_getTransactionCount",
            Self::GasPrice => "eth_gasPrice",
            Self::EstimateGas => "eth_estimateGas",
            Self::Call => "eth_call",
            Self::GetTransactionByHash => "eth_getTransactionByHash",
            Self::GetTransactionReceipt => "eth_getTransactionReceipt",
            Self::SendRawTransaction => "eth_sendRawTransaction",
        }
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Block tag used for every state read. Pending-pool state is deliberately
/// not consulted.
pub const LATEST: &str = "latest";

// ---------------------------------------------------------------------------
// RPC Request / Response
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Echoed back by the node.
    pub id: serde_json::Value,
    pub method: RpcMethod,
    /// Positional parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RpcRequest {
    pub fn new(id: serde_json::Value, method: RpcMethod, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method,
            params,
        }
    }
}

/// A JSON-RPC 2.0 response.
///
/// A JSON `null` result and a missing result both land in `result: None`.
/// For most methods that means "not found"; for `eth_sendRawTransaction`
/// it means the node accepted nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error object as returned by the node.
///
/// Standard codes (`-32700` parse error through `-32603` internal error)
/// plus the `-32000` server-error range, which Ethereum clients use for
/// things like "nonce too low" and "replacement transaction underpriced".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Generic server error, the code geth uses for most send failures.
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(-32000, message)
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(-32601, format!("method not found: {}", method.into()))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(-32602, message)
    }
}

// ---------------------------------------------------------------------------
// Typed Payloads
// ---------------------------------------------------------------------------

/// Transaction skeleton for `eth_call` and `eth_estimateGas`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// `0x`-prefixed call data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl CallRequest {
    /// A read-only call: `to` plus call data.
    pub fn call(to: Address, data: &[u8]) -> Self {
        Self {
            to: Some(to),
            data: Some(encode_hex(data)),
            ..Default::default()
        }
    }

    /// Full skeleton for gas estimation.
    pub fn transaction(from: Address, to: Address, value: U256, data: &[u8]) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            value: Some(value),
            data: if data.is_empty() {
                None
            } else {
                Some(encode_hex(data))
            },
        }
    }
}

/// A transaction as reported by `eth_getTransactionByHash`.
///
/// Only the fields the replacement flow needs. `block_number` is `None`
/// while the transaction is still pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: H256,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    pub nonce: U256,
    /// Absent on some nodes for typed transactions that have not been mined.
    #[serde(default)]
    pub gas_price: Option<U256>,
    pub gas: U256,
    pub value: U256,
    /// `0x`-prefixed call data.
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub block_number: Option<U256>,
}

impl RpcTransaction {
    /// Decoded call data.
    pub fn input_bytes(&self) -> Result<Vec<u8>, ParseError> {
        decode_hex(&self.input)
    }
}

/// A receipt from `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    #[serde(rename = "transactionHash")]
    pub hash: H256,
    #[serde(default)]
    pub block_number: Option<U256>,
    /// `1` success, `0` reverted. Pre-Byzantium receipts carry none.
    #[serde(default)]
    pub status: Option<U256>,
    #[serde(default)]
    pub gas_used: Option<U256>,
}

impl TransactionReceipt {
    /// `Some(true)` if executed successfully, `Some(false)` if reverted,
    /// `None` if the receipt does not say.
    pub fn succeeded(&self) -> Option<bool> {
        self.status.map(|s| !s.is_zero())
    }
}
