//! # Chain Client
//!
//! Everything the wallet needs to know about the outside world, it learns
//! over Ethereum JSON-RPC. Public endpoints are flaky, slow, and
//! occasionally lie, so every call here is time-bounded and the read path
//! degrades to safe defaults instead of failing the caller.
//!
//! The stack, bottom-up:
//!
//! - **types**: wire types and the `eth_*` method table.
//! - **transport**: the `RpcTransport` seam plus the reqwest implementation.
//! - **scripted**: an in-process node for tests and offline dry runs.
//! - **client**: typed operations and the soft-failure contract.
//! - **pool**: one shared client per endpoint URL.

pub mod client;
pub mod error;
pub mod pool;
pub mod scripted;
pub mod transport;
pub mod types;

pub use client::ChainClient;
pub use error::ChainError;
pub use pool::ClientPool;
pub use scripted::{RecordedCall, ScriptedTransport};
pub use transport::{HttpTransport, RpcTransport};
pub use types::{
    CallRequest, RpcError, RpcMethod, RpcRequest, RpcResponse, RpcTransaction, TransactionReceipt,
};
