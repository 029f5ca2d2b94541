//! Typed chain operations with the wallet's soft-failure contract.
//!
//! | Operation                 | On failure                               |
//! |---------------------------|------------------------------------------|
//! | `get_balance`             | `0` (logged)                             |
//! | `get_code`                | `""`, treated as an EOA (logged)         |
//! | `get_nonce`               | error                                    |
//! | `get_gas_price`           | error                                    |
//! | `estimate_gas`            | `None`; the fee engine uses a fallback   |
//! | `call_uint256`            | `0` (logged)                             |
//! | `get_transaction`         | error; `Ok(None)` if the node has none   |
//! | `get_receipt`             | `None` (logged)                          |
//! | `send_raw_transaction`    | error, node message verbatim             |
//!
//! Reads are bounded by the read timeout, the broadcast by the broadcast
//! timeout.

use std::time::Duration;

use ethereum_types::{Address, H256, U256};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::warn;

use super::error::ChainError;
use super::transport::RpcTransport;
use super::types::{CallRequest, RpcMethod, RpcTransaction, TransactionReceipt, LATEST};
use crate::config::EngineConfig;
use crate::primitives::encode_hex;
use crate::token::{decode_uint256, encode_balance_of};

/// Narrows a quantity to `u64`, refusing anything that would truncate.
pub(crate) fn quantity_to_u64(value: U256, what: &str) -> Result<u64, ChainError> {
    if value > U256::from(u64::MAX) {
        return Err(ChainError::Decode(format!("{what} does not fit in 64 bits: {value}")));
    }
    Ok(value.low_u64())
}

/// JSON-RPC accessor for one endpoint.
#[derive(Debug)]
pub struct ChainClient<T> {
    transport: T,
    read_timeout: Duration,
    broadcast_timeout: Duration,
}

impl<T: RpcTransport> ChainClient<T> {
    pub fn new(transport: T, config: &EngineConfig) -> Self {
        Self {
            transport,
            read_timeout: config.read_timeout,
            broadcast_timeout: config.broadcast_timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn read_value(&self, method: RpcMethod, params: Value) -> Result<Value, ChainError> {
        self.transport
            .request(method, params, self.read_timeout)
            .await
    }

    /// A read whose result must be present.
    async fn read<R: DeserializeOwned>(
        &self,
        method: RpcMethod,
        params: Value,
    ) -> Result<R, ChainError> {
        let value = self.read_value(method, params).await?;
        if value.is_null() {
            return Err(ChainError::MissingResult(method.to_string()));
        }
        serde_json::from_value(value).map_err(|e| ChainError::Decode(format!("{method}: {e}")))
    }

    /// A read where `null` means "not there".
    async fn read_optional<R: DeserializeOwned>(
        &self,
        method: RpcMethod,
        params: Value,
    ) -> Result<Option<R>, ChainError> {
        let value = self.read_value(method, params).await?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ChainError::Decode(format!("{method}: {e}")))
    }

    fn soft_fail(&self, method: RpcMethod, err: &ChainError) {
        warn!(endpoint = %self.endpoint(), %method, error = %err, "rpc read failed, using default");
    }

    // ----- Strict reads -----

    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        let id: U256 = self.read(RpcMethod::ChainId, json!([])).await?;
        quantity_to_u64(id, "chain id")
    }

    /// Native balance, propagating failures. The send preflight uses this.
    pub async fn try_get_balance(&self, address: Address) -> Result<U256, ChainError> {
        self.read(RpcMethod::GetBalance, json!([address, LATEST]))
            .await
    }

    /// Transaction count at the `latest` block.
    pub async fn get_nonce(&self, address: Address) -> Result<u64, ChainError> {
        let nonce: U256 = self
            .read(RpcMethod::GetTransactionCount, json!([address, LATEST]))
            .await?;
        quantity_to_u64(nonce, "nonce")
    }

    pub async fn get_gas_price(&self) -> Result<U256, ChainError> {
        self.read(RpcMethod::GasPrice, json!([])).await
    }

    /// `Ok(None)` if the node does not know the hash.
    pub async fn get_transaction(&self, hash: H256) -> Result<Option<RpcTransaction>, ChainError> {
        self.read_optional(RpcMethod::GetTransactionByHash, json!([hash]))
            .await
    }

    /// Raw `eth_call` result as hex.
    pub async fn call(&self, request: &CallRequest) -> Result<String, ChainError> {
        self.read(RpcMethod::Call, json!([request, LATEST])).await
    }

    // ----- Soft reads -----

    /// Native balance, `0` on any failure.
    pub async fn get_balance(&self, address: Address) -> U256 {
        match self.try_get_balance(address).await {
            Ok(balance) => balance,
            Err(e) => {
                self.soft_fail(RpcMethod::GetBalance, &e);
                U256::zero()
            }
        }
    }

    /// Deployed bytecode at `address`, `""` on failure.
    pub async fn get_code(&self, address: Address) -> String {
        match self
            .read::<String>(RpcMethod::GetCode, json!([address, LATEST]))
            .await
        {
            Ok(code) => code,
            Err(e) => {
                self.soft_fail(RpcMethod::GetCode, &e);
                String::new()
            }
        }
    }

    /// `true` if `address` has code. Lookup failures count as "no code".
    pub async fn is_contract(&self, address: Address) -> bool {
        let code = self.get_code(address).await;
        let body = code.strip_prefix("0x").unwrap_or(&code);
        !body.is_empty() && body.chars().any(|c| c != '0')
    }

    /// Gas estimate, `None` on failure (including reverts during estimation).
    pub async fn estimate_gas(&self, request: &CallRequest) -> Option<u64> {
        let result: Result<U256, ChainError> =
            self.read(RpcMethod::EstimateGas, json!([request])).await;
        match result.and_then(|gas| quantity_to_u64(gas, "gas estimate")) {
            Ok(gas) => Some(gas),
            Err(e) => {
                self.soft_fail(RpcMethod::EstimateGas, &e);
                None
            }
        }
    }

    /// `eth_call` decoded as a single `uint256`, `0` on failure.
    pub async fn call_uint256(&self, to: Address, data: &[u8]) -> U256 {
        let raw = match self.call(&CallRequest::call(to, data)).await {
            Ok(raw) => raw,
            Err(e) => {
                self.soft_fail(RpcMethod::Call, &e);
                return U256::zero();
            }
        };
        decode_uint256(&raw).unwrap_or_else(|e| {
            warn!(endpoint = %self.endpoint(), error = %e, "undecodable call result, using 0");
            U256::zero()
        })
    }

    /// ERC-20 `balanceOf(owner)` on `token`, `0` on failure.
    pub async fn token_balance(&self, token: Address, owner: Address) -> U256 {
        self.call_uint256(token, &encode_balance_of(&owner)).await
    }

    /// Receipt if mined, `None` if pending, unknown, or on failure.
    pub async fn get_receipt(&self, hash: H256) -> Option<TransactionReceipt> {
        match self
            .read_optional(RpcMethod::GetTransactionReceipt, json!([hash]))
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                self.soft_fail(RpcMethod::GetTransactionReceipt, &e);
                None
            }
        }
    }

    // ----- Broadcast -----

    /// Submits a signed payload and returns the node's transaction hash.
    ///
    /// A node error comes back as [`ChainError::Rpc`] with the message
    /// untouched. A response without a hash is [`ChainError::MissingResult`].
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<H256, ChainError> {
        let method = RpcMethod::SendRawTransaction;
        let value = self
            .transport
            .request(method, json!([encode_hex(raw)]), self.broadcast_timeout)
            .await?;
        if value.is_null() {
            return Err(ChainError::MissingResult(method.to_string()));
        }
        serde_json::from_value(value).map_err(|e| ChainError::Decode(format!("{method}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::ScriptedTransport;
    use std::sync::Arc;

    fn client() -> (Arc<ScriptedTransport>, ChainClient<Arc<ScriptedTransport>>) {
        let node = Arc::new(ScriptedTransport::default());
        let client = ChainClient::new(node.clone(), &EngineConfig::default());
        (node, client)
    }

    fn owner() -> Address {
        Address::repeat_byte(0x11)
    }

    #[tokio::test]
    async fn balance_soft_fails_to_zero() {
        let (node, client) = client();
        node.fail(RpcMethod::GetBalance, ChainError::Transport("refused".into()));
        assert_eq!(client.get_balance(owner()).await, U256::zero());
        assert!(client.try_get_balance(owner()).await.is_err());
    }

    #[tokio::test]
    async fn balance_parses_hex_quantity() {
        let (node, client) = client();
        node.reply(RpcMethod::GetBalance, json!("0xde0b6b3a7640000"));
        assert_eq!(
            client.get_balance(owner()).await,
            U256::from(1_000_000_000_000_000_000u64)
        );
        let params = &node.calls()[0].params;
        assert_eq!(params[1], json!("latest"));
    }

    #[tokio::test(start_paused = true)]
    async fn balance_times_out_to_zero() {
        let (node, client) = client();
        node.hang(RpcMethod::GetBalance);
        assert_eq!(client.get_balance(owner()).await, U256::zero());
    }

    #[tokio::test]
    async fn nonce_and_gas_price_propagate() {
        let (node, client) = client();
        node.fail(RpcMethod::GetTransactionCount, ChainError::Transport("down".into()));
        node.fail(RpcMethod::GasPrice, ChainError::Transport("down".into()));
        assert!(client.get_nonce(owner()).await.is_err());
        assert!(client.get_gas_price().await.is_err());
    }

    #[tokio::test]
    async fn contract_detection() {
        let (node, client) = client();
        node.reply(RpcMethod::GetCode, json!("0x6080604052"));
        assert!(client.is_contract(owner()).await);

        let (node, client) = self::client();
        node.reply(RpcMethod::GetCode, json!("0x"));
        assert!(!client.is_contract(owner()).await);

        let (node, client) = self::client();
        node.fail(RpcMethod::GetCode, ChainError::Transport("x".into()));
        assert!(!client.is_contract(owner()).await);
    }

    #[tokio::test]
    async fn estimate_failure_is_none() {
        let (node, client) = client();
        node.fail(
            RpcMethod::EstimateGas,
            ChainError::Rpc {
                code: 3,
                message: "execution reverted".into(),
            },
        );
        let req = CallRequest::transaction(owner(), owner(), U256::zero(), &[]);
        assert_eq!(client.estimate_gas(&req).await, None);

        node.reply(RpcMethod::EstimateGas, json!("0x5208"));
        assert_eq!(client.estimate_gas(&req).await, Some(21_000));
    }

    #[tokio::test]
    async fn token_balance_decodes_and_soft_fails() {
        let (node, client) = client();
        node.reply(RpcMethod::Call, json!(format!("0x{:0>64}", "3e8")));
        assert_eq!(client.token_balance(owner(), owner()).await, U256::from(1000));

        let data = node.calls()[0].params[0]["data"].as_str().unwrap().to_string();
        assert!(data.starts_with("0x70a08231"));

        let (node, client) = self::client();
        node.fail(RpcMethod::Call, ChainError::Transport("x".into()));
        assert_eq!(client.token_balance(owner(), owner()).await, U256::zero());
    }

    #[tokio::test]
    async fn token_balance_with_non_ascii_result_is_zero() {
        let (node, client) = client();
        node.reply(RpcMethod::Call, json!(format!("0x{}", "€".repeat(30))));
        assert_eq!(client.token_balance(owner(), owner()).await, U256::zero());
    }

    #[tokio::test]
    async fn unknown_transaction_is_none() {
        let (node, client) = client();
        node.reply(RpcMethod::GetTransactionByHash, Value::Null);
        assert_eq!(client.get_transaction(H256::zero()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn receipt_errors_are_none() {
        let (node, client) = client();
        node.fail(RpcMethod::GetTransactionReceipt, ChainError::Transport("x".into()));
        assert!(client.get_receipt(H256::zero()).await.is_none());
    }

    #[tokio::test]
    async fn send_surfaces_node_message_and_missing_hash() {
        let (node, client) = client();
        node.fail(
            RpcMethod::SendRawTransaction,
            ChainError::Rpc {
                code: -32000,
                message: "nonce too low".into(),
            },
        );
        let err = client.send_raw_transaction(&[0xc0]).await.unwrap_err();
        assert_eq!(
            err,
            ChainError::Rpc {
                code: -32000,
                message: "nonce too low".into()
            }
        );

        let (node, client) = self::client();
        node.reply(RpcMethod::SendRawTransaction, Value::Null);
        assert!(matches!(
            client.send_raw_transaction(&[0xc0]).await,
            Err(ChainError::MissingResult(_))
        ));
        assert_eq!(node.broadcasts(), vec!["0xc0".to_string()]);
    }

    #[test]
    fn quantity_narrowing() {
        assert_eq!(quantity_to_u64(U256::from(5), "n").unwrap(), 5);
        assert!(quantity_to_u64(U256::MAX, "n").is_err());
    }
}
