//! # Wallet Facade
//!
//! One object that owns the pieces a front end needs: the network table,
//! the key lifecycle, the client pool, the history store and the token
//! watchlist. Each call
//! resolves the active network and identity at call time, so switching
//! networks or locking the wallet takes effect on the next operation.

use std::sync::Arc;

use chrono::Utc;
use ethereum_types::{Address, H256, U256};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::history::{reconcile_pending, HistoryStore, ReconcileSummary, RecordStatus, TransactionRecord};
use crate::identity::{KeyError, KeyProvider, SecureStore};
use crate::network::{Network, NetworkRegistry};
use crate::primitives::ParseError;
use crate::rpc::{ChainClient, ChainError, ClientPool, HttpTransport, RpcTransport};
use crate::token::{decode_transfer, is_transfer_call};
use crate::transaction::{SubmittedTransaction, TransactionService, TxError};
use crate::watchlist::TokenWatchlist;

/// History label for a token the watchlist does not know.
const UNKNOWN_TOKEN_SYMBOL: &str = "TOKEN";

/// Errors surfaced by the facade.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Transaction(#[from] TxError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The wallet engine, wired together.
pub struct Wallet<S, H, T = HttpTransport> {
    registry: NetworkRegistry,
    keys: KeyProvider<S>,
    pool: ClientPool<T>,
    history: H,
    tokens: TokenWatchlist,
}

impl<S: SecureStore, H: HistoryStore> Wallet<S, H, HttpTransport> {
    /// Wallet talking to real endpoints over HTTP.
    pub fn new(store: S, history: H, config: EngineConfig) -> Self {
        Self::with_pool(store, history, ClientPool::http(config))
    }
}

impl<S: SecureStore, H: HistoryStore, T: RpcTransport> Wallet<S, H, T> {
    /// Wallet over a custom client pool. The pool's config supplies the
    /// startup network.
    pub fn with_pool(store: S, history: H, pool: ClientPool<T>) -> Self {
        let registry = NetworkRegistry::new();
        registry.set_active(&pool.config().default_network);
        Self {
            registry,
            keys: KeyProvider::new(store),
            pool,
            history,
            tokens: TokenWatchlist::new(),
        }
    }

    pub fn networks(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn keys(&self) -> &KeyProvider<S> {
        &self.keys
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn tokens(&self) -> &TokenWatchlist {
        &self.tokens
    }

    pub fn config(&self) -> &EngineConfig {
        self.pool.config()
    }

    /// Shared client for the active network.
    pub fn client(&self) -> Result<Arc<ChainClient<T>>, ChainError> {
        self.pool.client(&self.registry.active().rpc_endpoint)
    }

    fn owner(&self) -> Result<Address, KeyError> {
        self.keys.address().ok_or(KeyError::Locked)
    }

    /// Transaction service bound to the active network and identity.
    pub fn service(&self) -> Result<TransactionService<T>, WalletError> {
        let identity = self.keys.active_identity()?;
        let network = self.registry.active().clone();
        let client = self.pool.client(&network.rpc_endpoint)?;
        Ok(TransactionService::new(
            client,
            network,
            identity,
            self.config().broadcast_timeout,
        ))
    }

    // ----- Balances -----

    /// Native balance of the active identity. Zero if the node is unreachable.
    pub async fn native_balance(&self) -> Result<U256, WalletError> {
        let owner = self.owner()?;
        Ok(self.client()?.get_balance(owner).await)
    }

    /// ERC-20 balance of the active identity. Zero if the call fails.
    pub async fn token_balance(&self, token: Address) -> Result<U256, WalletError> {
        let owner = self.owner()?;
        Ok(self.client()?.token_balance(token, owner).await)
    }

    // ----- Sends -----

    fn record(&self, network: &Network, submitted: &SubmittedTransaction, to: Address, value: U256, symbol: &str) {
        self.history.insert(TransactionRecord {
            hash: submitted.hash,
            from: submitted.from,
            to,
            value,
            symbol: symbol.to_string(),
            network: network.id.clone(),
            kind: submitted.kind.into(),
            status: RecordStatus::Pending,
            timestamp: Utc::now(),
        });
    }

    pub async fn send_native(&self, to: Address, value: U256) -> Result<SubmittedTransaction, WalletError> {
        let service = self.service()?;
        let submitted = service.send_native(to, value).await?;
        let network = service.network();
        self.record(network, &submitted, to, value, &network.native_symbol);
        Ok(submitted)
    }

    /// Sends `amount` base units of `token`. `symbol` only labels the
    /// history entry.
    pub async fn send_token(
        &self,
        token: Address,
        to: Address,
        amount: U256,
        symbol: &str,
    ) -> Result<SubmittedTransaction, WalletError> {
        let service = self.service()?;
        let submitted = service.send_token(token, to, amount).await?;
        self.record(service.network(), &submitted, to, amount, symbol);
        Ok(submitted)
    }

    pub async fn cancel(&self, hash: H256) -> Result<SubmittedTransaction, WalletError> {
        let service = self.service()?;
        let submitted = service.cancel(hash).await?;
        let network = service.network();
        self.record(network, &submitted, submitted.to, submitted.value, &network.native_symbol);
        Ok(submitted)
    }

    /// Speeds up `hash`. The new history entry keeps the recipient, amount
    /// and symbol of the transaction it replaces.
    pub async fn speed_up(&self, hash: H256) -> Result<SubmittedTransaction, WalletError> {
        let service = self.service()?;
        let submitted = service.speed_up(hash).await?;
        let network = service.network();
        let (to, value, symbol) = self.replacement_label(network, hash, &submitted);
        self.record(network, &submitted, to, value, &symbol);
        Ok(submitted)
    }

    /// Recipient, amount and symbol for a replacement of `original`. The
    /// local record wins; otherwise token transfers are decoded from the
    /// calldata and named from the watchlist.
    fn replacement_label(
        &self,
        network: &Network,
        original: H256,
        submitted: &SubmittedTransaction,
    ) -> (Address, U256, String) {
        if let Some(record) = self.history.get(&original) {
            return (record.to, record.value, record.symbol);
        }
        if is_transfer_call(&submitted.data) {
            if let Ok((to, amount)) = decode_transfer(&submitted.data) {
                let symbol = self
                    .tokens
                    .get(&network.id, &submitted.to)
                    .map(|t| t.symbol)
                    .unwrap_or_else(|| UNKNOWN_TOKEN_SYMBOL.to_string());
                return (to, amount, symbol);
            }
        }
        (submitted.to, submitted.value, network.native_symbol.clone())
    }

    /// Resolves pending history entries on the active network.
    pub async fn check_pending(&self) -> Result<ReconcileSummary, WalletError> {
        let network = self.registry.active();
        let client = self.pool.client(&network.rpc_endpoint)?;
        Ok(reconcile_pending(&self.history, &client, &network.id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{InMemoryHistory, RecordKind};
    use crate::identity::InMemorySecureStore;
    use crate::rpc::{RpcMethod, ScriptedTransport};
    use crate::token::encode_transfer;
    use crate::watchlist::TrackedToken;
    use serde_json::json;

    type TestWallet = Wallet<InMemorySecureStore, InMemoryHistory, Arc<ScriptedTransport>>;

    fn wallet(network: &str) -> (Arc<ScriptedTransport>, TestWallet) {
        let node = Arc::new(ScriptedTransport::default());
        let shared = node.clone();
        let config = EngineConfig {
            default_network: network.into(),
            ..Default::default()
        };
        let pool = ClientPool::with_connector(config, move |_| Ok(shared.clone()));
        let wallet = Wallet::with_pool(InMemorySecureStore::new(), InMemoryHistory::new(), pool);
        (node, wallet)
    }

    #[tokio::test]
    async fn locked_wallet_refuses_everything() {
        let (node, wallet) = wallet("eth");
        assert!(matches!(
            wallet.native_balance().await,
            Err(WalletError::Key(KeyError::Locked))
        ));
        assert!(matches!(
            wallet.send_native(Address::repeat_byte(2), U256::one()).await,
            Err(WalletError::Key(KeyError::Locked))
        ));
        assert!(node.calls().is_empty());
    }

    #[test]
    fn startup_network_comes_from_config() {
        let (_, wallet) = wallet("matic");
        assert_eq!(wallet.networks().active().chain_id, 137);
    }

    #[tokio::test]
    async fn send_is_recorded_as_pending() {
        let (node, wallet) = wallet("base");
        wallet.keys().create_wallet().unwrap();
        let from = wallet.keys().address().unwrap();

        node.reply(RpcMethod::GetTransactionCount, json!("0x0"))
            .reply(RpcMethod::GetCode, json!("0x"))
            .reply(RpcMethod::GasPrice, json!("0x1"))
            .reply(RpcMethod::EstimateGas, json!("0x5208"))
            .reply(RpcMethod::GetBalance, json!("0xffffffff"))
            .reply(RpcMethod::SendRawTransaction, json!(format!("0x{}", "cd".repeat(32))));

        let to = Address::repeat_byte(2);
        let submitted = wallet.send_native(to, U256::from(10)).await.unwrap();
        assert_eq!(submitted.from, from);

        let history = wallet.history().all();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].hash, H256::repeat_byte(0xcd));
        assert_eq!(history[0].network, "base");
        assert_eq!(history[0].symbol, "ETH");
        assert_eq!(history[0].status, RecordStatus::Pending);
        assert_eq!(history[0].to, to);
    }

    /// Scripts a pending token transfer from `from` plus everything a
    /// speed-up needs after it.
    fn script_pending_token_send(
        node: &ScriptedTransport,
        from: Address,
        token: Address,
        data: &[u8],
    ) {
        node.reply(
            RpcMethod::GetTransactionByHash,
            json!({
                "hash": format!("0x{}", "ab".repeat(32)),
                "from": from,
                "to": token,
                "nonce": "0x4",
                "gasPrice": "0x3b9aca00",
                "gas": "0x186a0",
                "value": "0x0",
                "input": format!("0x{}", hex::encode(data)),
                "blockNumber": null
            }),
        )
        .reply(RpcMethod::EstimateGas, json!("0xea60"))
        .reply(RpcMethod::GasPrice, json!("0x3b9aca00"))
        .reply(RpcMethod::GetBalance, json!("0xffffffffffffffff"))
        .reply(RpcMethod::SendRawTransaction, json!(format!("0x{}", "ef".repeat(32))));
    }

    #[tokio::test]
    async fn token_speed_up_is_labelled_with_recipient_and_symbol() {
        let (node, wallet) = wallet("eth");
        wallet.keys().create_wallet().unwrap();
        let from = wallet.keys().address().unwrap();

        let token = Address::repeat_byte(0x70);
        let recipient = Address::repeat_byte(0x22);
        wallet.tokens().add(TrackedToken {
            network: "eth".into(),
            address: token,
            symbol: "USDC".into(),
            name: "USD Coin".into(),
            decimals: 6,
        });
        let data = encode_transfer(&recipient, U256::from(2_500_000));
        script_pending_token_send(&node, from, token, &data);

        let submitted = wallet.speed_up(H256::repeat_byte(0xab)).await.unwrap();
        assert_eq!(submitted.to, token);

        let record = wallet.history().get(&H256::repeat_byte(0xef)).unwrap();
        assert_eq!(record.kind, RecordKind::SpeedUp);
        assert_eq!(record.to, recipient);
        assert_eq!(record.value, U256::from(2_500_000));
        assert_eq!(record.symbol, "USDC");
    }

    #[tokio::test]
    async fn speed_up_reuses_the_label_of_the_local_record() {
        let (node, wallet) = wallet("eth");
        wallet.keys().create_wallet().unwrap();
        let from = wallet.keys().address().unwrap();

        let token = Address::repeat_byte(0x70);
        let recipient = Address::repeat_byte(0x22);
        wallet.history().insert(TransactionRecord {
            hash: H256::repeat_byte(0xab),
            from,
            to: recipient,
            value: U256::from(7),
            symbol: "DAI".into(),
            network: "eth".into(),
            kind: RecordKind::TokenSend,
            status: RecordStatus::Pending,
            timestamp: Utc::now(),
        });
        script_pending_token_send(&node, from, token, &encode_transfer(&recipient, U256::from(7)));

        wallet.speed_up(H256::repeat_byte(0xab)).await.unwrap();

        let record = wallet.history().get(&H256::repeat_byte(0xef)).unwrap();
        assert_eq!(record.to, recipient);
        assert_eq!(record.value, U256::from(7));
        assert_eq!(record.symbol, "DAI");
    }

    #[tokio::test]
    async fn balance_soft_fails_to_zero() {
        let (node, wallet) = wallet("eth");
        wallet.keys().create_wallet().unwrap();
        node.fail(RpcMethod::GetBalance, ChainError::Transport("down".into()));
        assert_eq!(wallet.native_balance().await.unwrap(), U256::zero());
    }
}
