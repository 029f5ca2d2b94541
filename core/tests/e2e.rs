//! End-to-end tests for the NOVA wallet engine.
//!
//! These drive the public [`Wallet`] facade against a scripted JSON-RPC node
//! and then take apart whatever reached `eth_sendRawTransaction`. They prove
//! the pieces compose: key import, network selection, fee policy, preflight,
//! EIP-155 signing, broadcast, history and receipt reconciliation.
//!
//! Each test builds its own wallet and node. Nothing is shared.

use std::sync::Arc;

use ethereum_types::{Address, H256, U256};
use serde_json::{json, Value};

use nova_wallet_core::config::EngineConfig;
use nova_wallet_core::history::{HistoryStore, InMemoryHistory, RecordKind, RecordStatus};
use nova_wallet_core::identity::InMemorySecureStore;
use nova_wallet_core::primitives::{decode_hex, parse_address, parse_units};
use nova_wallet_core::rpc::{ChainError, ClientPool, RpcMethod, ScriptedTransport};
use nova_wallet_core::token::{decode_transfer, encode_transfer};
use nova_wallet_core::transaction::{decode_signed, DecodedTransaction, TxError};
use nova_wallet_core::{Wallet, WalletError};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const GWEI: u64 = 1_000_000_000;
const PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const PHRASE_ADDRESS: &str = "0x9858EfFD232B4033E47d90003D41EC34EcaEda94";
/// 100 ETH.
const RICH: &str = "0x56bc75e2d63100000";

type TestWallet = Wallet<InMemorySecureStore, InMemoryHistory, Arc<ScriptedTransport>>;

/// A wallet unlocked with the well-known test phrase, on `network`.
fn setup(network: &str) -> (Arc<ScriptedTransport>, TestWallet) {
    let node = Arc::new(ScriptedTransport::default());
    let shared = Arc::clone(&node);
    let config = EngineConfig {
        default_network: network.to_string(),
        ..Default::default()
    };
    let pool = ClientPool::with_connector(config, move |_| Ok(Arc::clone(&shared)));
    let wallet = Wallet::with_pool(InMemorySecureStore::new(), InMemoryHistory::new(), pool);
    wallet.keys().import_mnemonic(PHRASE).expect("import");
    (node, wallet)
}

fn me() -> Address {
    parse_address(PHRASE_ADDRESS).unwrap()
}

fn quantity(v: u64) -> Value {
    json!(format!("0x{v:x}"))
}

fn accept_broadcast(node: &ScriptedTransport, byte: u8) -> H256 {
    node.reply(
        RpcMethod::SendRawTransaction,
        json!(format!("0x{}", hex::encode([byte; 32]))),
    );
    H256::repeat_byte(byte)
}

/// The single payload the node received, decoded.
fn only_broadcast(node: &ScriptedTransport) -> DecodedTransaction {
    let sent = node.broadcasts();
    assert_eq!(sent.len(), 1, "expected exactly one broadcast");
    decode_signed(&decode_hex(&sent[0]).unwrap()).unwrap()
}

fn pending_tx(hash: H256, to: Address, nonce: u64, price: u64, gas: u64, input: &[u8]) -> Value {
    json!({
        "hash": hash,
        "from": me(),
        "to": to,
        "nonce": quantity(nonce),
        "gasPrice": quantity(price),
        "gas": quantity(gas),
        "value": "0x0",
        "input": format!("0x{}", hex::encode(input)),
        "blockNumber": null
    })
}

// ---------------------------------------------------------------------------
// Sends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn native_send_on_ethereum_then_confirm() {
    let (node, wallet) = setup("eth");
    let to = Address::repeat_byte(0x22);

    node.reply(RpcMethod::GetTransactionCount, quantity(3))
        .reply(RpcMethod::GetCode, json!("0x"))
        .reply(RpcMethod::GasPrice, quantity(20 * GWEI))
        .reply(RpcMethod::EstimateGas, quantity(21_000))
        .reply(RpcMethod::GetBalance, json!(RICH));
    let hash = accept_broadcast(&node, 0xaa);

    let value = parse_units("0.5", 18).unwrap();
    let submitted = wallet.send_native(to, value).await.unwrap();
    assert_eq!(submitted.hash, hash);
    assert_eq!(submitted.nonce, 3);

    let sent = only_broadcast(&node);
    assert_eq!(sent.sender, me());
    assert_eq!(sent.transaction.chain_id, 1);
    assert_eq!(sent.transaction.nonce, 3);
    assert_eq!(sent.transaction.gas_limit, 23_100);
    assert_eq!(sent.transaction.gas_price, U256::from(20 * GWEI));
    assert_eq!(sent.transaction.to, Some(to));
    assert_eq!(sent.transaction.value, value);
    assert!(sent.transaction.data.is_empty());

    let record = wallet.history().get(&hash).unwrap();
    assert_eq!(record.kind, RecordKind::Send);
    assert_eq!(record.status, RecordStatus::Pending);

    node.reply(
        RpcMethod::GetTransactionReceipt,
        json!({ "transactionHash": hash, "blockNumber": "0x100", "status": "0x1", "gasUsed": "0x5208" }),
    );
    let summary = wallet.check_pending().await.unwrap();
    assert_eq!(summary.succeeded, 1);
    assert_eq!(wallet.history().get(&hash).unwrap().status, RecordStatus::Success);
}

#[tokio::test]
async fn arbitrum_doubles_the_plain_transfer_limit() {
    let (node, wallet) = setup("arb");

    node.reply(RpcMethod::GetTransactionCount, quantity(0))
        .reply(RpcMethod::GetCode, json!("0x"))
        .reply(RpcMethod::GasPrice, quantity(GWEI / 10))
        .reply(RpcMethod::EstimateGas, quantity(21_000))
        .reply(RpcMethod::GetBalance, json!(RICH));
    accept_broadcast(&node, 0x01);

    wallet
        .send_native(Address::repeat_byte(0x22), U256::from(1_000))
        .await
        .unwrap();

    let sent = only_broadcast(&node);
    assert_eq!(sent.transaction.gas_limit, 42_000);
    assert_eq!(sent.transaction.gas_price, U256::from(GWEI / 10));
    assert_eq!(sent.transaction.chain_id, 42161);
}

#[tokio::test]
async fn arbitrum_token_send_falls_back_when_estimate_fails() {
    let (node, wallet) = setup("arb");
    let token = Address::repeat_byte(0x70);

    node.reply(RpcMethod::GetTransactionCount, quantity(1))
        .reply(RpcMethod::GasPrice, quantity(GWEI / 10))
        .fail(RpcMethod::EstimateGas, ChainError::Rpc { code: 3, message: "execution reverted".into() })
        .reply(RpcMethod::GetBalance, json!(RICH));
    accept_broadcast(&node, 0x02);

    wallet
        .send_token(token, Address::repeat_byte(0x22), U256::from(5), "USDC")
        .await
        .unwrap();

    let sent = only_broadcast(&node);
    assert_eq!(sent.transaction.gas_limit, 200_000);
}

#[tokio::test]
async fn polygon_token_send_pays_priority_and_encodes_transfer() {
    let (node, wallet) = setup("matic");
    let token = Address::repeat_byte(0x70);
    let recipient = Address::repeat_byte(0x22);
    let amount = parse_units("1.5", 6).unwrap();

    node.reply(RpcMethod::GetTransactionCount, quantity(9))
        .reply(RpcMethod::GasPrice, quantity(30 * GWEI))
        .reply(RpcMethod::EstimateGas, quantity(50_000))
        .reply(RpcMethod::GetBalance, json!(RICH));
    let hash = accept_broadcast(&node, 0x03);

    wallet.send_token(token, recipient, amount, "USDC").await.unwrap();

    let sent = only_broadcast(&node);
    assert_eq!(sent.transaction.chain_id, 137);
    assert_eq!(sent.transaction.gas_price, U256::from(37_500_000_000u64));
    assert_eq!(sent.transaction.gas_limit, 65_000);
    assert_eq!(sent.transaction.to, Some(token));
    assert!(sent.transaction.value.is_zero());
    assert_eq!(
        decode_transfer(&sent.transaction.data).unwrap(),
        (recipient, U256::from(1_500_000))
    );

    let record = wallet.history().get(&hash).unwrap();
    assert_eq!(record.kind, RecordKind::TokenSend);
    assert_eq!(record.to, recipient);
    assert_eq!(record.value, amount);
    assert_eq!(record.symbol, "USDC");
    assert_eq!(record.network, "matic");
}

#[tokio::test]
async fn insufficient_funds_never_reaches_the_node() {
    let (node, wallet) = setup("eth");

    node.reply(RpcMethod::GetTransactionCount, quantity(0))
        .reply(RpcMethod::GetCode, json!("0x"))
        .reply(RpcMethod::GasPrice, quantity(GWEI))
        .reply(RpcMethod::EstimateGas, quantity(21_000))
        .reply(RpcMethod::GetBalance, quantity(1_000));

    let err = wallet
        .send_native(Address::repeat_byte(0x22), U256::from(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WalletError::Transaction(TxError::InsufficientFunds { .. })
    ));
    assert!(node.broadcasts().is_empty());
    assert!(wallet.history().all().is_empty());
}

// ---------------------------------------------------------------------------
// Replacements
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancel_replaces_with_zero_value_self_transfer() {
    let (node, wallet) = setup("eth");
    let stuck = H256::repeat_byte(0x51);

    node.reply(
        RpcMethod::GetTransactionByHash,
        pending_tx(stuck, Address::repeat_byte(0x22), 7, 10 * GWEI, 21_000, &[]),
    )
    .reply(RpcMethod::GasPrice, quantity(8 * GWEI))
    .reply(RpcMethod::GetBalance, json!(RICH));
    let hash = accept_broadcast(&node, 0x04);

    wallet.cancel(stuck).await.unwrap();

    let sent = only_broadcast(&node);
    assert_eq!(sent.transaction.nonce, 7);
    assert_eq!(sent.transaction.to, Some(me()));
    assert!(sent.transaction.value.is_zero());
    assert!(sent.transaction.data.is_empty());
    assert_eq!(sent.transaction.gas_limit, 21_000);
    assert_eq!(sent.transaction.gas_price, U256::from(11_500_000_000u64));
    assert_eq!(wallet.history().get(&hash).unwrap().kind, RecordKind::Cancel);
}

#[tokio::test]
async fn speed_up_token_transfer_keeps_payload_and_bumps_limit() {
    let (node, wallet) = setup("eth");
    let stuck = H256::repeat_byte(0x52);
    let token = Address::repeat_byte(0x70);
    let data = encode_transfer(&Address::repeat_byte(0x22), U256::from(1_000));

    node.reply(
        RpcMethod::GetTransactionByHash,
        pending_tx(stuck, token, 12, 10 * GWEI, 65_000, &data),
    )
    .fail(RpcMethod::EstimateGas, ChainError::Transport("down".into()))
    .reply(RpcMethod::GasPrice, quantity(20 * GWEI))
    .reply(RpcMethod::GetBalance, json!(RICH));
    let hash = accept_broadcast(&node, 0x05);

    wallet.speed_up(stuck).await.unwrap();

    let sent = only_broadcast(&node);
    assert_eq!(sent.transaction.nonce, 12);
    assert_eq!(sent.transaction.to, Some(token));
    assert_eq!(sent.transaction.data, data);
    assert_eq!(sent.transaction.gas_limit, 78_000);
    assert_eq!(sent.transaction.gas_price, U256::from(20 * GWEI));

    let record = wallet.history().get(&hash).unwrap();
    assert_eq!(record.kind, RecordKind::SpeedUp);
    assert_eq!(record.to, Address::repeat_byte(0x22));
    assert_eq!(record.value, U256::from(1_000));
    assert_eq!(record.symbol, "TOKEN");
}

#[tokio::test]
async fn replacement_targets_must_exist_and_be_pending() {
    let (node, wallet) = setup("eth");
    let missing = H256::repeat_byte(0x53);
    node.reply(RpcMethod::GetTransactionByHash, Value::Null);

    let err = wallet.cancel(missing).await.unwrap_err();
    assert!(matches!(err, WalletError::Transaction(TxError::NotFound(h)) if h == missing));

    let (node, wallet) = setup("eth");
    let mined = H256::repeat_byte(0x54);
    let mut tx = pending_tx(mined, Address::repeat_byte(0x22), 1, GWEI, 21_000, &[]);
    tx["blockNumber"] = json!("0x2a");
    node.reply(RpcMethod::GetTransactionByHash, tx);

    let err = wallet.speed_up(mined).await.unwrap_err();
    assert!(matches!(
        err,
        WalletError::Transaction(TxError::AlreadyMined { block: 42, .. })
    ));
    assert!(node.broadcasts().is_empty());
}
