//! The build pipeline: nonce, fees, preflight, sign, broadcast.
//!
//! ```text
//! Start ─▶ NonceFetched ─▶ FeeComputed ─▶ PreflightChecked ─▶ Signed ─▶ Broadcast
//!   │           │               │                 │              │           │
//!   └───────────┴───────────────┴──── Failed(TxError) ◀──────────┴───────────┘
//! ```
//!
//! Four operations share the pipeline and differ only in where the nonce
//! comes from, which fee sub-policy applies, and what goes in `to`,
//! `value` and `data`. No signed payload exists until the balance check
//! has passed. There is no in-process nonce reservation: two concurrent
//! sends from the same account read the same `latest` nonce and one of
//! them will be rejected by the node.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ethereum_types::{Address, H256, U256};
use tracing::{debug, info, warn};

use super::builder::TransactionBuilder;
use super::error::TxError;
use super::signing::{sign_transaction, SignedPayload};
use super::types::{BuildStage, OperationKind, PendingTransaction, SubmittedTransaction};
use crate::fees::{self, FeeQuote, TxKind};
use crate::identity::SigningIdentity;
use crate::network::Network;
use crate::rpc::{CallRequest, ChainClient, ChainError, RpcTransport};
use crate::token::{encode_transfer, is_transfer_call};

/// A fully built and signed transaction that has not been broadcast.
#[derive(Debug, Clone)]
struct Prepared {
    payload: SignedPayload,
    kind: OperationKind,
    nonce: u64,
    fee: FeeQuote,
    to: Address,
    value: U256,
    data: Vec<u8>,
}

/// Builds, signs and broadcasts transactions for one identity on one network.
///
/// Cheap to construct; the wallet facade makes one per operation.
pub struct TransactionService<T> {
    client: Arc<ChainClient<T>>,
    network: Network,
    identity: Arc<SigningIdentity>,
    build_timeout: Duration,
}

impl<T: RpcTransport> TransactionService<T> {
    pub fn new(
        client: Arc<ChainClient<T>>,
        network: Network,
        identity: Arc<SigningIdentity>,
        build_timeout: Duration,
    ) -> Self {
        Self {
            client,
            network,
            identity,
            build_timeout,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn sender(&self) -> Address {
        self.identity.address()
    }

    fn stage(&self, kind: OperationKind, stage: BuildStage) {
        debug!(network = %self.network.id, %kind, %stage, "build stage");
    }

    async fn bounded<R, F>(&self, kind: OperationKind, build: F) -> Result<R, TxError>
    where
        F: Future<Output = Result<R, TxError>>,
    {
        tokio::time::timeout(self.build_timeout, build)
            .await
            .map_err(|_| TxError::Timeout {
                operation: kind.to_string(),
                after_ms: self.build_timeout.as_millis() as u64,
            })?
    }

    // ----- Public operations -----

    /// Sends `value` wei of the native asset to `to`.
    pub async fn send_native(&self, to: Address, value: U256) -> Result<SubmittedTransaction, TxError> {
        let kind = OperationKind::NativeTransfer;
        self.bounded(kind, async {
            let prepared = self.build_native(to, value).await?;
            self.broadcast(prepared).await
        })
        .await
    }

    /// Same as [`send_native`](Self::send_native) without the broadcast.
    pub async fn prepare_native(&self, to: Address, value: U256) -> Result<SignedPayload, TxError> {
        self.bounded(OperationKind::NativeTransfer, async {
            Ok(self.build_native(to, value).await?.payload)
        })
        .await
    }

    /// Sends `amount` base units of the ERC-20 at `token` to `to`.
    pub async fn send_token(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<SubmittedTransaction, TxError> {
        self.bounded(OperationKind::TokenTransfer, async {
            let prepared = self.build_token(token, to, amount).await?;
            self.broadcast(prepared).await
        })
        .await
    }

    pub async fn prepare_token(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<SignedPayload, TxError> {
        self.bounded(OperationKind::TokenTransfer, async {
            Ok(self.build_token(token, to, amount).await?.payload)
        })
        .await
    }

    /// Replaces the pending transaction `hash` with a zero-value self-transfer.
    pub async fn cancel(&self, hash: H256) -> Result<SubmittedTransaction, TxError> {
        self.bounded(OperationKind::Cancel, async {
            let prepared = self.build_cancel(hash).await?;
            self.broadcast(prepared).await
        })
        .await
    }

    pub async fn prepare_cancel(&self, hash: H256) -> Result<SignedPayload, TxError> {
        self.bounded(OperationKind::Cancel, async {
            Ok(self.build_cancel(hash).await?.payload)
        })
        .await
    }

    /// Resubmits the pending transaction `hash` at a higher gas price.
    pub async fn speed_up(&self, hash: H256) -> Result<SubmittedTransaction, TxError> {
        self.bounded(OperationKind::SpeedUp, async {
            let prepared = self.build_speed_up(hash).await?;
            self.broadcast(prepared).await
        })
        .await
    }

    pub async fn prepare_speed_up(&self, hash: H256) -> Result<SignedPayload, TxError> {
        self.bounded(OperationKind::SpeedUp, async {
            Ok(self.build_speed_up(hash).await?.payload)
        })
        .await
    }

    // ----- Builds -----

    async fn build_native(&self, to: Address, value: U256) -> Result<Prepared, TxError> {
        let op = OperationKind::NativeTransfer;
        self.stage(op, BuildStage::Start);
        if value.is_zero() {
            return Err(TxError::InvalidInput("amount must be greater than zero".into()));
        }
        let from = self.sender();

        let nonce = self.client.get_nonce(from).await?;
        self.stage(op, BuildStage::NonceFetched);

        let kind = if self.client.is_contract(to).await {
            TxKind::NativeContract
        } else {
            TxKind::NativeEoa
        };
        let raw_price = self.client.get_gas_price().await?;
        let estimate = self
            .client
            .estimate_gas(&CallRequest::transaction(from, to, value, &[]))
            .await;
        let fee = fees::quote(self.network.fee_model, kind, raw_price, estimate);
        debug!(%kind, ?estimate, gas_limit = fee.gas_limit, gas_price = %fee.gas_price, "fee computed");
        self.stage(op, BuildStage::FeeComputed);

        self.finish(op, nonce, fee, to, value, Vec::new()).await
    }

    async fn build_token(&self, token: Address, to: Address, amount: U256) -> Result<Prepared, TxError> {
        let op = OperationKind::TokenTransfer;
        self.stage(op, BuildStage::Start);
        if amount.is_zero() {
            return Err(TxError::InvalidInput("amount must be greater than zero".into()));
        }
        let from = self.sender();
        let data = encode_transfer(&to, amount);

        let nonce = self.client.get_nonce(from).await?;
        self.stage(op, BuildStage::NonceFetched);

        let raw_price = self.client.get_gas_price().await?;
        let estimate = self
            .client
            .estimate_gas(&CallRequest::transaction(from, token, U256::zero(), &data))
            .await;
        let fee = fees::quote(
            self.network.fee_model,
            TxKind::TokenTransfer,
            raw_price,
            estimate,
        );
        self.stage(op, BuildStage::FeeComputed);

        self.finish(op, nonce, fee, token, U256::zero(), data).await
    }

    async fn build_cancel(&self, hash: H256) -> Result<Prepared, TxError> {
        let op = OperationKind::Cancel;
        self.stage(op, BuildStage::Start);
        let original = self.load_pending(hash).await?;
        self.stage(op, BuildStage::NonceFetched);

        let raw_price = self.client.get_gas_price().await?;
        let gas_price =
            fees::replacement_gas_price(self.network.fee_model, raw_price, original.gas_price);
        let fee = FeeQuote::new(gas_price, fees::cancel_gas_limit());
        self.stage(op, BuildStage::FeeComputed);

        let own = self.sender();
        self.finish(op, original.nonce, fee, own, U256::zero(), Vec::new())
            .await
    }

    async fn build_speed_up(&self, hash: H256) -> Result<Prepared, TxError> {
        let op = OperationKind::SpeedUp;
        self.stage(op, BuildStage::Start);
        let original = self.load_pending(hash).await?;
        let to = original.to.ok_or_else(|| {
            TxError::InvalidInput("cannot speed up a contract deployment".into())
        })?;
        self.stage(op, BuildStage::NonceFetched);

        let has_data = !original.data.is_empty();
        let kind = if !has_data {
            TxKind::NativeEoa
        } else if is_transfer_call(&original.data) {
            TxKind::TokenTransfer
        } else {
            TxKind::NativeContract
        };
        let re_estimate = if has_data {
            self.client
                .estimate_gas(&CallRequest::transaction(
                    original.from,
                    to,
                    original.value,
                    &original.data,
                ))
                .await
        } else {
            None
        };

        let raw_price = self.client.get_gas_price().await?;
        let fee = FeeQuote::new(
            fees::replacement_gas_price(self.network.fee_model, raw_price, original.gas_price),
            fees::speed_up_gas_limit(
                self.network.fee_model,
                kind,
                original.gas_limit,
                has_data,
                re_estimate,
            ),
        );
        self.stage(op, BuildStage::FeeComputed);

        self.finish(op, original.nonce, fee, to, original.value, original.data)
            .await
    }

    // ----- Shared stages -----

    /// Looks up the replacement target and checks it is ours and unmined.
    async fn load_pending(&self, hash: H256) -> Result<PendingTransaction, TxError> {
        let rpc_tx = self
            .client
            .get_transaction(hash)
            .await?
            .ok_or(TxError::NotFound(hash))?;
        let original = PendingTransaction::try_from(rpc_tx)?;

        if let Some(block) = original.block_number {
            return Err(TxError::AlreadyMined { hash, block });
        }
        if original.from != self.sender() {
            return Err(TxError::InvalidInput(format!(
                "transaction {hash:?} was not sent by the active wallet"
            )));
        }
        Ok(original)
    }

    /// Preflight and signing, common to every operation.
    async fn finish(
        &self,
        kind: OperationKind,
        nonce: u64,
        fee: FeeQuote,
        to: Address,
        value: U256,
        data: Vec<u8>,
    ) -> Result<Prepared, TxError> {
        let required = fee
            .total_cost(value)
            .ok_or_else(|| TxError::InvalidInput("transaction cost overflows 256 bits".into()))?;
        let available = self.client.try_get_balance(self.sender()).await?;
        if available < required {
            return Err(TxError::InsufficientFunds {
                required,
                available,
            });
        }
        self.stage(kind, BuildStage::PreflightChecked);

        let tx = TransactionBuilder::new(self.network.chain_id)
            .nonce(nonce)
            .fee(fee)
            .to(to)
            .value(value)
            .data(data.clone())
            .build();
        let payload = sign_transaction(&tx, &self.identity)?;
        self.stage(kind, BuildStage::Signed);

        Ok(Prepared {
            payload,
            kind,
            nonce,
            fee,
            to,
            value,
            data,
        })
    }

    async fn broadcast(&self, prepared: Prepared) -> Result<SubmittedTransaction, TxError> {
        let hash = match self.client.send_raw_transaction(&prepared.payload.raw).await {
            Ok(hash) => hash,
            Err(ChainError::Rpc { message, .. }) => return Err(TxError::BroadcastRejected(message)),
            Err(ChainError::MissingResult(_)) => {
                return Err(TxError::UnknownFailure(
                    "transaction failed without hash".into(),
                ))
            }
            Err(other) => return Err(other.into()),
        };
        self.stage(prepared.kind, BuildStage::Broadcast);

        if hash != prepared.payload.hash {
            warn!(node = ?hash, local = ?prepared.payload.hash, "node reported an unexpected transaction hash");
        }
        info!(
            network = %self.network.id,
            kind = %prepared.kind,
            hash = ?hash,
            nonce = prepared.nonce,
            "transaction broadcast"
        );

        Ok(SubmittedTransaction {
            hash,
            from: self.sender(),
            nonce: prepared.nonce,
            fee: prepared.fee,
            kind: prepared.kind,
            to: prepared.to,
            value: prepared.value,
            data: prepared.data,
        })
    }
}
