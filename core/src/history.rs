//! # Transaction History
//!
//! A local record of what the wallet sent (and, if a host app feeds it
//! explorer data, received), plus the job that flips pending entries to
//! success or failure once a receipt shows up.
//!
//! Persistence is the host's concern. [`HistoryStore`] is the seam;
//! [`InMemoryHistory`] is what the CLI and tests use.
//!
//! ## Design
//!
//! - `DashMap` keyed by hash: inserts from a broadcast and status updates
//!   from reconciliation can run on different tasks without a global lock.
//! - Reconciliation never guesses. No receipt means still pending, however
//!   old the entry is. A dropped transaction looks exactly like a slow one
//!   from here.

use std::fmt;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::rpc::{ChainClient, RpcTransport};
use crate::transaction::OperationKind;

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// Direction / purpose of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Send,
    Receive,
    TokenSend,
    Cancel,
    SpeedUp,
}

impl From<OperationKind> for RecordKind {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::NativeTransfer => Self::Send,
            OperationKind::TokenTransfer => Self::TokenSend,
            OperationKind::Cancel => Self::Cancel,
            OperationKind::SpeedUp => Self::SpeedUp,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send => write!(f, "send"),
            Self::Receive => write!(f, "receive"),
            Self::TokenSend => write!(f, "token_send"),
            Self::Cancel => write!(f, "cancel"),
            Self::SpeedUp => write!(f, "speed_up"),
        }
    }
}

/// Confirmation state of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Success,
    Failed,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One line of history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: H256,
    pub from: Address,
    /// For token sends, the token recipient rather than the contract.
    pub to: Address,
    /// Amount in base units of `symbol`.
    pub value: U256,
    pub symbol: String,
    /// Network id (`"eth"`, `"arb"`, ...).
    pub network: String,
    pub kind: RecordKind,
    pub status: RecordStatus,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// HistoryStore
// ---------------------------------------------------------------------------

/// Append/query store for history records.
pub trait HistoryStore: Send + Sync {
    /// Inserts `record`, replacing any entry with the same hash.
    fn insert(&self, record: TransactionRecord);

    /// All records, newest first.
    fn all(&self) -> Vec<TransactionRecord>;

    /// Records still waiting for a receipt, newest first.
    fn pending(&self) -> Vec<TransactionRecord>;

    /// Sets the status of `hash`. Returns `false` if there is no such record.
    fn update_status(&self, hash: &H256, status: RecordStatus) -> bool;

    fn get(&self, hash: &H256) -> Option<TransactionRecord>;
}

/// [`HistoryStore`] held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    records: DashMap<H256, TransactionRecord>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn sorted(&self, filter: impl Fn(&TransactionRecord) -> bool) -> Vec<TransactionRecord> {
        let mut out: Vec<_> = self
            .records
            .iter()
            .filter(|r| filter(r.value()))
            .map(|r| r.value().clone())
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out
    }
}

impl HistoryStore for InMemoryHistory {
    fn insert(&self, record: TransactionRecord) {
        self.records.insert(record.hash, record);
    }

    fn all(&self) -> Vec<TransactionRecord> {
        self.sorted(|_| true)
    }

    fn pending(&self) -> Vec<TransactionRecord> {
        self.sorted(|r| r.status == RecordStatus::Pending)
    }

    fn update_status(&self, hash: &H256, status: RecordStatus) -> bool {
        match self.records.get_mut(hash) {
            Some(mut record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    fn get(&self, hash: &H256) -> Option<TransactionRecord> {
        self.records.get(hash).map(|r| r.value().clone())
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Outcome of one [`reconcile_pending`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub checked: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub still_pending: usize,
}

/// Checks every pending record of `network_id` for a receipt.
///
/// Status `1` marks the record successful, `0` failed. A receipt without
/// a status field (pre-Byzantium) counts as success once it has a block.
/// A missing receipt, or a failed lookup, leaves the record pending.
pub async fn reconcile_pending<H, T>(
    store: &H,
    client: &ChainClient<T>,
    network_id: &str,
) -> ReconcileSummary
where
    H: HistoryStore + ?Sized,
    T: RpcTransport,
{
    let mut summary = ReconcileSummary::default();

    for record in store.pending().into_iter().filter(|r| r.network == network_id) {
        summary.checked += 1;
        let Some(receipt) = client.get_receipt(record.hash).await else {
            summary.still_pending += 1;
            continue;
        };

        let status = match receipt.succeeded() {
            Some(true) => RecordStatus::Success,
            Some(false) => RecordStatus::Failed,
            None if receipt.block_number.is_some() => RecordStatus::Success,
            None => {
                summary.still_pending += 1;
                continue;
            }
        };

        store.update_status(&record.hash, status);
        match status {
            RecordStatus::Failed => summary.failed += 1,
            _ => summary.succeeded += 1,
        }
        debug!(hash = ?record.hash, %status, "pending transaction resolved");
    }

    if summary.checked > 0 {
        info!(
            network = network_id,
            checked = summary.checked,
            succeeded = summary.succeeded,
            failed = summary.failed,
            still_pending = summary.still_pending,
            "reconciled pending transactions"
        );
    }
    summary
}
