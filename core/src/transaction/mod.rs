//! # Transaction Module
//!
//! Turns a user intent ("send 0.5 ETH to 0xabc", "cancel that stuck
//! transfer") into a signed, broadcast Ethereum transaction.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    OperationKind, BuildStage, PendingTransaction, SubmittedTransaction
//! error.rs    TxError, the failure taxonomy every operation returns
//! builder.rs  LegacyTransaction and its fluent TransactionBuilder
//! signing.rs  EIP-155 signing, SignedPayload, and decode/recover
//! service.rs  TransactionService: the nonce → fee → preflight → sign → broadcast pipeline
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: the service fetches the nonce, prices gas via [`crate::fees`],
//!    and checks the balance covers the worst case.
//! 2. **Sign**: [`sign_transaction`] with the active identity.
//! 3. **Broadcast**: `eth_sendRawTransaction`; the node's hash comes back in a
//!    [`SubmittedTransaction`].
//! 4. **Track**: not here. See [`crate::history::reconcile_pending`].
//!
//! ## Design Decisions
//!
//! - Legacy (type 0) envelope with EIP-155 replay protection. Every network
//!   in the table accepts it, and replacement-by-fee rules are simplest with
//!   a single gas price.
//! - Cancel and speed-up reuse the original nonce. Always. A new nonce would
//!   not replace anything.
//! - All amounts are `U256` wei. No floating point anywhere near money.

pub mod builder;
pub mod error;
pub mod service;
pub mod signing;
pub mod types;

pub use builder::{LegacyTransaction, TransactionBuilder};
pub use error::TxError;
pub use service::TransactionService;
pub use signing::{decode_signed, sign_transaction, DecodedTransaction, SignedPayload};
pub use types::{BuildStage, OperationKind, PendingTransaction, SubmittedTransaction};
