// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NOVA Wallet Core Library
//!
//! The engine behind a self-custodial EVM wallet: it holds one signing key,
//! talks JSON-RPC to a handful of EVM networks, and turns "send X to Y" into
//! a priced, checked, signed and broadcast transaction. It also cancels and
//! speeds up transactions that got stuck.
//!
//! ## Architecture
//!
//! - **primitives**: Hex, addresses, checksums, unit conversion, keccak.
//! - **config**: Timeouts, gas constants, fee multipliers, engine settings.
//! - **network**: The built-in network table and the active-network switch.
//! - **identity**: BIP-39/BIP-32 key derivation, secure storage seam, unlock/lock.
//! - **rpc**: JSON-RPC transport, typed chain client, per-endpoint client pool.
//! - **fees**: Per-network gas price and gas limit rules. Pure functions.
//! - **token**: ERC-20 calldata for `balanceOf` and `transfer`.
//! - **transaction**: Legacy EIP-155 transactions: build, sign, broadcast, replace.
//! - **history**: Local record of sent transactions and receipt reconciliation.
//! - **watchlist**: User-tracked ERC-20 tokens per network.
//! - **wallet**: The facade a front end holds on to.
//!
//! ## Design Philosophy
//!
//! 1. Money is `U256` wei end to end. Floats only exist in a UI.
//! 2. Reads that feed a display fail soft; reads that feed a signature fail loud.
//! 3. Nothing is signed before the balance check passes.
//! 4. Fee rules are data-in, data-out, so every multiplier is unit tested.

pub mod config;
pub mod fees;
pub mod history;
pub mod identity;
pub mod network;
pub mod primitives;
pub mod rpc;
pub mod token;
pub mod transaction;
pub mod wallet;
pub mod watchlist;

pub use wallet::{Wallet, WalletError};
