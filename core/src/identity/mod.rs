//! # Identity Module
//!
//! Who signs. An Ethereum account is a secp256k1 keypair; its address is the
//! tail of the Keccak hash of the public key. We get the keypair from one of
//! two places:
//!
//! 1. **Mnemonic**: a 12-word BIP-39 phrase, stretched into a seed and
//!    walked down BIP-44 path `m/44'/60'/0'/0/0`. Same phrase, same address,
//!    on every wallet that follows the standard.
//! 2. **Raw key**: 32 bytes of hex pasted in by someone who knows what
//!    they are doing (or thinks they do).
//!
//! The layers:
//!
//! - **keys**: derivation, signing, and the redacted `SigningIdentity`.
//! - **secure_store**: the opaque persistence capability the host platform
//!   provides. We only ever store the *source* (phrase or key), never the
//!   derived identity.
//! - **provider**: the lifecycle: create, import, unlock, lock, reveal.
//!
//! ## Design Decisions
//!
//! - `k256` with RFC-6979 nonces, so signatures are deterministic and the
//!   signing path never touches an RNG.
//! - The unlocked identity is an explicit component (`KeyProvider`) passed
//!   by reference to whoever needs it. No process-wide singleton.

pub mod keys;
pub mod provider;
pub mod secure_store;

pub use keys::{
    address_from_verifying_key, generate_mnemonic, validate_mnemonic, KeyError,
    RecoverableSignature, SigningIdentity,
};
pub use provider::KeyProvider;
pub use secure_store::{InMemorySecureStore, SecureStore};
