//! The secure-storage capability the key provider is built on.
//!
//! Real deployments back this with an OS keystore or encrypted preferences.
//! The engine only needs opaque get/set of two strings and an existence
//! check, so that is all the trait asks for.

use std::fmt;

use parking_lot::RwLock;
use zeroize::Zeroizing;

/// Opaque persistence for the wallet's key source.
///
/// Implementations must be safe to share across tasks. Values handed out
/// are wrapped in [`Zeroizing`] so they are wiped when the caller drops them.
pub trait SecureStore: Send + Sync {
    /// The stored BIP-39 phrase, if any.
    fn mnemonic(&self) -> Option<Zeroizing<String>>;

    /// Persists a BIP-39 phrase.
    fn set_mnemonic(&self, phrase: &str);

    /// The stored raw private key (64 hex chars, no prefix), if any.
    fn private_key(&self) -> Option<Zeroizing<String>>;

    /// Persists a raw private key.
    fn set_private_key(&self, key_hex: &str);

    /// Returns `true` if either key source is present.
    fn has_wallet(&self) -> bool;

    /// Wipes every stored secret.
    fn clear(&self);
}

/// Process-local [`SecureStore`]. Nothing touches disk.
///
/// Used by the CLI (which is handed its key through the environment) and
/// by tests.
#[derive(Default)]
pub struct InMemorySecureStore {
    mnemonic: RwLock<Option<Zeroizing<String>>>,
    private_key: RwLock<Option<Zeroizing<String>>>,
}

impl InMemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for InMemorySecureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySecureStore")
            .field("has_mnemonic", &self.mnemonic.read().is_some())
            .field("has_private_key", &self.private_key.read().is_some())
            .finish()
    }
}

impl SecureStore for InMemorySecureStore {
    fn mnemonic(&self) -> Option<Zeroizing<String>> {
        self.mnemonic.read().clone()
    }

    fn set_mnemonic(&self, phrase: &str) {
        *self.mnemonic.write() = Some(Zeroizing::new(phrase.to_string()));
    }

    fn private_key(&self) -> Option<Zeroizing<String>> {
        self.private_key.read().clone()
    }

    fn set_private_key(&self, key_hex: &str) {
        *self.private_key.write() = Some(Zeroizing::new(key_hex.to_string()));
    }

    fn has_wallet(&self) -> bool {
        self.mnemonic.read().is_some() || self.private_key.read().is_some()
    }

    fn clear(&self) {
        *self.mnemonic.write() = None;
        *self.private_key.write() = None;
    }
}
