//! Wallet lifecycle around a [`SecureStore`]: create, import, unlock, lock.
//!
//! The derived [`SigningIdentity`] lives only in memory, behind an
//! `Arc` so in-flight builds keep a handle even if the wallet locks
//! mid-operation. Locking drops the provider's handle; the key is wiped
//! when the last build finishes with it.

use std::sync::Arc;

use ethereum_types::Address;
use parking_lot::RwLock;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::keys::{generate_mnemonic, KeyError, SigningIdentity};
use super::secure_store::SecureStore;

/// Owns the key source (through the store) and the unlocked identity.
pub struct KeyProvider<S> {
    store: S,
    active: RwLock<Option<Arc<SigningIdentity>>>,
}

impl<S: SecureStore> KeyProvider<S> {
    /// Wraps a store. Starts locked even if the store holds a wallet.
    pub fn new(store: S) -> Self {
        Self {
            store,
            active: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn install(&self, identity: SigningIdentity) -> Address {
        let address = identity.address();
        *self.active.write() = Some(Arc::new(identity));
        address
    }

    /// Generates a fresh 12-word wallet, persists it and unlocks it.
    /// Any previously stored key source is replaced.
    ///
    /// The phrase is returned once so it can be shown for backup.
    pub fn create_wallet(&self) -> Result<Zeroizing<String>, KeyError> {
        let phrase = generate_mnemonic()?;
        let identity = SigningIdentity::from_mnemonic(&phrase)?;

        self.store.clear();
        self.store.set_mnemonic(&phrase);
        let address = self.install(identity);
        info!(%address, "created new wallet");
        Ok(phrase)
    }

    /// Validates and stores a phrase, then unlocks it.
    pub fn import_mnemonic(&self, phrase: &str) -> Result<Address, KeyError> {
        let identity = SigningIdentity::from_mnemonic(phrase)?;
        let normalized = Zeroizing::new(phrase.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase());

        self.store.clear();
        self.store.set_mnemonic(&normalized);
        let address = self.install(identity);
        info!(%address, source = "mnemonic", "imported wallet");
        Ok(address)
    }

    /// Validates and stores a raw private key, then unlocks it.
    pub fn import_private_key(&self, key_hex: &str) -> Result<Address, KeyError> {
        let identity = SigningIdentity::from_private_key(key_hex)?;
        let trimmed = key_hex.trim();
        let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        self.store.clear();
        self.store.set_private_key(&body.to_lowercase());
        let address = self.install(identity);
        info!(%address, source = "private_key", "imported wallet");
        Ok(address)
    }

    /// Re-derives the identity from whatever the store holds. The mnemonic
    /// wins when both sources are present.
    pub fn unlock(&self) -> Result<Address, KeyError> {
        let identity = if let Some(phrase) = self.store.mnemonic() {
            SigningIdentity::from_mnemonic(&phrase)?
        } else if let Some(key) = self.store.private_key() {
            SigningIdentity::from_private_key(&key)?
        } else {
            return Err(KeyError::NoWalletStored);
        };
        let address = self.install(identity);
        debug!(%address, "wallet unlocked");
        Ok(address)
    }

    /// Drops the cached identity. The stored source is untouched.
    pub fn lock(&self) {
        if self.active.write().take().is_some() {
            debug!("wallet locked");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.active.read().is_some()
    }

    /// Handle to the unlocked identity, or `Locked`.
    pub fn active_identity(&self) -> Result<Arc<SigningIdentity>, KeyError> {
        self.active.read().clone().ok_or(KeyError::Locked)
    }

    /// Address of the unlocked identity. `None` before anything is loaded.
    pub fn address(&self) -> Option<Address> {
        self.active.read().as_ref().map(|id| id.address())
    }

    /// Explicit reveal of the active private key (hex, no prefix).
    pub fn export_private_key(&self) -> Result<Zeroizing<String>, KeyError> {
        Ok(self.active_identity()?.export_private_key())
    }

    /// Explicit reveal of the stored phrase. Requires an unlocked wallet;
    /// fails with `NoWalletStored` if the wallet was imported from a raw key.
    pub fn export_mnemonic(&self) -> Result<Zeroizing<String>, KeyError> {
        if !self.is_unlocked() {
            return Err(KeyError::Locked);
        }
        self.store.mnemonic().ok_or(KeyError::NoWalletStored)
    }
}
