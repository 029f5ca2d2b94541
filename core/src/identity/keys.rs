//! # Signing Identities
//!
//! secp256k1 key material for an Ethereum account, derived either from a
//! BIP-39 phrase (via BIP-32 along `m/44'/60'/0'/0/0`) or from a raw 32-byte
//! private key.
//!
//! ## Security considerations
//!
//! - The `k256` signing key zeroizes itself on drop; seeds and hex copies we
//!   create along the way are wrapped in `Zeroizing`.
//! - `SigningIdentity` has no `Serialize` and a redacted `Debug`. The only
//!   way to get the scalar out is [`SigningIdentity::export_private_key`],
//!   and that name is meant to look scary in code review.
//! - Signing is RFC-6979 deterministic. No RNG is consulted at signing time.

use std::fmt;

use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use ethereum_types::Address;
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

use crate::config::{ETH_DERIVATION_PATH, MNEMONIC_ENTROPY_BYTES, PRIVATE_KEY_HEX_LENGTH};
use crate::primitives::keccak256;

/// Errors from key derivation and the key-provider lifecycle.
///
/// Deliberately vague: an error message is a terrible place to echo back
/// the words or bytes that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid mnemonic: unknown word, wrong length, or bad checksum")]
    InvalidMnemonic,

    #[error("invalid private key: expected 64 hex characters encoding a valid scalar")]
    InvalidKeyFormat,

    #[error("key derivation failed")]
    Derivation,

    #[error("signing failed")]
    Signing,

    #[error("wallet is locked")]
    Locked,

    #[error("no wallet has been created or imported")]
    NoWalletStored,
}

/// An ECDSA signature split the way Ethereum transactions carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    /// Big-endian `r` scalar.
    pub r: [u8; 32],
    /// Big-endian `s` scalar, always in the lower half of the curve order.
    pub s: [u8; 32],
    /// Parity of the ephemeral point's `y` (0 or 1).
    pub recovery_id: u8,
}

/// Address + private scalar for the active account.
pub struct SigningIdentity {
    signing_key: SigningKey,
    address: Address,
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

/// Ethereum address of a public key: the last 20 bytes of
/// `keccak256(uncompressed_point[1..])`.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Draws 128 bits from the OS RNG and encodes them as a 12-word English
/// phrase (checksum included).
pub fn generate_mnemonic() -> Result<Zeroizing<String>, KeyError> {
    let mut entropy = [0u8; MNEMONIC_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy(&entropy).map_err(|_| KeyError::Derivation);
    entropy.zeroize();
    Ok(Zeroizing::new(mnemonic?.to_string()))
}

/// Returns `true` if `phrase` is a well-formed English BIP-39 mnemonic.
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, &normalize_phrase(phrase)).is_ok()
}

impl SigningIdentity {
    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = address_from_verifying_key(signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    /// Derives the first Ethereum account of a BIP-39 phrase.
    ///
    /// The phrase is whitespace- and case-normalized first, then checked
    /// against the English wordlist and its checksum. The BIP-39 seed uses
    /// an empty passphrase.
    pub fn from_mnemonic(phrase: &str) -> Result<Self, KeyError> {
        let normalized = Zeroizing::new(normalize_phrase(phrase));
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &normalized)
            .map_err(|_| KeyError::InvalidMnemonic)?;
        let seed = Zeroizing::new(mnemonic.to_seed(""));

        let path: DerivationPath = ETH_DERIVATION_PATH
            .parse()
            .map_err(|_| KeyError::Derivation)?;
        let xprv = XPrv::derive_from_path(&seed[..], &path).map_err(|_| KeyError::Derivation)?;

        Ok(Self::from_signing_key(xprv.private_key().clone()))
    }

    /// Loads a raw private key. An optional `0x` prefix is stripped; what
    /// remains must be exactly 64 hex characters and a valid, non-zero
    /// secp256k1 scalar.
    pub fn from_private_key(key_hex: &str) -> Result<Self, KeyError> {
        let trimmed = key_hex.trim();
        let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if body.len() != PRIVATE_KEY_HEX_LENGTH {
            return Err(KeyError::InvalidKeyFormat);
        }
        let bytes = Zeroizing::new(hex::decode(body).map_err(|_| KeyError::InvalidKeyFormat)?);
        let signing_key = SigningKey::from_slice(&bytes).map_err(|_| KeyError::InvalidKeyFormat)?;
        Ok(Self::from_signing_key(signing_key))
    }

    /// The account address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Signs a 32-byte digest (already Keccak-hashed by the caller).
    pub fn sign_prehash(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, KeyError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|_| KeyError::Signing)?;

        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        Ok(RecoverableSignature {
            r,
            s,
            recovery_id: recovery_id.to_byte(),
        })
    }

    /// Reveals the private scalar as 64 lowercase hex characters.
    ///
    /// **Explicit reveal only.** Do not log the result, do not put it in an
    /// error message, do not keep it around longer than the screen that
    /// shows it.
    pub fn export_private_key(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.signing_key.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{RecoveryId, Signature};

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon \
                           abandon abandon abandon abandon abandon about";

    #[test]
    fn mnemonic_reference_vector() {
        // Widely published vector for the all-"abandon" phrase at m/44'/60'/0'/0/0.
        let id = SigningIdentity::from_mnemonic(ABANDON).unwrap();
        assert_eq!(
            id.address(),
            "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
                .parse::<Address>()
                .unwrap()
        );
        assert_eq!(
            id.export_private_key().as_str(),
            "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
        );
    }

    #[test]
    fn mnemonic_derivation_is_deterministic_and_normalized() {
        let a = SigningIdentity::from_mnemonic(ABANDON).unwrap();
        let b = SigningIdentity::from_mnemonic(&format!("  {}  ", ABANDON.to_uppercase())).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn distinct_mnemonics_give_distinct_addresses() {
        let p1 = generate_mnemonic().unwrap();
        let p2 = generate_mnemonic().unwrap();
        assert_ne!(p1.as_str(), p2.as_str());

        let a = SigningIdentity::from_mnemonic(&p1).unwrap();
        let b = SigningIdentity::from_mnemonic(&p2).unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn generated_mnemonic_has_twelve_valid_words() {
        let phrase = generate_mnemonic().unwrap();
        assert_eq!(phrase.split(' ').count(), 12);
        assert!(validate_mnemonic(&phrase));
    }

    #[test]
    fn bad_checksum_is_rejected() {
        let bad = "abandon ".repeat(12);
        assert!(!validate_mnemonic(&bad));
        assert_eq!(
            SigningIdentity::from_mnemonic(&bad).unwrap_err(),
            KeyError::InvalidMnemonic
        );
    }

    #[test]
    fn unknown_word_is_rejected() {
        let bad = ABANDON.replace("about", "aboutt");
        assert_eq!(
            SigningIdentity::from_mnemonic(&bad).unwrap_err(),
            KeyError::InvalidMnemonic
        );
    }

    #[test]
    fn private_key_reference_vector() {
        // The key/address pair from the web3.js accounts documentation.
        let key = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
        let id = SigningIdentity::from_private_key(key).unwrap();
        assert_eq!(
            id.address(),
            "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
                .parse::<Address>()
                .unwrap()
        );

        let unprefixed = SigningIdentity::from_private_key(&key[2..]).unwrap();
        assert_eq!(unprefixed.address(), id.address());
    }

    #[test]
    fn private_key_format_is_enforced() {
        for bad in [
            "",
            "0x",
            "abcd",
            &"a".repeat(63),
            &"a".repeat(65),
            &"g".repeat(64),
            &"0".repeat(64),
        ] {
            assert_eq!(
                SigningIdentity::from_private_key(bad).unwrap_err(),
                KeyError::InvalidKeyFormat,
                "input {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn signature_recovers_to_address() {
        let id = SigningIdentity::from_mnemonic(ABANDON).unwrap();
        let digest = keccak256(b"replace-by-fee");
        let sig = id.sign_prehash(&digest).unwrap();
        assert!(sig.recovery_id <= 1);

        let mut rs = [0u8; 64];
        rs[..32].copy_from_slice(&sig.r);
        rs[32..].copy_from_slice(&sig.s);
        let signature = Signature::from_slice(&rs).unwrap();
        let recid = RecoveryId::from_byte(sig.recovery_id).unwrap();

        let recovered = VerifyingKey::recover_from_prehash(&digest, &signature, recid).unwrap();
        assert_eq!(address_from_verifying_key(&recovered), id.address());
    }

    #[test]
    fn signing_is_deterministic() {
        let id = SigningIdentity::from_mnemonic(ABANDON).unwrap();
        let digest = keccak256(b"same message");
        assert_eq!(
            id.sign_prehash(&digest).unwrap(),
            id.sign_prehash(&digest).unwrap()
        );
    }

    #[test]
    fn debug_is_redacted() {
        let id = SigningIdentity::from_mnemonic(ABANDON).unwrap();
        let dbg = format!("{id:?}");
        assert!(dbg.contains("<redacted>"));
        assert!(!dbg.contains("1ab42cc4"));
    }
}
