//! EIP-155 signing and the inverse: decoding a signed payload and
//! recovering who signed it.
//!
//! Signing is a separate step from building because the build pipeline
//! wants to check the balance against the final fee before any signature
//! exists.

use ethereum_types::{Address, H256, U256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use rlp::{Rlp, RlpStream};

use super::builder::LegacyTransaction;
use super::error::TxError;
use crate::identity::{address_from_verifying_key, SigningIdentity};
use crate::primitives::{encode_hex, keccak256};

/// A broadcast-ready signed transaction. Produced once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    /// RLP bytes as sent to `eth_sendRawTransaction`.
    pub raw: Vec<u8>,
    /// `keccak256(raw)`, the hash the network will know it by.
    pub hash: H256,
}

impl SignedPayload {
    /// `0x`-prefixed hex of [`Self::raw`].
    pub fn to_hex(&self) -> String {
        encode_hex(&self.raw)
    }
}

/// Signs `tx` with `identity`.
///
/// 1. Hash the EIP-155 pre-image.
/// 2. Deterministic ECDSA over the digest (RFC-6979, low-S).
/// 3. `v = recovery_id + chain_id * 2 + 35`.
/// 4. Encode `rlp([nonce, gasPrice, gas, to, value, data, v, r, s])`.
pub fn sign_transaction(
    tx: &LegacyTransaction,
    identity: &SigningIdentity,
) -> Result<SignedPayload, TxError> {
    let digest = tx.signing_hash();
    let signature = identity.sign_prehash(&digest)?;

    let v = tx
        .chain_id
        .checked_mul(2)
        .and_then(|x| x.checked_add(35 + u64::from(signature.recovery_id)))
        .ok_or_else(|| TxError::Signing(format!("chain id {} too large", tx.chain_id)))?;

    let mut stream = RlpStream::new_list(9);
    tx.append_payload(&mut stream);
    stream.append(&v);
    stream.append(&U256::from_big_endian(&signature.r));
    stream.append(&U256::from_big_endian(&signature.s));
    let raw = stream.out().to_vec();

    let hash = H256(keccak256(&raw));
    Ok(SignedPayload { raw, hash })
}

/// A signed payload taken apart again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub transaction: LegacyTransaction,
    /// Address recovered from the signature.
    pub sender: Address,
    pub v: u64,
}

fn malformed(what: impl std::fmt::Display) -> TxError {
    TxError::InvalidInput(format!("malformed signed transaction: {what}"))
}

/// Decodes a signed EIP-155 legacy payload and recovers the sender.
pub fn decode_signed(raw: &[u8]) -> Result<DecodedTransaction, TxError> {
    let rlp = Rlp::new(raw);
    let count = rlp.item_count().map_err(malformed)?;
    if count != 9 {
        return Err(malformed(format!("expected 9 fields, got {count}")));
    }

    let to_item = rlp.at(3).map_err(malformed)?;
    let to = if to_item.is_empty() {
        None
    } else {
        Some(to_item.as_val::<Address>().map_err(malformed)?)
    };

    let v: u64 = rlp.val_at(6).map_err(malformed)?;
    if v < 35 {
        return Err(malformed(format!("pre-EIP-155 v value {v}")));
    }
    let chain_id = (v - 35) / 2;
    let recovery_id = ((v - 35) % 2) as u8;

    let transaction = LegacyTransaction {
        nonce: rlp.val_at(0).map_err(malformed)?,
        gas_price: rlp.val_at(1).map_err(malformed)?,
        gas_limit: rlp.val_at(2).map_err(malformed)?,
        to,
        value: rlp.val_at(4).map_err(malformed)?,
        data: rlp.val_at(5).map_err(malformed)?,
        chain_id,
    };

    let r: U256 = rlp.val_at(7).map_err(malformed)?;
    let s: U256 = rlp.val_at(8).map_err(malformed)?;
    let mut rs = [0u8; 64];
    r.to_big_endian(&mut rs[..32]);
    s.to_big_endian(&mut rs[32..]);

    let signature = Signature::from_slice(&rs).map_err(malformed)?;
    let recid = RecoveryId::from_byte(recovery_id).ok_or_else(|| malformed("recovery id"))?;
    let key = VerifyingKey::recover_from_prehash(&transaction.signing_hash(), &signature, recid)
        .map_err(malformed)?;

    Ok(DecodedTransaction {
        transaction,
        sender: address_from_verifying_key(&key),
        v,
    })
}
