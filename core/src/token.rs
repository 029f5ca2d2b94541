//! # Token Call Encoder
//!
//! Just enough ERC-20 ABI to read a balance and move tokens. Two selectors,
//! one return type. Pulling in a full ABI crate for `balanceOf` and
//! `transfer` would be bringing a forklift to carry a sandwich.
//!
//! Layout reminder: 4-byte selector, then each argument left-padded to a
//! 32-byte word, big-endian.

use ethereum_types::{Address, U256};
use thiserror::Error;

/// `keccak256("balanceOf(address)")[..4]`
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// `keccak256("transfer(address,uint256)")[..4]`
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

const WORD: usize = 32;

/// Errors decoding ABI data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("invalid hex in call result: {0}")]
    InvalidHex(String),

    #[error("malformed call data: {0}")]
    Malformed(String),
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn uint_word(value: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    value.to_big_endian(&mut word);
    word
}

/// `balanceOf(owner)` call data (36 bytes).
pub fn encode_balance_of(owner: &Address) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&BALANCE_OF_SELECTOR);
    data.extend_from_slice(&address_word(owner));
    data
}

/// `transfer(to, amount)` call data (68 bytes).
pub fn encode_transfer(to: &Address, amount: U256) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 2 * WORD);
    data.extend_from_slice(&TRANSFER_SELECTOR);
    data.extend_from_slice(&address_word(to));
    data.extend_from_slice(&uint_word(amount));
    data
}

/// Returns `true` if `data` starts with the `transfer` selector.
pub fn is_transfer_call(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == TRANSFER_SELECTOR
}

/// Inverse of [`encode_transfer`]. Checks selector, length, and that the
/// address word has no bits set above the low 20 bytes.
pub fn decode_transfer(data: &[u8]) -> Result<(Address, U256), AbiError> {
    if data.len() != 4 + 2 * WORD {
        return Err(AbiError::Malformed(format!(
            "transfer call data must be 68 bytes, got {}",
            data.len()
        )));
    }
    if !is_transfer_call(data) {
        return Err(AbiError::Malformed(format!(
            "unexpected selector 0x{}",
            hex::encode(&data[..4])
        )));
    }

    let address_word = &data[4..4 + WORD];
    if address_word[..12].iter().any(|b| *b != 0) {
        return Err(AbiError::Malformed("address word has dirty high bytes".into()));
    }
    let to = Address::from_slice(&address_word[12..]);
    let amount = U256::from_big_endian(&data[4 + WORD..]);
    Ok((to, amount))
}

/// Decodes a single `uint256` from an `eth_call` result.
///
/// - `""` and `"0x"` decode to zero (empty return, e.g. a call to an EOA).
/// - Shorter than one word: parsed as a plain big-endian hex integer.
/// - Longer than one word: the first word is the value.
pub fn decode_uint256(result_hex: &str) -> Result<U256, AbiError> {
    let trimmed = result_hex.trim();
    let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if body.is_empty() {
        return Ok(U256::zero());
    }
    if !body.is_ascii() {
        return Err(AbiError::InvalidHex("non-ascii call result".into()));
    }
    let word = if body.len() > 2 * WORD {
        &body[..2 * WORD]
    } else {
        body
    };
    U256::from_str_radix(word, 16).map_err(|e| AbiError::InvalidHex(format!("{e:?}")))
}
