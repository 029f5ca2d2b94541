//! # Primitive Parsing & Formatting
//!
//! Addresses, hashes, hex blobs and human-readable amounts. Everything that
//! crosses the boundary between "string the user typed" and "typed value the
//! engine trusts" goes through here, so validation happens exactly once and
//! before any I/O.

use ethereum_types::{Address, H256, U256};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Errors produced while parsing user-supplied primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),

    #[error("invalid hex data: {0}")]
    InvalidHex(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Keccak-256, the hash Ethereum uses for everything (not NIST SHA3-256).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parses a 20-byte address. The `0x` prefix is optional; checksum casing
/// is accepted but not enforced.
pub fn parse_address(input: &str) -> Result<Address, ParseError> {
    let trimmed = input.trim();
    let body = strip_hex_prefix(trimmed);
    if body.len() != 40 {
        return Err(ParseError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            body.len()
        )));
    }
    let bytes = hex::decode(body).map_err(|e| ParseError::InvalidAddress(e.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

/// Parses a 32-byte transaction hash (`0x` optional).
pub fn parse_tx_hash(input: &str) -> Result<H256, ParseError> {
    let body = strip_hex_prefix(input.trim());
    if body.len() != 64 {
        return Err(ParseError::InvalidHash(format!(
            "expected 64 hex characters, got {}",
            body.len()
        )));
    }
    let bytes = hex::decode(body).map_err(|e| ParseError::InvalidHash(e.to_string()))?;
    Ok(H256::from_slice(&bytes))
}

/// Decodes a `0x`-prefixed (or bare) hex blob. `"0x"` and `""` are empty.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, ParseError> {
    hex::decode(strip_hex_prefix(input.trim())).map_err(|e| ParseError::InvalidHex(e.to_string()))
}

/// Encodes bytes as a `0x`-prefixed lowercase hex string.
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Renders an address in EIP-55 mixed-case checksum form.
pub fn to_checksum(address: &Address) -> String {
    let lower = hex::encode(address.as_bytes());
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Converts a decimal string such as `"1.5"` into base units with the given
/// number of decimals (`18` for ether). No floating point is involved.
pub fn parse_units(input: &str, decimals: u8) -> Result<U256, ParseError> {
    let s = input.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(ParseError::InvalidAmount("empty amount".into()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::InvalidAmount(format!("not a decimal number: {s}")));
    }
    if frac.len() > decimals as usize {
        return Err(ParseError::InvalidAmount(format!(
            "more than {decimals} decimal places: {s}"
        )));
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(if whole.is_empty() { "0" } else { whole });
    digits.push_str(frac);
    digits.extend(std::iter::repeat('0').take(decimals as usize - frac.len()));

    U256::from_dec_str(&digits).map_err(|_| ParseError::InvalidAmount(format!("out of range: {s}")))
}

/// Formats base units as a decimal string, trimming trailing zeros.
/// `format_units(1_500_000_000_000_000_000, 18) == "1.5"`.
pub fn format_units(value: U256, decimals: u8) -> String {
    let decimals = decimals as usize;
    let raw = value.to_string();
    if decimals == 0 {
        return raw;
    }

    let padded = if raw.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - raw.len()), raw)
    } else {
        raw
    };
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}
