//! Legacy transaction assembly via the builder pattern.
//!
//! The [`TransactionBuilder`] collects the six fields every Ethereum
//! transaction carries plus the chain id, and yields an unsigned
//! [`LegacyTransaction`]. Signing happens in [`super::signing`], which keeps
//! construction testable without key material.

use ethereum_types::{Address, U256};
use rlp::RlpStream;

use crate::fees::FeeQuote;
use crate::primitives::keccak256;

// ---------------------------------------------------------------------------
// LegacyTransaction
// ---------------------------------------------------------------------------

/// An unsigned pre-EIP-2718 transaction, replay-protected with EIP-155.
///
/// # Signing pre-image
///
/// `rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])`. The
/// Keccak-256 of that list is what gets signed. Binding the chain id into
/// the hash means a payload signed for Polygon is worthless on mainnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    /// `None` deploys a contract.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl LegacyTransaction {
    /// Appends the six payload fields shared by the pre-image and the
    /// signed encoding.
    pub(crate) fn append_payload(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price);
        stream.append(&self.gas_limit);
        match &self.to {
            Some(to) => stream.append(to),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value);
        stream.append(&self.data);
    }

    /// RLP bytes of the EIP-155 signing pre-image.
    pub fn signing_preimage(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(9);
        self.append_payload(&mut stream);
        stream.append(&self.chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        stream.out().to_vec()
    }

    /// Digest that gets signed.
    pub fn signing_hash(&self) -> [u8; 32] {
        keccak256(&self.signing_preimage())
    }

    /// `gas_limit * gas_price + value`, or `None` on overflow.
    pub fn max_cost(&self) -> Option<U256> {
        FeeQuote::new(self.gas_price, self.gas_limit).total_cost(self.value)
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`LegacyTransaction`].
///
/// Unset numeric fields default to zero and `to` defaults to `None`; the
/// transaction service always sets all of them explicitly.
///
/// ```rust
/// use ethereum_types::{Address, U256};
/// use nova_wallet_core::transaction::TransactionBuilder;
///
/// let tx = TransactionBuilder::new(1)
///     .nonce(9)
///     .gas_price(U256::from(20_000_000_000u64))
///     .gas_limit(21_000)
///     .to(Address::repeat_byte(0x35))
///     .value(U256::from(1_000_000_000_000_000_000u64))
///     .build();
/// assert_eq!(tx.chain_id, 1);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    chain_id: u64,
    nonce: u64,
    gas_price: U256,
    gas_limit: u64,
    to: Option<Address>,
    value: U256,
    data: Vec<u8>,
}

impl TransactionBuilder {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            nonce: 0,
            gas_price: U256::zero(),
            gas_limit: 0,
            to: None,
            value: U256::zero(),
            data: Vec::new(),
        }
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn gas_price(mut self, gas_price: U256) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Sets both price and limit from a fee quote.
    pub fn fee(self, fee: FeeQuote) -> Self {
        self.gas_price(fee.gas_price).gas_limit(fee.gas_limit)
    }

    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn build(self) -> LegacyTransaction {
        LegacyTransaction {
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: self.to,
            value: self.value,
            data: self.data,
            chain_id: self.chain_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The worked example from EIP-155.
    fn eip155_example() -> LegacyTransaction {
        TransactionBuilder::new(1)
            .nonce(9)
            .gas_price(U256::from(20_000_000_000u64))
            .gas_limit(21_000)
            .to(Address::repeat_byte(0x35))
            .value(U256::from(1_000_000_000_000_000_000u64))
            .build()
    }

    #[test]
    fn eip155_preimage_matches_reference() {
        assert_eq!(
            hex::encode(eip155_example().signing_preimage()),
            "ec098504a817c800825208943535353535353535353535353535353535353535\
             880de0b6b3a764000080018080"
        );
    }

    #[test]
    fn eip155_signing_hash_matches_reference() {
        assert_eq!(
            hex::encode(eip155_example().signing_hash()),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn chain_id_changes_the_hash() {
        let mainnet = eip155_example();
        let mut polygon = mainnet.clone();
        polygon.chain_id = 137;
        assert_ne!(mainnet.signing_hash(), polygon.signing_hash());
    }

    #[test]
    fn contract_creation_encodes_empty_to() {
        let tx = TransactionBuilder::new(1).gas_limit(53_000).data(vec![0x60, 0x80]).build();
        let rlp = rlp::Rlp::new(&tx.signing_preimage()).at(3).unwrap().as_raw().to_vec();
        assert_eq!(rlp, vec![0x80]);
    }

    #[test]
    fn fee_sets_price_and_limit() {
        let tx = TransactionBuilder::new(10)
            .fee(FeeQuote::new(U256::from(3), 23_100))
            .value(U256::from(4))
            .build();
        assert_eq!(tx.gas_price, U256::from(3));
        assert_eq!(tx.gas_limit, 23_100);
        assert_eq!(tx.max_cost(), Some(U256::from(69_304)));
    }
}
