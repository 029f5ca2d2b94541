//! # Token Watchlist
//!
//! The ERC-20 tokens a user has chosen to track, per network. Adding a token
//! that is already listed replaces its metadata. The facade uses the list
//! to label token history entries it did not create itself, such as a
//! speed-up of a token send.

use dashmap::DashMap;
use ethereum_types::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A token the user tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedToken {
    /// Network id the contract lives on.
    pub network: String,
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// In-memory tracked-token list keyed by `(network, contract)`.
#[derive(Debug, Default)]
pub struct TokenWatchlist {
    tokens: DashMap<(String, Address), TrackedToken>,
}

impl TokenWatchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `token`, replacing an entry for the same contract on the same
    /// network.
    pub fn add(&self, token: TrackedToken) {
        debug!(network = %token.network, address = ?token.address, symbol = %token.symbol, "token tracked");
        self.tokens
            .insert((token.network.clone(), token.address), token);
    }

    pub fn get(&self, network: &str, address: &Address) -> Option<TrackedToken> {
        self.tokens
            .get(&(network.to_string(), *address))
            .map(|t| t.value().clone())
    }

    /// Tokens tracked on `network`, ordered by symbol.
    pub fn list(&self, network: &str) -> Vec<TrackedToken> {
        let mut out: Vec<_> = self
            .tokens
            .iter()
            .filter(|t| t.value().network == network)
            .map(|t| t.value().clone())
            .collect();
        out.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        out
    }

    /// Stops tracking a contract. Returns `false` if it was not listed.
    pub fn remove(&self, network: &str, address: &Address) -> bool {
        self.tokens
            .remove(&(network.to_string(), *address))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(network: &str, byte: u8, symbol: &str) -> TrackedToken {
        TrackedToken {
            network: network.into(),
            address: Address::repeat_byte(byte),
            symbol: symbol.into(),
            name: format!("{symbol} Token"),
            decimals: 6,
        }
    }

    #[test]
    fn add_replaces_same_contract() {
        let list = TokenWatchlist::new();
        list.add(token("eth", 1, "USDC"));
        list.add(TrackedToken {
            decimals: 18,
            ..token("eth", 1, "USDC.e")
        });

        assert_eq!(list.len(), 1);
        let stored = list.get("eth", &Address::repeat_byte(1)).unwrap();
        assert_eq!(stored.symbol, "USDC.e");
        assert_eq!(stored.decimals, 18);
    }

    #[test]
    fn list_is_per_network_and_sorted() {
        let list = TokenWatchlist::new();
        list.add(token("eth", 1, "USDT"));
        list.add(token("eth", 2, "DAI"));
        list.add(token("arb", 1, "ARB"));

        let symbols: Vec<_> = list.list("eth").into_iter().map(|t| t.symbol).collect();
        assert_eq!(symbols, vec!["DAI", "USDT"]);
        assert_eq!(list.list("arb").len(), 1);
        assert!(list.list("base").is_empty());
    }

    #[test]
    fn remove_only_touches_one_network() {
        let list = TokenWatchlist::new();
        list.add(token("eth", 1, "USDC"));
        list.add(token("matic", 1, "USDC"));

        assert!(list.remove("eth", &Address::repeat_byte(1)));
        assert!(!list.remove("eth", &Address::repeat_byte(1)));
        assert!(list.get("eth", &Address::repeat_byte(1)).is_none());
        assert!(list.get("matic", &Address::repeat_byte(1)).is_some());
    }
}
