//! Static table of supported EVM networks and the active-network selector.
//!
//! Lookups never fail: an unknown id resolves to the default network. A bad
//! id coming back from persisted settings should not be able to crash a
//! balance refresh.

use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DEFAULT_NETWORK_ID;

// ---------------------------------------------------------------------------
// FeeModel
// ---------------------------------------------------------------------------

/// How a network prices gas. Drives both the gas-price multiplier and the
/// gas-limit buffer in [`crate::fees`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeModel {
    /// Plain legacy pricing: the node's gas price is what we pay.
    Standard,
    /// Arbitrum: L2 execution plus L1 calldata posting, which the node's
    /// estimate under-reports.
    ArbitrumL1,
    /// Polygon: validators expect a priority surcharge on top of the quote.
    PolygonPriority,
}

impl fmt::Display for FeeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "Standard"),
            Self::ArbitrumL1 => write!(f, "ArbitrumL1"),
            Self::PolygonPriority => write!(f, "PolygonPriority"),
        }
    }
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// An EVM network the wallet can talk to. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Short stable identifier (`"eth"`, `"arb"`, ...).
    pub id: String,
    /// Name shown to humans.
    pub display_name: String,
    /// JSON-RPC HTTP endpoint.
    pub rpc_endpoint: String,
    /// EIP-155 chain id, baked into every signature.
    pub chain_id: u64,
    /// Ticker of the native asset.
    pub native_symbol: String,
    /// Fee model tag.
    pub fee_model: FeeModel,
    /// Block explorer base URL.
    pub explorer_url: String,
    /// Market-data identifier for the native asset.
    pub price_id: String,
}

impl Network {
    #[allow(clippy::too_many_arguments)]
    fn builtin(
        id: &str,
        display_name: &str,
        rpc_endpoint: &str,
        chain_id: u64,
        native_symbol: &str,
        fee_model: FeeModel,
        explorer_url: &str,
        price_id: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            rpc_endpoint: rpc_endpoint.to_string(),
            chain_id,
            native_symbol: native_symbol.to_string(),
            fee_model,
            explorer_url: explorer_url.to_string(),
            price_id: price_id.to_string(),
        }
    }

    /// Explorer link for a transaction hash.
    pub fn explorer_tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), hash)
    }
}

/// The networks shipped with the wallet.
pub fn builtin_networks() -> Vec<Network> {
    vec![
        Network::builtin(
            "eth",
            "Ethereum",
            "https://eth.llamarpc.com",
            1,
            "ETH",
            FeeModel::Standard,
            "https://etherscan.io",
            "ethereum",
        ),
        Network::builtin(
            "bsc",
            "BNB Chain",
            "https://binance.llamarpc.com",
            56,
            "BNB",
            FeeModel::Standard,
            "https://bscscan.com",
            "binancecoin",
        ),
        Network::builtin(
            "matic",
            "Polygon",
            "https://polygon.llamarpc.com",
            137,
            "POL",
            FeeModel::PolygonPriority,
            "https://polygonscan.com",
            "matic-network",
        ),
        Network::builtin(
            "base",
            "Base",
            "https://base.llamarpc.com",
            8453,
            "ETH",
            FeeModel::Standard,
            "https://basescan.org",
            "ethereum",
        ),
        Network::builtin(
            "arb",
            "Arbitrum",
            "https://arbitrum.llamarpc.com",
            42161,
            "ETH",
            FeeModel::ArbitrumL1,
            "https://arbiscan.io",
            "ethereum",
        ),
        Network::builtin(
            "op",
            "Optimism",
            "https://optimism.llamarpc.com",
            10,
            "ETH",
            FeeModel::Standard,
            "https://optimistic.etherscan.io",
            "ethereum",
        ),
    ]
}

// ---------------------------------------------------------------------------
// NetworkRegistry
// ---------------------------------------------------------------------------

/// Errors from building a custom registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("network table is empty")]
    Empty,

    #[error("default network `{0}` is not in the table")]
    UnknownDefault(String),
}

/// Lookup table plus the "active network" selector.
///
/// The table itself is immutable; only the selector changes, behind a
/// `parking_lot::RwLock` so readers on other tasks never block for long.
#[derive(Debug)]
pub struct NetworkRegistry {
    networks: Vec<Network>,
    default_id: String,
    active_id: RwLock<String>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkRegistry {
    /// Registry over the built-in table, defaulting to Ethereum mainnet.
    pub fn new() -> Self {
        Self {
            networks: builtin_networks(),
            default_id: DEFAULT_NETWORK_ID.to_string(),
            active_id: RwLock::new(DEFAULT_NETWORK_ID.to_string()),
        }
    }

    /// Registry over a custom table. The default must be part of it.
    pub fn with_networks(networks: Vec<Network>, default_id: &str) -> Result<Self, RegistryError> {
        if networks.is_empty() {
            return Err(RegistryError::Empty);
        }
        if !networks.iter().any(|n| n.id == default_id) {
            return Err(RegistryError::UnknownDefault(default_id.to_string()));
        }
        Ok(Self {
            networks,
            default_id: default_id.to_string(),
            active_id: RwLock::new(default_id.to_string()),
        })
    }

    /// All registered networks in table order.
    pub fn list(&self) -> &[Network] {
        &self.networks
    }

    /// Returns `true` if `id` names a registered network.
    pub fn contains(&self, id: &str) -> bool {
        self.networks.iter().any(|n| n.id == id)
    }

    /// The fallback network.
    pub fn default_network(&self) -> &Network {
        self.networks
            .iter()
            .find(|n| n.id == self.default_id)
            .unwrap_or(&self.networks[0])
    }

    /// Looks up a network by id, falling back to the default when unknown.
    pub fn get(&self, id: &str) -> &Network {
        self.networks
            .iter()
            .find(|n| n.id == id)
            .unwrap_or_else(|| self.default_network())
    }

    /// Selects the active network. Unknown ids are stored as-is and resolve
    /// to the default on read; the return value tells the caller whether
    /// the id was recognized.
    pub fn set_active(&self, id: &str) -> bool {
        *self.active_id.write() = id.to_string();
        let known = self.contains(id);
        if !known {
            tracing::warn!(network = id, "unknown network selected, falling back to default");
        }
        known
    }

    /// The currently active network.
    pub fn active(&self) -> &Network {
        let id = self.active_id.read().clone();
        self.get(&id)
    }
}
