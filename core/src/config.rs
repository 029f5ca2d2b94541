//! # Engine Configuration & Constants
//!
//! Every magic number in the wallet engine lives here. If you're hardcoding
//! a gas constant or a fee multiplier somewhere else, you're doing it wrong
//! and you owe the team coffee.
//!
//! Fee multipliers are exact integer ratios, never floats. `1.15` as an
//! `f64` is `1.149999...` and that missing wei is exactly the kind of thing
//! that gets a replacement transaction rejected as "underpriced".

use std::time::Duration;

use crate::fees::Multiplier;

// ---------------------------------------------------------------------------
// Timeouts
// ---------------------------------------------------------------------------

/// Upper bound for every read-only RPC call (balance, code, nonce, price,
/// estimate, call, lookups). A hung endpoint must not hang the caller.
pub const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Upper bound for a full build-sign-broadcast operation, and for the
/// `eth_sendRawTransaction` call itself.
pub const BROADCAST_TIMEOUT: Duration = Duration::from_secs(60);

/// TCP/TLS connect timeout for pooled HTTP clients.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Gas Constants
// ---------------------------------------------------------------------------

/// Intrinsic gas of a plain value transfer. Also the floor for every gas
/// limit we ever sign, and the fixed limit of a cancellation.
pub const PLAIN_TRANSFER_GAS: u64 = 21_000;

/// Fallback base estimate for contract calls and token transfers when
/// `eth_estimateGas` fails. Generous enough for an ERC-20 `transfer`.
pub const CONTRACT_FALLBACK_GAS: u64 = 100_000;

// ---------------------------------------------------------------------------
// Fee Multipliers
// ---------------------------------------------------------------------------

/// Polygon priority surcharge applied to the node's gas price (×1.25).
pub const POLYGON_PRIORITY_MULTIPLIER: Multiplier = Multiplier::new(125, 100);

/// Arbitrum gas-limit buffer (×2.0). The node's estimate does not cover the
/// L1 calldata posting cost, so we double it.
pub const ARBITRUM_L1_BUFFER: Multiplier = Multiplier::new(2, 1);

/// Gas-limit buffer for contract destinations and token transfers (×1.30).
pub const CONTRACT_BUFFER: Multiplier = Multiplier::new(130, 100);

/// Gas-limit buffer for plain transfers to externally-owned accounts (×1.10).
pub const PLAIN_TRANSFER_BUFFER: Multiplier = Multiplier::new(110, 100);

/// Minimum bump over the original gas price for a cancel or speed-up (×1.15).
/// Most clients refuse a same-nonce replacement below +10%; we go a bit above.
pub const REPLACEMENT_PRICE_BUMP: Multiplier = Multiplier::new(115, 100);

/// Speed-up fallback over the original gas limit when re-estimation fails (×1.2).
pub const SPEED_UP_LIMIT_FALLBACK: Multiplier = Multiplier::new(120, 100);

// ---------------------------------------------------------------------------
// Key Derivation
// ---------------------------------------------------------------------------

/// BIP-44 path for the first Ethereum account: purpose 44', coin 60',
/// account 0', external chain, index 0.
pub const ETH_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Entropy drawn for a freshly generated mnemonic. 16 bytes = 128 bits,
/// which encodes to 12 words including the checksum.
pub const MNEMONIC_ENTROPY_BYTES: usize = 16;

/// Length of a raw secp256k1 private key in hex characters (32 bytes).
pub const PRIVATE_KEY_HEX_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Networks
// ---------------------------------------------------------------------------

/// Network used when nothing else has been selected, and the fallback for
/// lookups by an unknown id.
pub const DEFAULT_NETWORK_ID: &str = "eth";

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Runtime knobs for the engine. Defaults mirror the constants above; the
/// CLI overrides them from flags and environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Timeout for each read-only RPC call.
    pub read_timeout: Duration,
    /// Timeout for a full send operation, including the broadcast itself.
    pub broadcast_timeout: Duration,
    /// Connect timeout for new HTTP connections.
    pub connect_timeout: Duration,
    /// Network id selected at startup.
    pub default_network: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            read_timeout: READ_TIMEOUT,
            broadcast_timeout: BROADCAST_TIMEOUT,
            connect_timeout: CONNECT_TIMEOUT,
            default_network: DEFAULT_NETWORK_ID.to_string(),
        }
    }
}
