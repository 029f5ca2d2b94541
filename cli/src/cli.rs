//! # CLI Interface
//!
//! Defines the command-line argument structure for `nova-wallet` using
//! `clap` derive. Global flags select the network, logging and timeouts;
//! the signing key comes from the environment, never from a flag.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use nova_wallet_core::config::{
    EngineConfig, BROADCAST_TIMEOUT, CONNECT_TIMEOUT, DEFAULT_NETWORK_ID, READ_TIMEOUT,
};

/// NOVA EVM wallet.
///
/// Builds, prices, signs and broadcasts legacy EIP-155 transactions on the
/// built-in EVM networks, and replaces stuck ones.
#[derive(Parser, Debug)]
#[command(
    name = "nova-wallet",
    about = "NOVA self-custodial EVM wallet",
    version,
    propagate_version = true
)]
pub struct NovaWalletCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Network id (see `nova-wallet networks`).
    #[arg(long, short = 'n', global = true, env = "NOVA_WALLET_NETWORK", default_value = DEFAULT_NETWORK_ID)]
    pub network: String,

    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "NOVA_WALLET_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Default log directive when `RUST_LOG` is unset.
    #[arg(long, global = true, env = "NOVA_WALLET_LOG", default_value = "nova_wallet=info,nova_wallet_core=warn")]
    pub log_level: String,

    /// Per-call timeout for RPC reads, in seconds.
    #[arg(long, global = true, env = "NOVA_WALLET_READ_TIMEOUT", default_value_t = READ_TIMEOUT.as_secs())]
    pub read_timeout: u64,

    /// Timeout for a whole send, broadcast included, in seconds.
    #[arg(long, global = true, env = "NOVA_WALLET_BROADCAST_TIMEOUT", default_value_t = BROADCAST_TIMEOUT.as_secs())]
    pub broadcast_timeout: u64,

    /// TCP/TLS connect timeout, in seconds.
    #[arg(long, global = true, env = "NOVA_WALLET_CONNECT_TIMEOUT", default_value_t = CONNECT_TIMEOUT.as_secs())]
    pub connect_timeout: u64,

    /// BIP-39 phrase of the wallet. Takes precedence over the private key.
    #[arg(long, env = "WALLET_MNEMONIC", hide_env_values = true, hide = true)]
    pub mnemonic: Option<String>,

    /// Hex private key of the wallet.
    #[arg(long, env = "WALLET_PRIVATE_KEY", hide_env_values = true, hide = true)]
    pub private_key: Option<String>,
}

impl NovaWalletCli {
    /// Engine settings assembled from flags and environment.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            read_timeout: Duration::from_secs(self.read_timeout),
            broadcast_timeout: Duration::from_secs(self.broadcast_timeout),
            connect_timeout: Duration::from_secs(self.connect_timeout),
            default_network: self.network.clone(),
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the built-in networks.
    Networks,
    /// Generate a fresh 12-word phrase and print it with its address.
    NewMnemonic,
    /// Print the address of the configured key.
    Address,
    /// Native or ERC-20 balance of the configured key.
    Balance(BalanceArgs),
    /// Send native currency or an ERC-20 token.
    Send(SendArgs),
    /// Replace a pending transaction with a zero-value self-transfer.
    Cancel(ReplaceArgs),
    /// Resubmit a pending transaction at a higher gas price.
    SpeedUp(ReplaceArgs),
    /// Show the receipt of a transaction, if mined.
    Receipt(HashArgs),
}

/// Arguments for `balance`.
#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// ERC-20 contract address. Native balance when omitted.
    #[arg(long)]
    pub token: Option<String>,

    /// Token decimals used to format the result.
    #[arg(long, default_value_t = 18)]
    pub decimals: u8,
}

/// Arguments for `send`.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Recipient address.
    #[arg(long)]
    pub to: String,

    /// Human amount, e.g. `0.25`.
    #[arg(long)]
    pub amount: String,

    /// ERC-20 contract address. Sends native currency when omitted.
    #[arg(long)]
    pub token: Option<String>,

    /// Token decimals used to parse `--amount`.
    #[arg(long, default_value_t = 18, requires = "token")]
    pub decimals: u8,

    /// Label stored in history for token sends.
    #[arg(long, default_value = "TOKEN", requires = "token")]
    pub symbol: String,

    /// Build and sign, print the raw payload, do not broadcast.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `cancel` and `speed-up`.
#[derive(Args, Debug)]
pub struct ReplaceArgs {
    /// Hash of the pending transaction.
    #[arg(long)]
    pub hash: String,

    /// Build and sign, print the raw payload, do not broadcast.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `receipt`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Transaction hash.
    #[arg(long)]
    pub hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        NovaWalletCli::command().debug_assert();
    }

    #[test]
    fn send_flags_parse_into_engine_config() {
        let cli = NovaWalletCli::try_parse_from([
            "nova-wallet",
            "--network",
            "arb",
            "--read-timeout",
            "3",
            "send",
            "--to",
            "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23",
            "--amount",
            "0.1",
            "--dry-run",
        ])
        .unwrap();

        let config = cli.engine_config();
        assert_eq!(config.default_network, "arb");
        assert_eq!(config.read_timeout, Duration::from_secs(3));
        assert_eq!(config.broadcast_timeout, BROADCAST_TIMEOUT);
        match cli.command {
            Commands::Send(args) => {
                assert!(args.dry_run);
                assert!(args.token.is_none());
                assert_eq!(args.decimals, 18);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn decimals_without_token_is_rejected() {
        let parsed = NovaWalletCli::try_parse_from([
            "nova-wallet",
            "send",
            "--to",
            "0x00",
            "--amount",
            "1",
            "--decimals",
            "6",
        ]);
        assert!(parsed.is_err());
    }
}
