// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NOVA Wallet CLI
//!
//! Entry point for the `nova-wallet` binary. Parses arguments, initializes
//! logging, loads the key from the environment and runs one command
//! against the selected network.
//!
//! - `networks`: list built-in networks
//! - `new-mnemonic`: generate a phrase (nothing is stored)
//! - `address`: print the configured address
//! - `balance`: native or ERC-20 balance
//! - `send`: native or ERC-20 transfer, optionally dry-run
//! - `cancel`: replace a pending transaction with a no-op
//! - `speed-up`: resubmit a pending transaction at a higher price
//! - `receipt`: print a transaction receipt

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;

use nova_wallet_core::config::EngineConfig;
use nova_wallet_core::history::InMemoryHistory;
use nova_wallet_core::identity::{generate_mnemonic, InMemorySecureStore, SigningIdentity};
use nova_wallet_core::network::NetworkRegistry;
use nova_wallet_core::primitives::{
    format_units, parse_address, parse_tx_hash, parse_units, to_checksum,
};
use nova_wallet_core::transaction::{SignedPayload, SubmittedTransaction};
use nova_wallet_core::Wallet;

use cli::{BalanceArgs, Commands, HashArgs, NovaWalletCli, ReplaceArgs, SendArgs};
use logging::LogFormat;

type CliWallet = Wallet<InMemorySecureStore, InMemoryHistory>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = NovaWalletCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    match &cli.command {
        Commands::Networks => {
            list_networks();
            Ok(())
        }
        Commands::NewMnemonic => new_mnemonic(),
        Commands::Address => {
            let wallet = open_wallet(&cli)?;
            let address = wallet.keys().address().context("wallet is locked")?;
            println!("{}", to_checksum(&address));
            Ok(())
        }
        Commands::Balance(args) => balance(&open_wallet(&cli)?, args).await,
        Commands::Send(args) => send(&open_wallet(&cli)?, args).await,
        Commands::Cancel(args) => replace(&open_wallet(&cli)?, args, false).await,
        Commands::SpeedUp(args) => replace(&open_wallet(&cli)?, args, true).await,
        Commands::Receipt(args) => receipt(&open_wallet(&cli)?, args).await,
    }
}

/// Builds the wallet for the selected network and unlocks the key found in
/// the environment. The phrase wins when both are set.
fn open_wallet(cli: &NovaWalletCli) -> Result<CliWallet> {
    let config: EngineConfig = cli.engine_config();
    if !NetworkRegistry::new().contains(&config.default_network) {
        bail!(
            "unknown network '{}' (see `nova-wallet networks`)",
            config.default_network
        );
    }

    let wallet = Wallet::new(InMemorySecureStore::new(), InMemoryHistory::new(), config);
    let address = if let Some(phrase) = cli.mnemonic.as_deref() {
        wallet
            .keys()
            .import_mnemonic(phrase)
            .context("WALLET_MNEMONIC is not a valid phrase")?
    } else if let Some(key) = cli.private_key.as_deref() {
        wallet
            .keys()
            .import_private_key(key)
            .context("WALLET_PRIVATE_KEY is not a valid key")?
    } else {
        bail!("no key configured: set WALLET_MNEMONIC or WALLET_PRIVATE_KEY");
    };

    let network = wallet.networks().active();
    tracing::info!(address = %to_checksum(&address), network = %network.id, "wallet ready");
    Ok(wallet)
}

fn list_networks() {
    let registry = NetworkRegistry::new();
    println!("{:<6} {:<10} {:>8} {:<6} {:<16}", "ID", "NAME", "CHAIN", "ASSET", "FEE MODEL");
    for network in registry.list() {
        println!(
            "{:<6} {:<10} {:>8} {:<6} {:<16}",
            network.id,
            network.display_name,
            network.chain_id,
            network.native_symbol,
            network.fee_model.to_string(),
        );
    }
}

fn new_mnemonic() -> Result<()> {
    let phrase = generate_mnemonic().context("failed to generate mnemonic")?;
    let identity = SigningIdentity::from_mnemonic(&phrase).context("failed to derive key")?;
    println!("{}", phrase.as_str());
    println!("address: {}", to_checksum(&identity.address()));
    Ok(())
}

async fn balance(wallet: &CliWallet, args: &BalanceArgs) -> Result<()> {
    match &args.token {
        Some(token) => {
            let token = parse_address(token).context("invalid --token")?;
            let amount = wallet.token_balance(token).await?;
            println!("{}", format_units(amount, args.decimals));
        }
        None => {
            let amount = wallet.native_balance().await?;
            let symbol = &wallet.networks().active().native_symbol;
            println!("{} {}", format_units(amount, 18), symbol);
        }
    }
    Ok(())
}

async fn send(wallet: &CliWallet, args: &SendArgs) -> Result<()> {
    let to = parse_address(&args.to).context("invalid --to")?;

    match &args.token {
        Some(token) => {
            let token = parse_address(token).context("invalid --token")?;
            let amount = parse_units(&args.amount, args.decimals).context("invalid --amount")?;
            if args.dry_run {
                let payload = wallet.service()?.prepare_token(token, to, amount).await?;
                print_payload(&payload);
            } else {
                let submitted = wallet.send_token(token, to, amount, &args.symbol).await?;
                print_submitted(wallet, &submitted);
            }
        }
        None => {
            let value = parse_units(&args.amount, 18).context("invalid --amount")?;
            if args.dry_run {
                let payload = wallet.service()?.prepare_native(to, value).await?;
                print_payload(&payload);
            } else {
                let submitted = wallet.send_native(to, value).await?;
                print_submitted(wallet, &submitted);
            }
        }
    }
    Ok(())
}

async fn replace(wallet: &CliWallet, args: &ReplaceArgs, speed_up: bool) -> Result<()> {
    let hash = parse_tx_hash(&args.hash).context("invalid --hash")?;

    if args.dry_run {
        let service = wallet.service()?;
        let payload = if speed_up {
            service.prepare_speed_up(hash).await?
        } else {
            service.prepare_cancel(hash).await?
        };
        print_payload(&payload);
        return Ok(());
    }

    let submitted = if speed_up {
        wallet.speed_up(hash).await?
    } else {
        wallet.cancel(hash).await?
    };
    print_submitted(wallet, &submitted);
    Ok(())
}

async fn receipt(wallet: &CliWallet, args: &HashArgs) -> Result<()> {
    let hash = parse_tx_hash(&args.hash).context("invalid --hash")?;
    match wallet.client()?.get_receipt(hash).await {
        Some(receipt) => println!("{}", serde_json::to_string_pretty(&receipt)?),
        None => println!("no receipt yet (pending, dropped or unknown)"),
    }
    Ok(())
}

fn print_payload(payload: &SignedPayload) {
    println!("hash: {:?}", payload.hash);
    println!("raw:  {}", payload.to_hex());
}

fn print_submitted(wallet: &CliWallet, submitted: &SubmittedTransaction) {
    let network = wallet.networks().active();
    let hash = format!("{:?}", submitted.hash);
    println!("{} submitted", submitted.kind);
    println!("  hash      : {hash}");
    println!("  nonce     : {}", submitted.nonce);
    println!("  gas price : {} gwei", format_units(submitted.fee.gas_price, 9));
    println!("  gas limit : {}", submitted.fee.gas_limit);
    println!("  explorer  : {}", network.explorer_tx_url(&hash));
}
