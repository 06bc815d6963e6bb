// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Weave CLI
//!
//! Entry point for the `weave` binary. Parses CLI arguments, initializes
//! logging, loads the wallet when a command needs one, and talks to a
//! gateway (or to an in-memory ledger with `--offline`).
//!
//! Results go to stdout; logs go to stderr.

mod cli;
mod logging;
mod wallet;

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;

use weave_protocol::config::GatewayConfig;
use weave_protocol::crypto::{Address, KeyMaterial};
use weave_protocol::network::{create_transaction, HttpGateway, MemoryGateway, NetworkGateway};
use weave_protocol::transaction::{verify_transaction, Transaction, TransactionBuilder};

use cli::{Commands, GlobalArgs, WeaveCli};

/// Starting balance of the wallet in an `--offline` ledger (one AR).
const OFFLINE_BALANCE: u128 = 1_000_000_000_000;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = WeaveCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.global.log_format);

    let global = &cli.global;
    match cli.command {
        Commands::Generate(args) => generate(args),
        Commands::Address => {
            let key = load_key(global)?;
            println!("{}", key.address());
            Ok(())
        }
        Commands::Sign(args) => sign(global, args).await,
        Commands::Verify(args) => verify(&args.file),
        Commands::Submit(args) => submit(global, &args.file).await,
        Commands::Tx(args) => {
            let tx = connect(global)?.fetch_transaction(&args.id).await?;
            print_json(&tx)
        }
        Commands::Status(args) => {
            let status = connect(global)?.fetch_status(&args.id).await?;
            print_json(&status)
        }
        Commands::Data(args) => {
            let data = connect(global)?.fetch_data(&args.id).await?;
            match args.out {
                Some(path) => fs::write(&path, &data)
                    .with_context(|| format!("failed to write {}", path.display())),
                None => std::io::stdout()
                    .write_all(&data)
                    .context("failed to write payload to stdout"),
            }
        }
        Commands::Balance(args) => {
            let address = resolve_address(global, args.address.as_deref())?;
            let balance = connect(global)?.fetch_balance(&address).await?;
            println!("{}", balance);
            Ok(())
        }
        Commands::LastTx(args) => {
            let address = resolve_address(global, args.address.as_deref())?;
            let last_tx = connect(global)?.fetch_last_tx(&address).await?;
            println!("{}", last_tx);
            Ok(())
        }
        Commands::Price(args) => {
            let target = args.target.as_deref().map(parse_address).transpose()?;
            let price = connect(global)?
                .fetch_price(args.bytes, target.as_ref())
                .await?;
            println!("{}", price);
            Ok(())
        }
        Commands::Query(args) => {
            let query: serde_json::Value =
                serde_json::from_str(&args.query).context("query is not valid JSON")?;
            for id in connect(global)?.query(query).await? {
                println!("{}", id);
            }
            Ok(())
        }
        Commands::Version => {
            println!("weave {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn generate(args: cli::GenerateArgs) -> Result<()> {
    tracing::info!(bits = args.bits, "generating wallet");
    let key = KeyMaterial::generate(args.bits).context("key generation failed")?;
    wallet::save_wallet(&args.out, &key, args.force)?;
    tracing::info!(path = %args.out.display(), address = %key.address(), "wallet written");
    println!("{}", key.address());
    Ok(())
}

async fn sign(global: &GlobalArgs, args: cli::SignArgs) -> Result<()> {
    let key = load_key(global)?;

    let data = match (&args.data_file, &args.data) {
        (Some(path), _) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        (None, Some(text)) => text.clone().into_bytes(),
        (None, None) => Vec::new(),
    };

    let mut builder = TransactionBuilder::new().data(data).tags(args.tags);
    if let Some(target) = args.target {
        builder = builder.target_raw(target);
    }
    if let Some(quantity) = args.quantity {
        builder = builder.quantity(quantity);
    }
    if let Some(reward) = args.reward {
        builder = builder.reward(reward);
    }
    if let Some(last_tx) = args.last_tx {
        builder = builder.last_tx(last_tx);
    }

    let gateway = connect(global)?;
    let tx = create_transaction(gateway.as_ref(), &key, builder)
        .await
        .context("failed to create transaction")?;

    let json = serde_json::to_string_pretty(&tx)?;
    match &args.out {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(id = %tx.id(), path = %path.display(), "signed transaction written");
        }
        None => println!("{}", json),
    }

    if args.submit {
        gateway.submit(&tx).await.context("submission failed")?;
        tracing::info!(id = %tx.id(), "transaction submitted");
    }
    Ok(())
}

fn verify(path: &Path) -> Result<()> {
    let tx = read_tx(path)?;
    if verify_transaction(&tx).context("transaction is malformed")? {
        println!("valid {}", tx.id());
        Ok(())
    } else {
        bail!("invalid signature for transaction {}", tx.id())
    }
}

async fn submit(global: &GlobalArgs, path: &Path) -> Result<()> {
    let tx = read_tx(path)?;
    connect(global)?
        .submit(&tx)
        .await
        .with_context(|| format!("gateway rejected transaction {}", tx.id()))?;
    println!("{}", tx.id());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn connect(global: &GlobalArgs) -> Result<Box<dyn NetworkGateway>> {
    if global.offline {
        tracing::info!("using in-memory ledger");
        let memory = MemoryGateway::new();
        if let Some(path) = global.wallet.as_deref() {
            let address = wallet::load_wallet(path)?.address();
            memory.fund(&address, OFFLINE_BALANCE)?;
        }
        return Ok(Box::new(memory));
    }
    let config = GatewayConfig::new(
        &global.gateway_protocol,
        &global.gateway_host,
        global.gateway_port,
    )
    .context("invalid gateway settings")?;
    tracing::debug!(gateway = %config.base_url(), "using gateway");
    Ok(Box::new(HttpGateway::new(config)?))
}

fn load_key(global: &GlobalArgs) -> Result<KeyMaterial> {
    wallet::load_wallet(wallet::require_wallet(global.wallet.as_deref())?)
}

fn parse_address(text: &str) -> Result<Address> {
    text.parse()
        .with_context(|| format!("{:?} is not a wallet address", text))
}

/// An explicit address, or the wallet's own.
fn resolve_address(global: &GlobalArgs, explicit: Option<&str>) -> Result<Address> {
    match explicit {
        Some(text) => parse_address(text),
        None => Ok(load_key(global)?.address()),
    }
}

fn read_tx(path: &Path) -> Result<Transaction> {
    let json =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("{} is not a transaction record", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_protocol::transaction::sign_transaction;

    const WALLET_A: &str = include_str!("../../protocol/tests/fixtures/wallet_a.json");

    #[test]
    fn signed_file_verifies_and_tampered_file_does_not() {
        let key = KeyMaterial::from_jwk_json(WALLET_A).unwrap();
        let unsigned = TransactionBuilder::new()
            .data(b"hello".to_vec())
            .reward("1000")
            .build(&key)
            .unwrap();
        let tx = sign_transaction(unsigned, &key).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("tx.json");
        fs::write(&good, serde_json::to_string(&tx).unwrap()).unwrap();
        assert_eq!(read_tx(&good).unwrap(), tx);
        assert!(verify(&good).is_ok());

        let mut json = serde_json::to_value(&tx).unwrap();
        json["reward"] = "1".into();
        let bad = dir.path().join("bad.json");
        fs::write(&bad, json.to_string()).unwrap();
        assert!(verify(&bad).is_err());
    }

    #[test]
    fn non_transaction_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let err = read_tx(&path).unwrap_err();
        assert!(err.to_string().contains("is not a transaction record"));
    }

    #[tokio::test]
    async fn offline_ledger_funds_the_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        fs::write(&path, WALLET_A).unwrap();
        let path = path.to_str().unwrap();

        let global = WeaveCli::try_parse_from(["weave", "--offline", "--wallet", path, "balance"])
            .unwrap()
            .global;
        let gateway = connect(&global).unwrap();
        let key = load_key(&global).unwrap();
        assert_eq!(
            gateway.fetch_balance(&key.address()).await.unwrap().to_u128(),
            Some(OFFLINE_BALANCE)
        );

        let unsigned = TransactionBuilder::new()
            .data(b"offline".to_vec())
            .reward("1000")
            .build(&key)
            .unwrap();
        let tx = sign_transaction(unsigned, &key).unwrap();
        gateway.submit(&tx).await.unwrap();
    }

    #[test]
    fn explicit_address_needs_no_wallet() {
        let global = WeaveCli::try_parse_from(["weave", "balance"]).unwrap().global;
        let text = "X8LXxH3FVBm-fCk6f7zkAmpXkccH6nBu_QmX05rcMxQ";
        assert_eq!(
            resolve_address(&global, Some(text)).unwrap().to_string(),
            text
        );
        assert!(resolve_address(&global, Some("short")).is_err());
    }
}
