//! # CLI Interface
//!
//! Command-line structure for `weave`, via `clap` derive. Gateway and
//! wallet options are global so every subcommand accepts them, and each
//! one falls back to a `WEAVE_*` environment variable.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use weave_protocol::config::{DEFAULT_GATEWAY_HOST, DEFAULT_GATEWAY_PORT, DEFAULT_MODULUS_BITS};
use weave_protocol::transaction::Tag;

use crate::logging::LogFormat;

/// Wallet and gateway client for the Weave permanent-storage ledger.
#[derive(Parser, Debug)]
#[command(
    name = "weave",
    about = "Sign, verify and submit Weave transactions",
    version,
    propagate_version = true
)]
pub struct WeaveCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Path to the JWK wallet file.
    #[arg(long, short = 'w', global = true, env = "WEAVE_WALLET")]
    pub wallet: Option<PathBuf>,

    /// Gateway scheme: http or https.
    #[arg(long, global = true, env = "WEAVE_GATEWAY_PROTOCOL", default_value = "https")]
    pub gateway_protocol: String,

    #[arg(long, global = true, env = "WEAVE_GATEWAY_HOST", default_value = DEFAULT_GATEWAY_HOST)]
    pub gateway_host: String,

    #[arg(long, global = true, env = "WEAVE_GATEWAY_PORT", default_value_t = DEFAULT_GATEWAY_PORT)]
    pub gateway_port: u16,

    /// Use a throwaway in-memory ledger instead of a gateway. The wallet,
    /// when given, starts there with one AR.
    #[arg(long, global = true)]
    pub offline: bool,

    #[arg(long, global = true, env = "WEAVE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new wallet file.
    Generate(GenerateArgs),
    /// Print the wallet's address.
    Address,
    /// Build and sign a transaction; prints the signed JSON.
    Sign(SignArgs),
    /// Verify a signed transaction file.
    Verify(TxFileArgs),
    /// Submit a signed transaction file to the gateway.
    Submit(TxFileArgs),
    /// Fetch a transaction record.
    Tx(IdArgs),
    /// Fetch a transaction's confirmation status.
    Status(IdArgs),
    /// Fetch a transaction's payload.
    Data(DataArgs),
    /// Show a wallet balance in winston.
    Balance(WalletQueryArgs),
    /// Show the id of a wallet's latest transaction.
    LastTx(WalletQueryArgs),
    /// Ask the gateway what storing N bytes costs.
    Price(PriceArgs),
    /// Run a ledger query (JSON); prints matching ids.
    Query(QueryArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Where to write the new JWK.
    #[arg(long, short = 'o')]
    pub out: PathBuf,

    #[arg(long, default_value_t = DEFAULT_MODULUS_BITS)]
    pub bits: usize,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Payload read from a file.
    #[arg(long, conflicts_with = "data")]
    pub data_file: Option<PathBuf>,

    /// Payload given inline as UTF-8 text.
    #[arg(long)]
    pub data: Option<String>,

    /// Recipient address for a transfer.
    #[arg(long)]
    pub target: Option<String>,

    /// Amount to transfer, in winston.
    #[arg(long)]
    pub quantity: Option<String>,

    /// Fee in winston. Asked from the gateway when omitted.
    #[arg(long)]
    pub reward: Option<String>,

    /// Anchor (previous transaction id). Asked from the gateway when omitted.
    #[arg(long)]
    pub last_tx: Option<String>,

    /// Tag as NAME=VALUE. Repeatable; order is kept.
    #[arg(long = "tag", value_parser = parse_tag)]
    pub tags: Vec<Tag>,

    /// Write the signed transaction here instead of stdout.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Submit right after signing.
    #[arg(long)]
    pub submit: bool,
}

#[derive(Args, Debug)]
pub struct TxFileArgs {
    /// Signed transaction JSON file.
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Transaction id (base64url).
    pub id: String,
}

#[derive(Args, Debug)]
pub struct DataArgs {
    pub id: String,

    /// Write the payload here instead of stdout.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct WalletQueryArgs {
    /// Address to look up. Defaults to the wallet's own.
    pub address: Option<String>,
}

#[derive(Args, Debug)]
pub struct PriceArgs {
    pub bytes: usize,

    #[arg(long)]
    pub target: Option<String>,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Query document as JSON text.
    pub query: String,
}

/// Parse `NAME=VALUE`. Only the first `=` splits, so values may contain `=`.
pub fn parse_tag(s: &str) -> Result<Tag, String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok(Tag::new(name, value)),
        _ => Err(format!("expected NAME=VALUE, got {:?}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        WeaveCli::command().debug_assert();
    }

    #[test]
    fn tag_parsing() {
        let tag = parse_tag("Content-Type=text/plain").unwrap();
        assert_eq!(tag, Tag::new("Content-Type", "text/plain"));
        assert_eq!(parse_tag("k=a=b").unwrap().value, b"a=b");
        assert_eq!(parse_tag("empty=").unwrap().value, b"");
        assert!(parse_tag("novalue").is_err());
        assert!(parse_tag("=x").is_err());
    }

    #[test]
    fn sign_command_parses() {
        let cli = WeaveCli::try_parse_from([
            "weave",
            "--wallet",
            "w.json",
            "sign",
            "--data",
            "hello",
            "--tag",
            "A=1",
            "--tag",
            "B=2",
            "--reward",
            "1000",
        ])
        .unwrap();
        assert_eq!(cli.global.wallet, Some(PathBuf::from("w.json")));
        match cli.command {
            Commands::Sign(args) => {
                assert_eq!(args.data.as_deref(), Some("hello"));
                assert_eq!(args.tags.len(), 2);
                assert_eq!(args.tags[0].name, b"A");
                assert_eq!(args.reward.as_deref(), Some("1000"));
                assert!(!args.submit);
            }
            other => panic!("expected Sign, got {:?}", other),
        }
    }

    #[test]
    fn data_and_data_file_conflict() {
        let result = WeaveCli::try_parse_from([
            "weave", "sign", "--data", "x", "--data-file", "f.bin",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = WeaveCli::try_parse_from([
            "weave",
            "price",
            "1024",
            "--offline",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert!(cli.global.offline);
        assert_eq!(cli.global.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Price(PriceArgs { bytes: 1024, .. })));
    }
}
