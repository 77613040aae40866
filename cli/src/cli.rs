//! # CLI Interface
//!
//! Defines the command-line argument structure for `ada-redeem` using
//! `clap` derive. Four subcommands: `redeem`, `extract`, `address` and
//! `version`.
//!
//! Secrets (passphrases, passcodes, decryption keys) are flags only and
//! never read from the environment. Connection settings fall back to
//! `ADA_REDEEM_*` environment variables.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use ada_redemption::config::{DEFAULT_BACKEND_URL, DEFAULT_UTXO_PAGE_SIZE};
use ada_redemption::{Network, RedemptionVariant};

use crate::logging::LogFormat;

/// Redeem Ada certificates.
#[derive(Parser, Debug)]
#[command(
    name = "ada-redeem",
    about = "Redeem Ada vending certificates into a wallet",
    version,
    propagate_version = true
)]
pub struct AdaRedeemCli {
    /// Log output format.
    #[arg(long, global = true, env = "ADA_REDEEM_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Redeem a certificate, code or paper-vended code into a wallet.
    Redeem(RedeemArgs),
    /// Print the redemption key found in a certificate.
    Extract(ExtractArgs),
    /// Print the redemption address of a base64 redemption key.
    Address(AddressArgs),
    /// Print version information and exit.
    Version,
}

/// Where the redemption key comes from.
#[derive(Args, Debug, Clone)]
pub struct KeyInputArgs {
    /// Redemption variant: regular, recovery-regular, force-vended,
    /// recovery-force-vended or paper-vended.
    #[arg(long, short = 'v', default_value = "regular")]
    pub variant: RedemptionVariant,

    /// Certificate file (plain or encrypted).
    #[arg(long, short = 'c', conflicts_with = "code")]
    pub certificate: Option<PathBuf>,

    /// Redemption code typed in directly. For paper-vended redemption this
    /// is the shielded code.
    #[arg(long)]
    pub code: Option<String>,
}

/// Credentials for encrypted certificates and paper-vended codes.
#[derive(Args, Debug, Clone, Default)]
pub struct CredentialArgs {
    /// Nine-word mnemonic for regular certificates and paper-vended codes.
    #[arg(long)]
    pub passphrase: Option<String>,

    /// Force-vended email.
    #[arg(long)]
    pub email: Option<String>,

    /// Force-vended passcode.
    #[arg(long)]
    pub passcode: Option<String>,

    /// Force-vended amount, exactly as printed.
    #[arg(long)]
    pub amount: Option<String>,

    /// Hex decryption key for recovery force-vended certificates.
    #[arg(long)]
    pub decryption_key: Option<String>,
}

/// Backend connection settings.
#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Wallet backend base URL.
    #[arg(long, env = "ADA_REDEEM_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,

    /// Network the redemption addresses live on.
    #[arg(long, short = 'n', env = "ADA_REDEEM_NETWORK", default_value = "mainnet")]
    pub network: Network,

    /// Addresses per UTXO query.
    #[arg(long, env = "ADA_REDEEM_UTXO_PAGE_SIZE", default_value_t = DEFAULT_UTXO_PAGE_SIZE)]
    pub utxo_page_size: usize,
}

/// Arguments for the `redeem` subcommand.
#[derive(Parser, Debug)]
pub struct RedeemArgs {
    #[command(flatten)]
    pub input: KeyInputArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(flatten)]
    pub backend: BackendArgs,

    /// Wallet address that receives the redeemed funds.
    #[arg(long, short = 'r', env = "ADA_REDEEM_RECEIVER")]
    pub receiver: String,

    /// Print the receipt as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `extract` subcommand.
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub input: KeyInputArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

/// Arguments for the `address` subcommand.
#[derive(Parser, Debug)]
pub struct AddressArgs {
    /// Base64 redemption key.
    #[arg(long, short = 'k')]
    pub key: String,

    /// Network to derive the address for.
    #[arg(long, short = 'n', env = "ADA_REDEEM_NETWORK", default_value = "mainnet")]
    pub network: Network,
}
