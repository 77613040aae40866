// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ada Redemption CLI
//!
//! Entry point for the `ada-redeem` binary. Parses CLI arguments,
//! initializes logging, and runs one of four subcommands:
//!
//! - `redeem`  - claim a certificate's funds into a wallet address
//! - `extract` - print the redemption key found in a certificate
//! - `address` - print the redemption address for a key
//! - `version` - print build version information
//!
//! Command output goes to stdout, logs to stderr.

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ada_redemption::config::ENCRYPTED_CERTIFICATE_VERSION;
use ada_redemption::{
    Address, Certificate, FixedReceiver, ForceVendedCredentials, HttpBackend, KeyInput,
    RedemptionKey, RedemptionRequest, RedemptionVariant, Redeemer, ResolverConfig,
};

use cli::{AdaRedeemCli, Commands, CredentialArgs, KeyInputArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = AdaRedeemCli::parse();
    logging::init_logging("ada_redeem=info,ada_redemption=info", cli.log_format);

    match cli.command {
        Commands::Redeem(args) => redeem(args).await,
        Commands::Extract(args) => extract(args),
        Commands::Address(args) => print_address(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Redeems against the configured backend and prints the receipt.
async fn redeem(args: cli::RedeemArgs) -> Result<()> {
    let request = build_request(&args.input, &args.credentials)?;
    let receiver = Address::from_base58(&args.receiver)
        .with_context(|| format!("invalid receiver address: {}", args.receiver))?;

    let config = ResolverConfig::new(args.backend.network)
        .with_page_size(args.backend.utxo_page_size);

    tracing::info!(
        variant = %request.variant(),
        network = %config.network,
        backend = %args.backend.backend_url,
        receiver = %receiver,
        "starting redemption"
    );

    let redeemer = Redeemer::new(
        HttpBackend::new(args.backend.backend_url),
        FixedReceiver(receiver),
        config,
    );

    let receipt = redeemer
        .redeem_observed(request, |stage| tracing::debug!(?stage, "stage"))
        .await
        .context("redemption failed")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&receipt).context("failed to serialize receipt")?
        );
    } else {
        println!("amount    {}", receipt.amount);
        println!("tx id     {}", receipt.tx_id);
        println!("from      {}", receipt.sender);
        println!("to        {}", receipt.receiver);
        println!("at        {}", receipt.redeemed_at.to_rfc3339());
    }
    Ok(())
}

/// Prints the base64 redemption key without touching the network.
fn extract(args: cli::ExtractArgs) -> Result<()> {
    let request = build_request(&args.input, &args.credentials)?;
    let code = request
        .redemption_code()
        .context("could not read a redemption key")?;
    println!("{code}");
    Ok(())
}

fn print_address(args: cli::AddressArgs) -> Result<()> {
    let key = RedemptionKey::from_base64(&args.key).context("invalid redemption key")?;
    println!("{}", Address::from_redemption_key(&key, args.network));
    Ok(())
}

/// Assembles a request carrying only the inputs `input.variant` uses.
fn build_request(input: &KeyInputArgs, creds: &CredentialArgs) -> Result<RedemptionRequest> {
    Ok(match input.variant {
        RedemptionVariant::Regular => RedemptionRequest::Regular {
            input: key_input(input)?,
            passphrase: creds.passphrase.clone(),
        },
        RedemptionVariant::RecoveryRegular => RedemptionRequest::RecoveryRegular {
            input: key_input(input)?,
            passphrase: creds.passphrase.clone(),
        },
        RedemptionVariant::ForceVended => RedemptionRequest::ForceVended {
            input: key_input(input)?,
            credentials: force_vended_credentials(creds)?,
        },
        RedemptionVariant::RecoveryForceVended => RedemptionRequest::RecoveryForceVended {
            input: key_input(input)?,
            decryption_key: creds.decryption_key.clone(),
        },
        RedemptionVariant::PaperVended => {
            let Some(shielded_code) = input.code.clone() else {
                bail!("paper-vended redemption needs --code with the shielded code");
            };
            let Some(mnemonic) = creds.passphrase.clone() else {
                bail!("paper-vended redemption needs --passphrase");
            };
            RedemptionRequest::PaperVended {
                shielded_code,
                mnemonic,
            }
        }
    })
}

/// A typed code wins over a certificate file; neither leaves the
/// certificate missing.
fn key_input(input: &KeyInputArgs) -> Result<KeyInput> {
    Ok(match (&input.code, &input.certificate) {
        (Some(code), _) => KeyInput::Code(code.clone()),
        (None, Some(path)) => {
            let content = std::fs::read(path)
                .with_context(|| format!("failed to read certificate {}", path.display()))?;
            KeyInput::Certificate(Some(Certificate::new(content)))
        }
        (None, None) => KeyInput::Certificate(None),
    })
}

/// All three force-vended fields, or none of them.
fn force_vended_credentials(creds: &CredentialArgs) -> Result<Option<ForceVendedCredentials>> {
    match (&creds.email, &creds.passcode, &creds.amount) {
        (Some(email), Some(passcode), Some(amount)) => Ok(Some(ForceVendedCredentials::new(
            email.clone(),
            passcode.clone(),
            amount.clone(),
        ))),
        (None, None, None) => Ok(None),
        _ => bail!("force-vended redemption needs --email, --passcode and --amount together"),
    }
}

fn print_version() {
    println!("ada-redeem  {}", env!("CARGO_PKG_VERSION"));
    println!("container   v{ENCRYPTED_CERTIFICATE_VERSION}");
    println!("rustc       {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(variant: RedemptionVariant, code: Option<&str>) -> KeyInputArgs {
        KeyInputArgs {
            variant,
            certificate: None,
            code: code.map(str::to_string),
        }
    }

    #[test]
    fn paper_vended_needs_code_and_passphrase() {
        let creds = CredentialArgs::default();
        assert!(build_request(&input(RedemptionVariant::PaperVended, Some("abc")), &creds).is_err());

        let creds = CredentialArgs {
            passphrase: Some("words".into()),
            ..Default::default()
        };
        let request =
            build_request(&input(RedemptionVariant::PaperVended, Some("abc")), &creds).unwrap();
        assert_eq!(request.variant(), RedemptionVariant::PaperVended);
    }

    #[test]
    fn partial_force_vended_credentials_are_rejected() {
        let creds = CredentialArgs {
            email: Some("user@example.org".into()),
            ..Default::default()
        };
        assert!(build_request(&input(RedemptionVariant::ForceVended, None), &creds).is_err());
    }

    #[test]
    fn typed_code_passes_through() {
        let key = RedemptionKey::from_bytes(&[7u8; 32]);
        let request = build_request(
            &input(RedemptionVariant::Regular, Some(&key.to_base64())),
            &CredentialArgs::default(),
        )
        .unwrap();
        assert_eq!(request.redemption_code().unwrap(), key.to_base64());
    }

    #[test]
    fn missing_certificate_file_is_reported() {
        let args = KeyInputArgs {
            variant: RedemptionVariant::Regular,
            certificate: Some("/nonexistent/cert.pdf".into()),
            code: None,
        };
        assert!(build_request(&args, &CredentialArgs::default()).is_err());
    }
}
