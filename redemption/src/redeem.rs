//! # Redemption Orchestrator
//!
//! Runs one redemption attempt from credentials to broadcast:
//!
//! ```text
//! AwaitingCredential -> Decrypting -> KeyDerived -> ResolvingUtxo
//!                    -> Signing -> Broadcasting -> Completed
//! ```
//!
//! Any step can fail, and a failure ends the attempt on the spot. Nothing
//! later runs: no claim is built without a resolved output and nothing is
//! broadcast without a signed claim. The orchestrator keeps no state between
//! attempts. A key that was already claimed is caught by the ledger, which
//! simply no longer holds its output.
//!
//! Each [`RedemptionVariant`] has its own [`RedemptionRequest`] variant
//! carrying just the fields it needs, so a force-vended request cannot carry
//! a stale passphrase from an earlier regular attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::address::Address;
use crate::backend::{LedgerBackend, ReceiverAddressProvider};
use crate::broadcast::Broadcaster;
use crate::certificate::{self, Certificate, Credential, ForceVendedCredentials};
use crate::config::ResolverConfig;
use crate::crypto::keys::RedemptionKey;
use crate::error::{ErrorKind, RedemptionError};
use crate::mnemonic::RedemptionMnemonic;
use crate::paper_vend;
use crate::resolver::UtxoResolver;
use crate::transaction::build_signed_claim;

// ---------------------------------------------------------------------------
// RedemptionVariant
// ---------------------------------------------------------------------------

/// Distribution channel of a certificate. Decides which credential unlocks
/// it and whether decryption happens at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedemptionVariant {
    Regular,
    RecoveryRegular,
    ForceVended,
    RecoveryForceVended,
    PaperVended,
}

impl RedemptionVariant {
    pub const ALL: [RedemptionVariant; 5] = [
        Self::Regular,
        Self::RecoveryRegular,
        Self::ForceVended,
        Self::RecoveryForceVended,
        Self::PaperVended,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::RecoveryRegular => "recovery-regular",
            Self::ForceVended => "force-vended",
            Self::RecoveryForceVended => "recovery-force-vended",
            Self::PaperVended => "paper-vended",
        }
    }
}

impl fmt::Display for RedemptionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedemptionVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown redemption variant: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Where the redemption key comes from.
#[derive(Debug, Clone)]
pub enum KeyInput {
    /// The base64 redemption code, typed in.
    Code(String),
    /// A certificate file. `None` means the user has not supplied one yet.
    Certificate(Option<Certificate>),
}

/// One complete, validated set of inputs for a redemption attempt.
#[derive(Clone)]
pub enum RedemptionRequest {
    Regular {
        input: KeyInput,
        passphrase: Option<String>,
    },
    RecoveryRegular {
        input: KeyInput,
        passphrase: Option<String>,
    },
    ForceVended {
        input: KeyInput,
        credentials: Option<ForceVendedCredentials>,
    },
    RecoveryForceVended {
        input: KeyInput,
        decryption_key: Option<String>,
    },
    PaperVended {
        shielded_code: String,
        mnemonic: String,
    },
}

impl RedemptionRequest {
    pub fn variant(&self) -> RedemptionVariant {
        match self {
            Self::Regular { .. } => RedemptionVariant::Regular,
            Self::RecoveryRegular { .. } => RedemptionVariant::RecoveryRegular,
            Self::ForceVended { .. } => RedemptionVariant::ForceVended,
            Self::RecoveryForceVended { .. } => RedemptionVariant::RecoveryForceVended,
            Self::PaperVended { .. } => RedemptionVariant::PaperVended,
        }
    }

    /// Resolve the redemption key: decrypt and parse a certificate, decode a
    /// typed code, or unshield a paper-vended code.
    pub fn redemption_key(&self) -> Result<RedemptionKey, RedemptionError> {
        match self {
            Self::PaperVended {
                shielded_code,
                mnemonic,
            } => {
                let mnemonic = RedemptionMnemonic::parse(mnemonic)?;
                paper_vend::recover_key(shielded_code, &mnemonic)
            }
            _ => Ok(RedemptionKey::from_base64(&self.redemption_code()?)?),
        }
    }

    /// The base64 redemption code, without decoding it.
    pub fn redemption_code(&self) -> Result<String, RedemptionError> {
        let variant = self.variant();
        match self {
            Self::Regular { input, passphrase } | Self::RecoveryRegular { input, passphrase } => {
                code_from_input(input, variant, || {
                    passphrase
                        .as_deref()
                        .map(|p| RedemptionMnemonic::parse(p).map(Credential::Mnemonic))
                        .transpose()
                        .map_err(RedemptionError::from)
                })
            }
            Self::ForceVended { input, credentials } => code_from_input(input, variant, || {
                Ok(credentials.clone().map(Credential::ForceVended))
            }),
            Self::RecoveryForceVended {
                input,
                decryption_key,
            } => code_from_input(input, variant, || {
                Ok(decryption_key.clone().map(Credential::DecryptionKey))
            }),
            Self::PaperVended { .. } => Ok(self.redemption_key()?.to_base64()),
        }
    }
}

impl fmt::Debug for RedemptionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedemptionRequest")
            .field("variant", &self.variant())
            .finish_non_exhaustive()
    }
}

/// The credential is only built (and a passphrase only validated) when the
/// certificate actually needs decrypting.
fn code_from_input(
    input: &KeyInput,
    variant: RedemptionVariant,
    credential: impl FnOnce() -> Result<Option<Credential>, RedemptionError>,
) -> Result<String, RedemptionError> {
    match input {
        KeyInput::Code(code) => Ok(code.trim().to_string()),
        KeyInput::Certificate(certificate) => {
            let credential = match certificate {
                Some(cert) if cert.is_sealed_container() => credential()?,
                _ => None,
            };
            certificate::read_redemption_code(certificate.as_ref(), credential.as_ref(), variant)
        }
    }
}

// ---------------------------------------------------------------------------
// Stages and receipts
// ---------------------------------------------------------------------------

/// Progress of one attempt, as reported to an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionStage {
    AwaitingCredential,
    Decrypting,
    KeyDerived,
    ResolvingUtxo,
    Signing,
    Broadcasting,
    Completed,
    Failed(ErrorKind),
}

/// What a successful redemption did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionReceipt {
    /// Lovelace moved to the receiver.
    pub amount: u64,
    /// Id of the broadcast claim.
    pub tx_id: String,
    /// The redemption address that was emptied.
    pub sender: Address,
    /// Where the funds went.
    pub receiver: Address,
    pub redeemed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Redeemer
// ---------------------------------------------------------------------------

/// The orchestrated entry point.
#[derive(Debug)]
pub struct Redeemer<B, R> {
    resolver: UtxoResolver<B>,
    receiver: R,
}

impl<B: LedgerBackend, R: ReceiverAddressProvider> Redeemer<B, R> {
    pub fn new(backend: B, receiver: R, config: ResolverConfig) -> Self {
        Self {
            resolver: UtxoResolver::new(backend, config),
            receiver,
        }
    }

    pub fn resolver(&self) -> &UtxoResolver<B> {
        &self.resolver
    }

    /// Redeem and return the amount recovered.
    pub async fn redeem(&self, request: RedemptionRequest) -> Result<u64, RedemptionError> {
        Ok(self.redeem_with_receipt(request).await?.amount)
    }

    /// Redeem and return the full receipt.
    pub async fn redeem_with_receipt(
        &self,
        request: RedemptionRequest,
    ) -> Result<RedemptionReceipt, RedemptionError> {
        self.redeem_observed(request, |_| {}).await
    }

    /// Redeem, reporting every stage transition to `observer`.
    ///
    /// On failure the observer sees `Failed(kind)` as its last stage.
    pub async fn redeem_observed<F>(
        &self,
        request: RedemptionRequest,
        mut observer: F,
    ) -> Result<RedemptionReceipt, RedemptionError>
    where
        F: FnMut(RedemptionStage) + Send,
    {
        let variant = request.variant();
        let result = self.run(&request, &mut observer).await;

        if let Err(err) = &result {
            warn!(%variant, kind = ?err.kind(), error = %err, "redemption failed");
            observer(RedemptionStage::Failed(err.kind()));
        }
        result
    }

    /// Run only the decrypt-and-parse step and return the base64 code.
    pub fn extract_redemption_code(
        &self,
        request: &RedemptionRequest,
    ) -> Result<String, RedemptionError> {
        request.redemption_code()
    }

    async fn run<F>(
        &self,
        request: &RedemptionRequest,
        observer: &mut F,
    ) -> Result<RedemptionReceipt, RedemptionError>
    where
        F: FnMut(RedemptionStage) + Send,
    {
        let variant = request.variant();
        let mut enter = |stage: RedemptionStage| {
            debug!(%variant, ?stage, "redemption stage");
            observer(stage);
        };

        enter(RedemptionStage::AwaitingCredential);

        enter(RedemptionStage::Decrypting);
        let key = request.redemption_key()?;
        let sender = self.resolver.address_for(&key);

        enter(RedemptionStage::KeyDerived);
        debug!(%variant, address = %sender, "redemption address derived");

        enter(RedemptionStage::ResolvingUtxo);
        let utxos = self
            .resolver
            .find_utxos(&sender)
            .await
            .map_err(RedemptionError::UtxoLookup)?;
        let Some(utxo) = utxos.first() else {
            return Err(RedemptionError::RedemptionKeyAlreadyUsed);
        };
        if utxos.len() > 1 {
            warn!(
                address = %sender,
                ignored = utxos.len() - 1,
                "redemption address holds several outputs, claiming the first"
            );
        }

        enter(RedemptionStage::Signing);
        let receiver = self
            .receiver
            .receiver_address()
            .await
            .map_err(|e| RedemptionError::Signing(format!("no receiver address: {e}")))?;
        let signed = build_signed_claim(&key, &receiver, utxo)
            .map_err(|e| RedemptionError::Signing(e.to_string()))?;

        enter(RedemptionStage::Broadcasting);
        Broadcaster::new(self.resolver.backend()).submit(&signed).await?;

        enter(RedemptionStage::Completed);
        info!(
            %variant,
            amount = utxo.amount,
            tx_id = %signed.tx_id,
            sender = %sender,
            receiver = %receiver,
            "redemption completed"
        );

        Ok(RedemptionReceipt {
            amount: utxo.amount,
            tx_id: signed.tx_id,
            sender,
            receiver,
            redeemed_at: Utc::now(),
        })
    }
}
