//! Error types for the redemption pipeline.
//!
//! Every stage of a redemption attempt that can fail returns a
//! [`RedemptionError`]. Failures are surfaced unchanged to the caller; the
//! pipeline never retries on its own. The UI layer maps [`ErrorKind`] to a
//! localised message and lets the user correct their input.

use thiserror::Error;

use crate::address::AddressError;
use crate::backend::BackendError;
use crate::crypto::encryption::EncryptionError;
use crate::crypto::keys::KeyError;
use crate::mnemonic::MnemonicError;
use crate::redeem::RedemptionVariant;

/// Everything that can go wrong between "here is my certificate" and
/// "your ada is on its way".
#[derive(Debug, Error)]
pub enum RedemptionError {
    /// The variant needs a certificate and none was supplied.
    #[error("no certificate supplied")]
    NoCertificate,

    /// The certificate is encrypted but the variant's credential is missing.
    #[error("certificate is encrypted and no {0} credential was supplied")]
    MissingCredential(RedemptionVariant),

    /// A mnemonic failed its word-list or checksum validation, or a paper
    /// vend code could not be opened with the supplied mnemonic.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(#[from] MnemonicError),

    /// The credential did not open the certificate.
    #[error("certificate decryption failed: {0}")]
    Decryption(String),

    /// The certificate decrypted but has no redemption key section.
    #[error("decrypted certificate could not be parsed: {0}")]
    EncryptedCertificateParse(String),

    /// A plain certificate has no redemption key section.
    #[error("certificate could not be parsed: {0}")]
    CertificateParse(String),

    /// The supplied file is not a redemption certificate of any kind.
    #[error("not a redemption certificate: {0}")]
    InvalidCertificate(String),

    /// The redemption key is malformed (bad base64, wrong length, ...).
    #[error("invalid redemption key: {0}")]
    InvalidKey(String),

    /// An address failed to parse or validate.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// The derived address owns nothing: the key was already claimed.
    #[error("redemption key has already been used")]
    RedemptionKeyAlreadyUsed,

    /// The backend query for UTXOs failed.
    #[error("utxo lookup failed: {0}")]
    UtxoLookup(BackendError),

    /// The redemption key cannot authorise the selected output.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The network or the ledger rejected the claim.
    #[error("broadcast failed: {0}")]
    Broadcast(BackendError),
}

/// Fieldless mirror of [`RedemptionError`] for callers that only need to
/// branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoCertificate,
    MissingCredential,
    InvalidMnemonic,
    Decryption,
    EncryptedCertificateParse,
    CertificateParse,
    InvalidCertificate,
    InvalidKey,
    InvalidAddress,
    RedemptionKeyAlreadyUsed,
    UtxoLookup,
    Signing,
    Broadcast,
}

impl RedemptionError {
    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoCertificate => ErrorKind::NoCertificate,
            Self::MissingCredential(_) => ErrorKind::MissingCredential,
            Self::InvalidMnemonic(_) => ErrorKind::InvalidMnemonic,
            Self::Decryption(_) => ErrorKind::Decryption,
            Self::EncryptedCertificateParse(_) => ErrorKind::EncryptedCertificateParse,
            Self::CertificateParse(_) => ErrorKind::CertificateParse,
            Self::InvalidCertificate(_) => ErrorKind::InvalidCertificate,
            Self::InvalidKey(_) => ErrorKind::InvalidKey,
            Self::InvalidAddress(_) => ErrorKind::InvalidAddress,
            Self::RedemptionKeyAlreadyUsed => ErrorKind::RedemptionKeyAlreadyUsed,
            Self::UtxoLookup(_) => ErrorKind::UtxoLookup,
            Self::Signing(_) => ErrorKind::Signing,
            Self::Broadcast(_) => ErrorKind::Broadcast,
        }
    }

    /// Both parse failures, whether or not decryption ran first.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::EncryptedCertificateParse | ErrorKind::CertificateParse
        )
    }
}

impl From<EncryptionError> for RedemptionError {
    fn from(err: EncryptionError) -> Self {
        Self::Decryption(err.to_string())
    }
}

impl From<KeyError> for RedemptionError {
    fn from(err: KeyError) -> Self {
        Self::InvalidKey(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            RedemptionError::RedemptionKeyAlreadyUsed.kind(),
            ErrorKind::RedemptionKeyAlreadyUsed
        );
        assert_eq!(
            RedemptionError::InvalidMnemonic(MnemonicError::Checksum).kind(),
            ErrorKind::InvalidMnemonic
        );
        assert_eq!(
            RedemptionError::Broadcast(BackendError::Rejected {
                status: 400,
                body: "bad tx".into(),
            })
            .kind(),
            ErrorKind::Broadcast
        );
    }

    #[test]
    fn encryption_failures_become_decryption_errors() {
        let err: RedemptionError = EncryptionError::DecryptFailed.into();
        assert_eq!(err.kind(), ErrorKind::Decryption);
    }

    #[test]
    fn key_errors_become_invalid_key() {
        let err: RedemptionError = KeyError::InvalidLength(16).into();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);
    }

    #[test]
    fn parse_errors_are_grouped() {
        assert!(RedemptionError::CertificateParse("x".into()).is_parse_error());
        assert!(RedemptionError::EncryptedCertificateParse("x".into()).is_parse_error());
        assert!(!RedemptionError::Decryption("x".into()).is_parse_error());
    }

    #[test]
    fn display_never_includes_credentials() {
        let err = RedemptionError::MissingCredential(RedemptionVariant::ForceVended);
        assert_eq!(
            err.to_string(),
            "certificate is encrypted and no force-vended credential was supplied"
        );
    }
}
