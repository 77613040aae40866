//! # Redemption Certificates
//!
//! A certificate is whatever file the user hands over: either a plain
//! certificate with the redemption key printed in it, or the same text
//! sealed in an encrypted container.
//!
//! - [`decrypt`] opens encrypted containers with a variant-specific
//!   [`Credential`].
//! - [`parser`] finds the redemption key in plain certificate text.
//!
//! [`read_redemption_code`] ties the two together the way every
//! certificate-backed redemption needs them.

pub mod decrypt;
pub mod parser;

pub use decrypt::{
    derive_recovery_key, seal_with_credentials, seal_with_mnemonic, Credential,
    ForceVendedCredentials, SealError,
};
pub use parser::{extract_key, render_certificate};

use std::fmt;

use crate::error::RedemptionError;
use crate::redeem::RedemptionVariant;

/// Raw certificate content as supplied by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    content: Vec<u8>,
}

impl Certificate {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// `true` unless the content is a plain certificate.
    ///
    /// Content that is neither plain nor an encrypted container still counts
    /// as encrypted here; decryption then rejects it as an invalid
    /// certificate.
    pub fn is_encrypted(&self) -> bool {
        !parser::is_plain_certificate(&self.content)
    }

    /// `true` if the content starts like an encrypted container.
    pub fn is_sealed_container(&self) -> bool {
        decrypt::has_container_magic(&self.content)
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("len", &self.content.len())
            .field("encrypted", &self.is_encrypted())
            .finish()
    }
}

/// Get the redemption key string out of an optional certificate.
///
/// - no certificate: [`RedemptionError::NoCertificate`]
/// - plain certificate: parsed directly, any credential is ignored
/// - foreign content: [`RedemptionError::InvalidCertificate`]
/// - encrypted container without a credential:
///   [`RedemptionError::MissingCredential`]
/// - otherwise: decrypted with `credential`, then parsed
pub fn read_redemption_code(
    certificate: Option<&Certificate>,
    credential: Option<&Credential>,
    variant: RedemptionVariant,
) -> Result<String, RedemptionError> {
    let certificate = certificate.ok_or(RedemptionError::NoCertificate)?;

    if !certificate.is_encrypted() {
        return parser::extract_key(certificate.as_bytes(), false);
    }

    if !certificate.is_sealed_container() {
        return Err(RedemptionError::InvalidCertificate(
            "neither a plain nor an encrypted redemption certificate".into(),
        ));
    }

    let credential = credential.ok_or(RedemptionError::MissingCredential(variant))?;
    let plaintext = decrypt::decrypt(credential, variant, certificate.as_bytes())?;
    parser::extract_key(&plaintext, true)
}
