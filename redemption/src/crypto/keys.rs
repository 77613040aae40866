//! # Redemption Keys
//!
//! A redemption key is a 32-byte Ed25519 seed printed (in base64) on a
//! certificate. It plays two roles at once:
//!
//! 1. Its public key hashes to the redemption address that holds the funds.
//! 2. It is the only credential that can sign the claim spending them.
//!
//! There is no wallet key involved anywhere in a claim. Whoever holds the
//! seed holds the money, which is why this type never prints its secret,
//! not even in `Debug` output.

use base64::Engine;
use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

use crate::config::{REDEMPTION_KEY_LENGTH, SIGNATURE_LENGTH};

/// Why a redemption key string or byte slice was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("redemption key is not valid base64")]
    InvalidBase64,

    #[error("redemption key must be {REDEMPTION_KEY_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
}

/// The one-time spending secret behind a redemption certificate.
///
/// Intentionally not `Serialize`. Exporting a seed should take a deliberate
/// call to [`RedemptionKey::to_base64`].
pub struct RedemptionKey {
    signing_key: SigningKey,
}

impl RedemptionKey {
    /// A fresh random key. Only issuers and tests need this.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Wrap raw seed bytes. Every 32-byte value is a valid Ed25519 seed.
    pub fn from_bytes(seed: &[u8; REDEMPTION_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Wrap a runtime-length slice, rejecting anything that isn't 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let seed: &[u8; REDEMPTION_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidLength(bytes.len()))?;
        Ok(Self::from_bytes(seed))
    }

    /// Decode the base64 form printed on certificates.
    ///
    /// Surrounding whitespace is ignored; anything else that isn't standard
    /// padded base64 of exactly 32 bytes is rejected.
    pub fn from_base64(code: &str) -> Result<Self, KeyError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(code.trim())
            .map_err(|_| KeyError::InvalidBase64)?;
        Self::from_slice(&bytes)
    }

    /// Form-field check: `true` if `code` is base64 of exactly 32 bytes.
    pub fn is_valid(code: &str) -> bool {
        Self::from_base64(code).is_ok()
    }

    /// The base64 text form. Handle the result like the key itself.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.signing_key.to_bytes())
    }

    /// Raw seed bytes. Handle with the same care as the key itself.
    pub fn secret_bytes(&self) -> [u8; REDEMPTION_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// The Ed25519 public key. Safe to share; it ends up in every claim
    /// witness.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign `message`. Ed25519 is deterministic, so the same key and message
    /// always give the same 64 bytes.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl Clone for RedemptionKey {
    fn clone(&self) -> Self {
        Self::from_bytes(&self.signing_key.to_bytes())
    }
}

impl PartialEq for RedemptionKey {
    /// Compared by public key so secret bytes never go through a
    /// non-constant-time comparison.
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for RedemptionKey {}

impl fmt::Debug for RedemptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RedemptionKey(pub={})",
            hex::encode(&self.public_key_bytes()[..8])
        )
    }
}

/// Verify an Ed25519 signature from raw parts.
///
/// Returns `false` for a malformed public key or a signature that isn't
/// 64 bytes. No panics, just "nope".
pub fn verify_signature(public_key: &[u8; 32], message: &[u8], signature: &[u8]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(signature) else {
        return false;
    };
    verifying_key
        .verify(message, &DalekSignature::from_bytes(&sig_bytes))
        .is_ok()
}
