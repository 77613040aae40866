//! # AES-256-GCM Sealing
//!
//! Both secret-bearing formats in this crate are AES-256-GCM envelopes:
//!
//! - **Encrypted certificates** use [`seal_with_header`] / [`open_with_header`].
//!   The container header (magic, version, scheme, KDF parameters) is bound
//!   into the tag as associated data, so flipping a scheme byte or lowering
//!   the Argon2 cost in a stored certificate breaks authentication instead of
//!   silently changing how the key is derived.
//! - **Paper-vend shielded codes** use the plain [`seal`] / [`open`] pair,
//!   whose output is `nonce || ciphertext || tag`.
//!
//! GCM is authenticated. A wrong key does not produce garbage plaintext that
//! a later parser might mistake for a redemption key; it produces
//! [`EncryptionError::DecryptFailed`]. That property is what lets the
//! certificate pipeline promise "right key or a defined error".

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use thiserror::Error;

use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH, AES_TAG_LENGTH};

/// Errors that can occur while sealing or opening an envelope.
///
/// Wrong key and corrupted ciphertext are deliberately the same variant.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("invalid key length: expected {AES_KEY_LENGTH} bytes")]
    InvalidKeyLength,

    #[error("ciphertext too short: must be at least {} bytes", AES_NONCE_LENGTH + AES_TAG_LENGTH)]
    CiphertextTooShort,
}

/// Seal `plaintext` under `key` with a fresh random nonce.
///
/// Returns `nonce || ciphertext || tag`.
pub fn seal(key: &[u8; AES_KEY_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::EncryptFailed)?;
    let nonce_bytes = random_nonce();

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Open an envelope produced by [`seal`].
///
/// The input slice is only read, never modified.
pub fn open(key: &[u8; AES_KEY_LENGTH], sealed: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if sealed.len() < AES_NONCE_LENGTH + AES_TAG_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(AES_NONCE_LENGTH);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::DecryptFailed)?;

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| EncryptionError::DecryptFailed)
}

/// Seal `plaintext` and authenticate `header` alongside it.
///
/// Returns `nonce || ciphertext || tag`. The header itself is not included
/// in the output; the caller writes it in front.
pub fn seal_with_header(
    key: &[u8; AES_KEY_LENGTH],
    header: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::EncryptFailed)?;
    let nonce_bytes = random_nonce();

    let payload = Payload {
        msg: plaintext,
        aad: header,
    };

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), payload)
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Open `nonce || ciphertext || tag` that was sealed with `header`.
///
/// The header must match byte-for-byte or authentication fails.
pub fn open_with_header(
    key: &[u8; AES_KEY_LENGTH],
    header: &[u8],
    sealed: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    if sealed.len() < AES_NONCE_LENGTH + AES_TAG_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(AES_NONCE_LENGTH);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::DecryptFailed)?;

    let payload = Payload {
        msg: ciphertext,
        aad: header,
    };

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), payload)
        .map_err(|_| EncryptionError::DecryptFailed)
}

/// Convert a runtime-length key (e.g. decoded from hex typed by a user) into
/// the fixed-size form the cipher wants.
pub fn key_from_slice(bytes: &[u8]) -> Result<[u8; AES_KEY_LENGTH], EncryptionError> {
    bytes
        .try_into()
        .map_err(|_| EncryptionError::InvalidKeyLength)
}

fn random_nonce() -> [u8; AES_NONCE_LENGTH] {
    let mut nonce = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}
