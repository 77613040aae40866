//! Argon2id stretching for force-vended credentials.
//!
//! The email/passcode/amount triple has little entropy on its own, so the
//! compound certificate key is derived with a memory-hard KDF. Parameters
//! come from the certificate header and are bounds-checked before Argon2 is
//! ever constructed.

use rand::RngCore;
use thiserror::Error;

use crate::config::{KdfParams, AES_KEY_LENGTH, KDF_SALT_LENGTH};

/// Failures while stretching a credential.
#[derive(Debug, Error)]
pub enum KdfError {
    #[error("kdf parameters out of bounds: {0:?}")]
    OutOfBounds(KdfParams),

    #[error("argon2 rejected the input: {0}")]
    Argon2(String),
}

/// Derive the 32-byte compound certificate key from `password`.
pub fn derive_compound_key(
    password: &str,
    salt: &[u8; KDF_SALT_LENGTH],
    params: &KdfParams,
) -> Result<[u8; AES_KEY_LENGTH], KdfError> {
    if !params.is_within_bounds() {
        return Err(KdfError::OutOfBounds(*params));
    }

    let argon2_params = argon2::Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(AES_KEY_LENGTH),
    )
    .map_err(|e| KdfError::Argon2(e.to_string()))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut key = [0u8; AES_KEY_LENGTH];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| KdfError::Argon2(e.to_string()))?;
    Ok(key)
}

/// A fresh random salt for sealing.
pub fn random_salt() -> [u8; KDF_SALT_LENGTH] {
    let mut salt = [0u8; KDF_SALT_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}
