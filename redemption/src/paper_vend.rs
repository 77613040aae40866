//! # Paper-Vended Codes
//!
//! Paper-vended certificates print a *shielded* redemption code: the real
//! redemption key sealed under a seed derived from a nine-word mnemonic,
//! base58 encoded.
//!
//! ```text
//! seed          = BLAKE3_derive_key(PAPER_VEND_SEED_CONTEXT, mnemonic entropy)
//! shielded code = base58(nonce (12) | AES-256-GCM(seed, redemption key (32)))
//! ```
//!
//! The seal is authenticated, so a wrong mnemonic is detected rather than
//! producing a different, valid-looking key that owns nothing.

use crate::config::{
    AES_NONCE_LENGTH, AES_TAG_LENGTH, PAPER_VEND_SEED_CONTEXT, REDEMPTION_KEY_LENGTH,
};
use crate::crypto::encryption::{self, EncryptionError};
use crate::crypto::hash::domain_separated_hash;
use crate::crypto::keys::RedemptionKey;
use crate::error::RedemptionError;
use crate::mnemonic::{MnemonicError, RedemptionMnemonic};

/// Byte length of a decoded shielded code.
pub const SHIELDED_CODE_LENGTH: usize = AES_NONCE_LENGTH + REDEMPTION_KEY_LENGTH + AES_TAG_LENGTH;

fn seed(mnemonic: &RedemptionMnemonic) -> [u8; 32] {
    domain_separated_hash(PAPER_VEND_SEED_CONTEXT, mnemonic.entropy())
}

/// Form-field check: `true` if `code` is base58 that decodes to exactly
/// [`SHIELDED_CODE_LENGTH`] bytes. Whether a mnemonic unlocks it is only
/// known at [`recover_key`] time.
pub fn is_valid_shielded_code(code: &str) -> bool {
    bs58::decode(code.trim())
        .into_vec()
        .is_ok_and(|bytes| bytes.len() == SHIELDED_CODE_LENGTH)
}

/// Recover the redemption key hidden in `shielded_code`.
///
/// A code that isn't base58 or has the wrong length is an invalid key. A
/// code that decodes fine but doesn't open under `mnemonic` is an invalid
/// mnemonic.
pub fn recover_key(
    shielded_code: &str,
    mnemonic: &RedemptionMnemonic,
) -> Result<RedemptionKey, RedemptionError> {
    let sealed = bs58::decode(shielded_code.trim())
        .into_vec()
        .map_err(|_| RedemptionError::InvalidKey("shielded code is not base58".into()))?;

    if sealed.len() != SHIELDED_CODE_LENGTH {
        return Err(RedemptionError::InvalidKey(format!(
            "shielded code must be {SHIELDED_CODE_LENGTH} bytes, got {}",
            sealed.len()
        )));
    }

    let key_bytes = encryption::open(&seed(mnemonic), &sealed)
        .map_err(|_| RedemptionError::InvalidMnemonic(MnemonicError::DoesNotUnlock))?;

    Ok(RedemptionKey::from_slice(&key_bytes)?)
}

/// Shield `key` under `mnemonic`. The issuer-side inverse of
/// [`recover_key`].
pub fn shield_key(
    key: &RedemptionKey,
    mnemonic: &RedemptionMnemonic,
) -> Result<String, EncryptionError> {
    let sealed = encryption::seal(&seed(mnemonic), &key.secret_bytes())?;
    Ok(bs58::encode(sealed).into_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn mnemonic(seed: u8) -> RedemptionMnemonic {
        RedemptionMnemonic::from_entropy([seed; 12])
    }

    #[test]
    fn seed_matches_known_vector() {
        let mnemonic =
            RedemptionMnemonic::parse("uncle bargain pistol obtain amount laugh explain type learn")
                .unwrap();
        assert_eq!(
            hex::encode(seed(&mnemonic)),
            "2091b076f9165675fdc2c440d8dd41cc45bb7b80d98954a26a65a18be8f69fd8"
        );
    }

    #[test]
    fn shielded_code_shape_is_checked_without_a_mnemonic() {
        let key = RedemptionKey::from_bytes(&[0x42; 32]);
        let code = shield_key(&key, &mnemonic(3)).unwrap();
        assert!(is_valid_shielded_code(&code));
        assert!(is_valid_shielded_code(&format!("  {code}\n")));

        assert!(!is_valid_shielded_code(&code[..code.len() - 2]));
        assert!(!is_valid_shielded_code("0OIl"));
        assert!(!is_valid_shielded_code(&bs58::encode([7u8; 32]).into_string()));
        assert!(!is_valid_shielded_code(""));
    }

    #[test]
    fn shield_then_recover() {
        let key = RedemptionKey::from_bytes(&[0x11; 32]);
        let code = shield_key(&key, &mnemonic(7)).unwrap();
        assert_eq!(recover_key(&code, &mnemonic(7)).unwrap(), key);
    }

    #[test]
    fn wrong_mnemonic_is_an_invalid_mnemonic() {
        let key = RedemptionKey::generate();
        let code = shield_key(&key, &mnemonic(7)).unwrap();
        let err = recover_key(&code, &mnemonic(8)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMnemonic);
    }

    #[test]
    fn non_base58_code_is_an_invalid_key() {
        let err = recover_key("0OIl+/", &mnemonic(7)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);
    }

    #[test]
    fn wrong_length_code_is_an_invalid_key() {
        let short = bs58::encode([1u8; 20]).into_string();
        let err = recover_key(&short, &mnemonic(7)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let key = RedemptionKey::generate();
        let code = shield_key(&key, &mnemonic(3)).unwrap();
        assert_eq!(recover_key(&format!("\n {code} "), &mnemonic(3)).unwrap(), key);
    }
}
