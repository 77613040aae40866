//! # Certificate Decryption
//!
//! Encrypted certificates are a small container around an AES-256-GCM
//! envelope:
//!
//! ```text
//! "ADAREDEM" | version | scheme | [salt | memory_kib | iterations | parallelism] | nonce | body
//! ```
//!
//! The bracketed block only appears for the compound scheme. Everything up
//! to the nonce is the *header* and is authenticated as associated data.
//!
//! Two schemes, picked by the redemption variant:
//!
//! | Scheme   | Variants                       | Key                                           |
//! |----------|--------------------------------|-----------------------------------------------|
//! | mnemonic | regular, recovery-regular      | BLAKE3 derive_key(context, mnemonic entropy)  |
//! | compound | force-vended, recovery-f.-v.   | Argon2id("email,passcode,amount", salt)        |
//!
//! Recovery force-vended users skip Argon2 entirely and type the 32-byte
//! compound key as hex. [`derive_recovery_key`] is how an issuer produces
//! that string.
//!
//! Nothing in here ever returns unauthenticated plaintext. A wrong
//! credential is a [`RedemptionError::Decryption`], never a key-shaped
//! string of garbage.

use std::fmt;
use thiserror::Error;

use crate::config::{
    KdfParams, AES_KEY_LENGTH, ENCRYPTED_CERTIFICATE_MAGIC, ENCRYPTED_CERTIFICATE_VERSION,
    KDF_SALT_LENGTH, REGULAR_CERTIFICATE_KEY_CONTEXT, SCHEME_COMPOUND, SCHEME_MNEMONIC,
};
use crate::crypto::encryption::{self, EncryptionError};
use crate::crypto::hash::domain_separated_hash;
use crate::crypto::kdf::{self, KdfError};
use crate::error::RedemptionError;
use crate::mnemonic::RedemptionMnemonic;
use crate::redeem::RedemptionVariant;

/// Magic + version + scheme.
const BASE_HEADER_LENGTH: usize = ENCRYPTED_CERTIFICATE_MAGIC.len() + 2;

/// Base header + salt + three u32 KDF parameters.
const COMPOUND_HEADER_LENGTH: usize = BASE_HEADER_LENGTH + KDF_SALT_LENGTH + 12;

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// The email / passcode / amount triple handed out with force-vended
/// certificates.
#[derive(Clone, PartialEq, Eq)]
pub struct ForceVendedCredentials {
    pub email: String,
    pub passcode: String,
    pub amount: String,
}

impl ForceVendedCredentials {
    pub fn new(
        email: impl Into<String>,
        passcode: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            passcode: passcode.into(),
            amount: amount.into(),
        }
    }

    /// The Argon2 password: the three fields joined by commas, in order.
    pub fn joined(&self) -> String {
        format!("{},{},{}", self.email, self.passcode, self.amount)
    }
}

impl fmt::Debug for ForceVendedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForceVendedCredentials")
            .field("email", &self.email)
            .field("passcode", &"<redacted>")
            .field("amount", &self.amount)
            .finish()
    }
}

/// What unlocks an encrypted certificate.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Regular and recovery-regular certificates.
    Mnemonic(RedemptionMnemonic),
    /// Force-vended certificates.
    ForceVended(ForceVendedCredentials),
    /// Recovery force-vended certificates: hex of the 32-byte compound key.
    DecryptionKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    Mnemonic,
    Compound,
}

impl Scheme {
    fn for_variant(variant: RedemptionVariant) -> Option<Self> {
        match variant {
            RedemptionVariant::Regular | RedemptionVariant::RecoveryRegular => {
                Some(Self::Mnemonic)
            }
            RedemptionVariant::ForceVended | RedemptionVariant::RecoveryForceVended => {
                Some(Self::Compound)
            }
            RedemptionVariant::PaperVended => None,
        }
    }

    fn of(credential: &Credential) -> Self {
        match credential {
            Credential::Mnemonic(_) => Self::Mnemonic,
            Credential::ForceVended(_) | Credential::DecryptionKey(_) => Self::Compound,
        }
    }

    fn tag(self) -> u8 {
        match self {
            Self::Mnemonic => SCHEME_MNEMONIC,
            Self::Compound => SCHEME_COMPOUND,
        }
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

struct Header<'a> {
    raw: &'a [u8],
    scheme: Scheme,
    kdf: Option<([u8; KDF_SALT_LENGTH], KdfParams)>,
}

/// Returns `true` if `content` starts with the encrypted container magic.
pub fn has_container_magic(content: &[u8]) -> bool {
    content.starts_with(ENCRYPTED_CERTIFICATE_MAGIC)
}

/// Split `content` into header and sealed body.
fn split_header(content: &[u8]) -> Result<(Header<'_>, &[u8]), RedemptionError> {
    if !has_container_magic(content) {
        return Err(RedemptionError::InvalidCertificate(
            "not an encrypted redemption certificate".into(),
        ));
    }
    if content.len() < BASE_HEADER_LENGTH {
        return Err(RedemptionError::Decryption("truncated header".into()));
    }

    let version = content[ENCRYPTED_CERTIFICATE_MAGIC.len()];
    if version != ENCRYPTED_CERTIFICATE_VERSION {
        return Err(RedemptionError::InvalidCertificate(format!(
            "unsupported container version {version}"
        )));
    }

    match content[BASE_HEADER_LENGTH - 1] {
        SCHEME_MNEMONIC => {
            let (raw, body) = content.split_at(BASE_HEADER_LENGTH);
            Ok((
                Header {
                    raw,
                    scheme: Scheme::Mnemonic,
                    kdf: None,
                },
                body,
            ))
        }
        SCHEME_COMPOUND => {
            if content.len() < COMPOUND_HEADER_LENGTH {
                return Err(RedemptionError::Decryption("truncated header".into()));
            }
            let (raw, body) = content.split_at(COMPOUND_HEADER_LENGTH);

            let mut salt = [0u8; KDF_SALT_LENGTH];
            salt.copy_from_slice(&raw[BASE_HEADER_LENGTH..BASE_HEADER_LENGTH + KDF_SALT_LENGTH]);

            let params_start = BASE_HEADER_LENGTH + KDF_SALT_LENGTH;
            let read_u32 = |offset: usize| {
                let mut word = [0u8; 4];
                word.copy_from_slice(&raw[params_start + offset..params_start + offset + 4]);
                u32::from_le_bytes(word)
            };
            let params = KdfParams {
                memory_kib: read_u32(0),
                iterations: read_u32(4),
                parallelism: read_u32(8),
            };

            Ok((
                Header {
                    raw,
                    scheme: Scheme::Compound,
                    kdf: Some((salt, params)),
                },
                body,
            ))
        }
        other => Err(RedemptionError::Decryption(format!(
            "unknown encryption scheme {other:#04x}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Decryption
// ---------------------------------------------------------------------------

/// Decrypt an encrypted certificate with the credential for `variant`.
///
/// Returns the plain certificate text. The input is only read.
pub fn decrypt(
    credential: &Credential,
    variant: RedemptionVariant,
    ciphertext: &[u8],
) -> Result<Vec<u8>, RedemptionError> {
    let expected = Scheme::for_variant(variant).ok_or_else(|| {
        RedemptionError::Decryption(format!("{variant} certificates are not decrypted"))
    })?;
    if Scheme::of(credential) != expected {
        return Err(RedemptionError::Decryption(format!(
            "credential does not fit a {variant} certificate"
        )));
    }

    let (header, sealed) = split_header(ciphertext)?;
    if header.scheme != expected {
        return Err(RedemptionError::Decryption(format!(
            "certificate was not sealed for {variant} redemption"
        )));
    }

    let key = certificate_key(credential, &header)?;
    Ok(encryption::open_with_header(&key, header.raw, sealed)?)
}

fn certificate_key(
    credential: &Credential,
    header: &Header<'_>,
) -> Result<[u8; AES_KEY_LENGTH], RedemptionError> {
    match credential {
        Credential::Mnemonic(mnemonic) => Ok(mnemonic_key(mnemonic)),
        Credential::ForceVended(credentials) => {
            let (salt, params) = header
                .kdf
                .as_ref()
                .ok_or_else(|| RedemptionError::Decryption("missing kdf parameters".into()))?;
            kdf::derive_compound_key(&credentials.joined(), salt, params)
                .map_err(|e| RedemptionError::Decryption(e.to_string()))
        }
        Credential::DecryptionKey(hex_key) => {
            let bytes = hex::decode(hex_key.trim()).map_err(|_| {
                RedemptionError::Decryption("decryption key is not hexadecimal".into())
            })?;
            Ok(encryption::key_from_slice(&bytes)?)
        }
    }
}

fn mnemonic_key(mnemonic: &RedemptionMnemonic) -> [u8; AES_KEY_LENGTH] {
    domain_separated_hash(REGULAR_CERTIFICATE_KEY_CONTEXT, mnemonic.entropy())
}

/// The hex decryption key a recovery force-vended user types in place of
/// their email / passcode / amount, for the certificate `sealed`.
pub fn derive_recovery_key(
    credentials: &ForceVendedCredentials,
    sealed: &[u8],
) -> Result<String, RedemptionError> {
    let (header, _) = split_header(sealed)?;
    let (salt, params) = header.kdf.as_ref().ok_or_else(|| {
        RedemptionError::Decryption("certificate was not sealed with credentials".into())
    })?;
    let key = kdf::derive_compound_key(&credentials.joined(), salt, params)
        .map_err(|e| RedemptionError::Decryption(e.to_string()))?;
    Ok(hex::encode(key))
}

// ---------------------------------------------------------------------------
// Sealing (issuer side)
// ---------------------------------------------------------------------------

/// Errors while producing an encrypted certificate.
#[derive(Debug, Error)]
pub enum SealError {
    #[error(transparent)]
    Kdf(#[from] KdfError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),
}

/// Seal a plain certificate for regular redemption.
pub fn seal_with_mnemonic(
    mnemonic: &RedemptionMnemonic,
    plaintext: &[u8],
) -> Result<Vec<u8>, SealError> {
    let mut out = base_header(Scheme::Mnemonic);
    let sealed = encryption::seal_with_header(&mnemonic_key(mnemonic), &out, plaintext)?;
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Seal a plain certificate for force-vended redemption.
pub fn seal_with_credentials(
    credentials: &ForceVendedCredentials,
    params: &KdfParams,
    plaintext: &[u8],
) -> Result<Vec<u8>, SealError> {
    let salt = kdf::random_salt();
    let key = kdf::derive_compound_key(&credentials.joined(), &salt, params)?;

    let mut out = base_header(Scheme::Compound);
    out.extend_from_slice(&salt);
    out.extend_from_slice(&params.memory_kib.to_le_bytes());
    out.extend_from_slice(&params.iterations.to_le_bytes());
    out.extend_from_slice(&params.parallelism.to_le_bytes());

    let sealed = encryption::seal_with_header(&key, &out, plaintext)?;
    out.extend_from_slice(&sealed);
    Ok(out)
}

fn base_header(scheme: Scheme) -> Vec<u8> {
    let mut header = Vec::with_capacity(COMPOUND_HEADER_LENGTH);
    header.extend_from_slice(ENCRYPTED_CERTIFICATE_MAGIC);
    header.push(ENCRYPTED_CERTIFICATE_VERSION);
    header.push(scheme.tag());
    header
}
