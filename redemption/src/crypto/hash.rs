//! # Hashing Utilities
//!
//! Two hash families, each with one job:
//!
//! - **BLAKE3 `derive_key`** for every key and address derivation. Each use
//!   gets its own context string from [`crate::config`], so the regular
//!   certificate key, the paper-vend seed and address roots can never
//!   collide even when fed the same bytes.
//! - **SHA-256** for the mnemonic checksum, address checksums and
//!   transaction ids (double-SHA-256), where a widely implemented hash makes
//!   third-party tooling easier.

use sha2::{Digest, Sha256};

/// SHA-256 of `data` as a fixed-size array.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// `SHA-256(SHA-256(data))`. Used for transaction ids and address checksums.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Domain-separated BLAKE3 hash using the `derive_key` mode.
///
/// `context` must be a hard-coded, globally unique string. Never build it
/// from user input.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Like [`domain_separated_hash`], but feeds several slices in sequence
/// without concatenating them first.
pub fn domain_separated_hash_multi(context: &str, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}
