//! # Cryptographic Primitives
//!
//! Thin, typed wrappers around audited implementations:
//!
//! - **Ed25519** (`ed25519-dalek`) for redemption keys and claim signatures.
//! - **AES-256-GCM** (`aes-gcm`) for certificates and paper-vend codes.
//! - **Argon2id** (`argon2`) for force-vended credential stretching.
//! - **BLAKE3** and **SHA-256** for derivations, checksums and ids.
//!
//! Nothing in here is novel. If a function in this module starts to look
//! clever, it is probably wrong.

pub mod encryption;
pub mod hash;
pub mod kdf;
pub mod keys;

pub use encryption::EncryptionError;
pub use hash::{domain_separated_hash, double_sha256, sha256};
pub use keys::{verify_signature, KeyError, RedemptionKey};
