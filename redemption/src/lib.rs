// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ada Redemption - Core Library
//!
//! Turns a one-time redemption certificate into a spendable balance: find
//! the redemption key, derive its address, look up the output it funds,
//! sign a claim moving that output to the user's wallet and broadcast it
//! exactly once.
//!
//! Ed25519 redemption keys sign the claims, AES-256-GCM seals certificates
//! and paper-vend codes, and Argon2id stretches the low-entropy
//! force-vended credentials. Every wrong credential ends in an
//! authentication failure, never in a plausible-looking wrong key.
//!
//! ## Architecture
//!
//! - **certificate** - Decrypt encrypted certificates, parse plain ones.
//! - **mnemonic** - Nine-word BIP-39 redemption mnemonics.
//! - **paper_vend** - Recover keys from shielded paper-vended codes.
//! - **address** - Redemption and wallet addresses.
//! - **resolver** - UTXO lookup for a redemption address.
//! - **transaction** - Claim construction, signing and verification.
//! - **broadcast** - At-most-once submission.
//! - **redeem** - The orchestrator tying it all together.
//! - **backend** - Ledger and receiver collaborators (HTTP, in-memory).
//! - **crypto** - Hashes, AEAD, KDF and key primitives.
//! - **config** - Format constants and explicit runtime configuration.
//! - **error** - The error taxonomy surfaced to callers.
//!
//! ## Ground Rules
//!
//! 1. No step retries on its own. A second broadcast takes a second call.
//! 2. Keys, mnemonics and passcodes never reach a log line or a `Debug`.
//! 3. The ledger is the only source of truth for "already redeemed".

pub mod address;
pub mod backend;
pub mod broadcast;
pub mod certificate;
pub mod config;
pub mod crypto;
pub mod error;
pub mod mnemonic;
pub mod paper_vend;
pub mod redeem;
pub mod resolver;
pub mod transaction;

pub use address::Address;
pub use backend::{FixedReceiver, HttpBackend, InMemoryLedger, LedgerBackend};
pub use certificate::{Certificate, ForceVendedCredentials};
pub use config::{Network, ResolverConfig};
pub use crypto::RedemptionKey;
pub use error::{ErrorKind, RedemptionError};
pub use mnemonic::RedemptionMnemonic;
pub use redeem::{
    KeyInput, RedemptionReceipt, RedemptionRequest, RedemptionStage, RedemptionVariant, Redeemer,
};
