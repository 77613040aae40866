//! Claim decoding and verification.
//!
//! This is the ledger's side of a claim. The in-memory ledger runs every
//! submitted transaction through [`verify_signed_claim`] before touching its
//! UTXO set; the checks are ordered cheapest first.

use base64::Engine;
use thiserror::Error;

use super::builder::{claim_signing_message, encode_body};
use super::types::{SignedClaim, Utxo};
use crate::address::Address;
use crate::crypto::keys::verify_signature;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while building, decoding or verifying a claim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("claim encoding failed: {0}")]
    Encoding(String),

    #[error("claim could not be decoded: {0}")]
    Decode(String),

    #[error("no receiver address set")]
    MissingReceiver,

    #[error("output carries no value")]
    ZeroAmount,

    #[error("redemption key does not own {address}")]
    NotOwner { address: String },

    #[error("claim spends {claimed} but the output holds {available}")]
    AmountMismatch { claimed: u64, available: u64 },

    #[error("claim input does not reference the output being spent")]
    InputMismatch,

    #[error("invalid claim signature")]
    InvalidSignature,
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Decode the base64 transport form of a claim.
pub fn decode_signed_claim(encoded: &str) -> Result<SignedClaim, TransactionError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| TransactionError::Decode(e.to_string()))?;
    bincode::deserialize(&bytes).map_err(|e| TransactionError::Decode(e.to_string()))
}

/// Verify `claim` as a spend of `spent`.
///
/// 1. The input references `spent`.
/// 2. The output moves exactly `spent.amount`.
/// 3. The witness key derives `spent.receiver` on its network.
/// 4. The signature verifies over the tagged body bytes.
pub fn verify_signed_claim(claim: &SignedClaim, spent: &Utxo) -> Result<(), TransactionError> {
    if claim.body.input != spent.outpoint() {
        return Err(TransactionError::InputMismatch);
    }

    if claim.body.output.amount != spent.amount {
        return Err(TransactionError::AmountMismatch {
            claimed: claim.body.output.amount,
            available: spent.amount,
        });
    }

    let witness_address = Address::from_redemption_key_bytes(
        &claim.witness.public_key,
        spent.receiver.network(),
    );
    if witness_address != spent.receiver {
        return Err(TransactionError::NotOwner {
            address: spent.receiver.to_string(),
        });
    }

    let body_bytes = encode_body(&claim.body)?;
    if !verify_signature(
        &claim.witness.public_key,
        &claim_signing_message(&body_bytes),
        &claim.witness.signature,
    ) {
        return Err(TransactionError::InvalidSignature);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
