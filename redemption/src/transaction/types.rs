//! Core type definitions for redemption claims.
//!
//! A claim is the smallest possible ledger transaction: one input, one
//! output, one witness. There is no fee field and no change output; the
//! redemption address is emptied into the receiver in a single step.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;

// ---------------------------------------------------------------------------
// Utxo
// ---------------------------------------------------------------------------

/// An unspent output as reported by the backend.
///
/// `receiver` is the address that owns the output. For anything a
/// redemption touches that is a redemption address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Backend-assigned identifier, opaque to us.
    pub utxo_id: String,
    /// Hash of the transaction that created the output, hex encoded.
    pub tx_hash: String,
    /// Index of the output within that transaction.
    pub tx_index: u32,
    /// Owner of the output.
    pub receiver: Address,
    /// Value in lovelace.
    pub amount: u64,
}

impl Utxo {
    /// The input that spends this output.
    pub fn outpoint(&self) -> TxInput {
        TxInput {
            tx_hash: self.tx_hash.clone(),
            index: self.tx_index,
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs / Outputs
// ---------------------------------------------------------------------------

/// Reference to the output being spent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxInput {
    pub tx_hash: String,
    pub index: u32,
}

impl fmt::Display for TxInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_hash, self.index)
    }
}

/// Where the claimed value goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: Address,
    pub amount: u64,
}

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

/// The signed part of a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimBody {
    pub input: TxInput,
    pub output: TxOutput,
}

/// Proof that the redemption key authorised the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    /// Ed25519 public key of the redemption key.
    pub public_key: [u8; 32],
    /// Ed25519 signature over the claim signing message. Kept as a `Vec`
    /// because serde has no impls for 64-byte arrays.
    pub signature: Vec<u8>,
}

/// Body plus witness: what actually travels to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedClaim {
    pub body: ClaimBody,
    pub witness: Witness,
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// A claim ready for submission.
///
/// Produced once per redemption attempt and handed straight to the
/// broadcaster. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// bincode encoding of the [`SignedClaim`].
    pub bytes: Vec<u8>,
    /// base64 of `bytes`, the transport form.
    pub encoded: String,
    /// `hex(double_sha256(body bytes))`.
    pub tx_id: String,
}
