//! Claim construction and signing.
//!
//! [`ClaimBuilder`] assembles the one-input, one-output body and signs it
//! with the redemption key. The key is the only spending authority; there
//! is no wallet key anywhere in a claim.
//!
//! Before signing, the builder checks that the key actually owns the output
//! it is about to spend. In the normal pipeline that always holds, since
//! the output was found by looking up the key's own address, but a claim
//! the ledger would reject is caught here rather than at broadcast.

use base64::Engine;

use super::types::{ClaimBody, SignedClaim, SignedTransaction, TxOutput, Utxo, Witness};
use super::verification::TransactionError;
use crate::address::Address;
use crate::config::CLAIM_SIGNING_TAG;
use crate::crypto::hash::double_sha256;
use crate::crypto::keys::RedemptionKey;

/// The exact bytes a redemption key signs: the claim tag followed by the
/// bincode body.
pub fn claim_signing_message(body_bytes: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(CLAIM_SIGNING_TAG.len() + body_bytes.len());
    message.extend_from_slice(CLAIM_SIGNING_TAG);
    message.extend_from_slice(body_bytes);
    message
}

/// Canonical body encoding, shared by signing, ids and verification.
pub fn encode_body(body: &ClaimBody) -> Result<Vec<u8>, TransactionError> {
    bincode::serialize(body).map_err(|e| TransactionError::Encoding(e.to_string()))
}

/// `hex(double_sha256(body bytes))`.
pub fn claim_id(body_bytes: &[u8]) -> String {
    hex::encode(double_sha256(body_bytes))
}

// ---------------------------------------------------------------------------
// ClaimBuilder
// ---------------------------------------------------------------------------

/// Builder for a signed redemption claim.
///
/// ```rust,no_run
/// use ada_redemption::transaction::ClaimBuilder;
/// # fn demo(utxo: &ada_redemption::transaction::Utxo,
/// #         receiver: ada_redemption::address::Address,
/// #         key: &ada_redemption::crypto::RedemptionKey) {
/// let signed = ClaimBuilder::spending(utxo)
///     .to(receiver)
///     .sign(key)
///     .unwrap();
/// println!("{}", signed.tx_id);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClaimBuilder<'a> {
    utxo: &'a Utxo,
    receiver: Option<Address>,
}

impl<'a> ClaimBuilder<'a> {
    /// Start a claim that spends all of `utxo`.
    pub fn spending(utxo: &'a Utxo) -> Self {
        Self {
            utxo,
            receiver: None,
        }
    }

    /// Set the destination of the claimed value.
    pub fn to(mut self, receiver: Address) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Check ownership, build the body, sign it.
    pub fn sign(self, key: &RedemptionKey) -> Result<SignedTransaction, TransactionError> {
        let receiver = self.receiver.ok_or(TransactionError::MissingReceiver)?;

        if self.utxo.amount == 0 {
            return Err(TransactionError::ZeroAmount);
        }

        let owner = Address::from_redemption_key(key, self.utxo.receiver.network());
        if owner != self.utxo.receiver {
            return Err(TransactionError::NotOwner {
                address: self.utxo.receiver.to_string(),
            });
        }

        let body = ClaimBody {
            input: self.utxo.outpoint(),
            output: TxOutput {
                address: receiver,
                amount: self.utxo.amount,
            },
        };
        let body_bytes = encode_body(&body)?;
        let signature = key.sign(&claim_signing_message(&body_bytes));

        let claim = SignedClaim {
            body,
            witness: Witness {
                public_key: key.public_key_bytes(),
                signature: signature.to_vec(),
            },
        };
        let bytes =
            bincode::serialize(&claim).map_err(|e| TransactionError::Encoding(e.to_string()))?;

        Ok(SignedTransaction {
            encoded: base64::engine::general_purpose::STANDARD.encode(&bytes),
            tx_id: claim_id(&body_bytes),
            bytes,
        })
    }
}

/// Build and sign a claim moving all of `utxo` to `receiver`.
pub fn build_signed_claim(
    key: &RedemptionKey,
    receiver: &Address,
    utxo: &Utxo,
) -> Result<SignedTransaction, TransactionError> {
    ClaimBuilder::spending(utxo).to(*receiver).sign(key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
