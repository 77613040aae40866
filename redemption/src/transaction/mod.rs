//! # Claim Transactions
//!
//! Building, signing and verifying the one transaction a redemption ever
//! produces.
//!
//! ```text
//! types.rs        Utxo, claim body, witness, SignedTransaction
//! builder.rs      ClaimBuilder: ownership check, body encoding, signing
//! verification.rs decoding and ledger-side verification
//! ```
//!
//! ## Encoding
//!
//! - The body is bincode. The redemption key signs
//!   `CLAIM_SIGNING_TAG || body`.
//! - The transaction id is `hex(double_sha256(body))`, so it does not depend
//!   on the signature.
//! - The transport form is base64 of the bincode `{ body, witness }`.

pub mod builder;
pub mod types;
pub mod verification;

pub use builder::{build_signed_claim, ClaimBuilder};
pub use types::{ClaimBody, SignedClaim, SignedTransaction, TxInput, TxOutput, Utxo, Witness};
pub use verification::{decode_signed_claim, verify_signed_claim, TransactionError};
