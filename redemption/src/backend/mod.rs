//! # Backend Collaborators
//!
//! The redemption core talks to the outside world through two traits:
//!
//! - [`LedgerBackend`] answers UTXO queries and accepts signed claims.
//! - [`ReceiverAddressProvider`] says where claimed funds should land.
//!
//! Two ledger implementations ship with the crate:
//!
//! - [`HttpBackend`] speaks the wallet backend's JSON API over reqwest.
//! - [`InMemoryLedger`] keeps a UTXO set behind a lock. Tests and demos use
//!   it, and because it verifies and applies claims atomically it shows the
//!   same "second claim finds nothing" behaviour as a real ledger.

pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::InMemoryLedger;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::address::Address;
pub use crate::transaction::Utxo;

/// Errors surfaced by backend implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend answered, and the answer was no.
    #[error("backend rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The request never got an answer.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The backend answered with something we could not understand.
    #[error("malformed backend response: {0}")]
    InvalidResponse(String),

    /// No receiver address is available.
    #[error("no receiver address available")]
    NoReceiver,
}

/// UTXO lookup and transaction submission.
#[async_trait]
pub trait LedgerBackend: Send + Sync {
    /// All unspent outputs owned by any of `addresses`, in backend order.
    async fn get_utxos_for_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<Utxo>, BackendError>;

    /// Submit a base64 encoded signed transaction.
    async fn send_transaction(&self, encoded_tx: &str) -> Result<(), BackendError>;
}

#[async_trait]
impl<T: LedgerBackend + ?Sized> LedgerBackend for Arc<T> {
    async fn get_utxos_for_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<Utxo>, BackendError> {
        (**self).get_utxos_for_addresses(addresses).await
    }

    async fn send_transaction(&self, encoded_tx: &str) -> Result<(), BackendError> {
        (**self).send_transaction(encoded_tx).await
    }
}

/// Source of the destination address for claimed funds.
#[async_trait]
pub trait ReceiverAddressProvider: Send + Sync {
    async fn receiver_address(&self) -> Result<Address, BackendError>;
}

#[async_trait]
impl<T: ReceiverAddressProvider + ?Sized> ReceiverAddressProvider for Arc<T> {
    async fn receiver_address(&self) -> Result<Address, BackendError> {
        (**self).receiver_address().await
    }
}

/// A receiver chosen up front, e.g. from a command-line flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedReceiver(pub Address);

#[async_trait]
impl ReceiverAddressProvider for FixedReceiver {
    async fn receiver_address(&self) -> Result<Address, BackendError> {
        Ok(self.0)
    }
}
