//! # Broadcasting
//!
//! Submission of a signed claim. One call, one submission: there is no
//! retry here or anywhere above. A flaky network must not turn into two
//! broadcasts; re-submitting takes a fresh user action.

use tracing::{debug, warn};

use crate::backend::LedgerBackend;
use crate::error::RedemptionError;
use crate::transaction::SignedTransaction;

/// Thin wrapper that submits a claim exactly once.
#[derive(Debug)]
pub struct Broadcaster<'a, B> {
    backend: &'a B,
}

impl<'a, B: LedgerBackend> Broadcaster<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Send `signed` to the backend. Success is silent.
    pub async fn submit(&self, signed: &SignedTransaction) -> Result<(), RedemptionError> {
        debug!(tx_id = %signed.tx_id, bytes = signed.bytes.len(), "broadcasting claim");
        self.backend
            .send_transaction(&signed.encoded)
            .await
            .map_err(|err| {
                warn!(tx_id = %signed.tx_id, error = %err, "claim rejected");
                RedemptionError::Broadcast(err)
            })
    }
}
