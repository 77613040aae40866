//! In-memory ledger.
//!
//! A UTXO set behind a single `parking_lot::Mutex`. Submission decodes the
//! claim, finds the output it spends, verifies it and swaps input for
//! output, all under one lock acquisition. Two racing claims for the same
//! output therefore serialise: the first one lands, the second finds its
//! input gone.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::{BackendError, LedgerBackend, Utxo};
use crate::address::Address;
use crate::crypto::hash::double_sha256;
use crate::transaction::builder::{claim_id, encode_body};
use crate::transaction::{decode_signed_claim, verify_signed_claim};

#[derive(Debug, Default)]
struct LedgerState {
    utxos: Vec<Utxo>,
    accepted: Vec<String>,
    submissions: usize,
    lookups: usize,
    funded: u64,
    offline: bool,
}

/// Thread-safe UTXO set implementing [`LedgerBackend`].
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an output of `amount` owned by `address` and return it.
    pub fn fund(&self, address: Address, amount: u64) -> Utxo {
        let mut state = self.state.lock();
        state.funded += 1;
        let tx_hash = hex::encode(double_sha256(&state.funded.to_le_bytes()));
        let utxo = Utxo {
            utxo_id: format!("{tx_hash}#0"),
            tx_hash,
            tx_index: 0,
            receiver: address,
            amount,
        };
        state.utxos.push(utxo.clone());
        utxo
    }

    /// Unspent outputs currently held by `address`.
    pub fn utxos_at(&self, address: &Address) -> Vec<Utxo> {
        self.state
            .lock()
            .utxos
            .iter()
            .filter(|u| u.receiver == *address)
            .cloned()
            .collect()
    }

    /// Sum of unspent outputs held by `address`.
    pub fn balance(&self, address: &Address) -> u64 {
        self.utxos_at(address).iter().map(|u| u.amount).sum()
    }

    /// Ids of every accepted transaction, in order.
    pub fn accepted_tx_ids(&self) -> Vec<String> {
        self.state.lock().accepted.clone()
    }

    /// Number of `send_transaction` calls, accepted or not.
    pub fn submission_count(&self) -> usize {
        self.state.lock().submissions
    }

    /// Number of `get_utxos_for_addresses` calls.
    pub fn lookup_count(&self) -> usize {
        self.state.lock().lookups
    }

    /// While offline every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }
}

#[async_trait]
impl LedgerBackend for InMemoryLedger {
    async fn get_utxos_for_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<Utxo>, BackendError> {
        let mut state = self.state.lock();
        state.lookups += 1;
        if state.offline {
            return Err(BackendError::Transport("ledger offline".into()));
        }
        Ok(state
            .utxos
            .iter()
            .filter(|u| addresses.contains(&u.receiver))
            .cloned()
            .collect())
    }

    async fn send_transaction(&self, encoded_tx: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        state.submissions += 1;
        if state.offline {
            return Err(BackendError::Transport("ledger offline".into()));
        }

        let claim = decode_signed_claim(encoded_tx).map_err(|e| BackendError::Rejected {
            status: 400,
            body: e.to_string(),
        })?;

        let Some(position) = state
            .utxos
            .iter()
            .position(|u| u.outpoint() == claim.body.input)
        else {
            return Err(BackendError::Rejected {
                status: 409,
                body: format!("input {} is spent or unknown", claim.body.input),
            });
        };

        verify_signed_claim(&claim, &state.utxos[position]).map_err(|e| {
            BackendError::Rejected {
                status: 400,
                body: e.to_string(),
            }
        })?;

        let body_bytes = encode_body(&claim.body).map_err(|e| {
            BackendError::Rejected {
                status: 400,
                body: e.to_string(),
            }
        })?;
        let tx_id = claim_id(&body_bytes);

        state.utxos.remove(position);
        state.utxos.push(Utxo {
            utxo_id: format!("{tx_id}#0"),
            tx_hash: tx_id.clone(),
            tx_index: 0,
            receiver: claim.body.output.address,
            amount: claim.body.output.amount,
        });
        debug!(tx_id = %tx_id, amount = claim.body.output.amount, "claim applied");
        state.accepted.push(tx_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::crypto::keys::RedemptionKey;
    use crate::transaction::build_signed_claim;

    fn receiver() -> Address {
        Address::wallet(&[0xAA; 32], Network::Mainnet)
    }

    #[tokio::test]
    async fn claim_moves_funds() {
        let ledger = InMemoryLedger::new();
        let key = RedemptionKey::from_bytes(&[1u8; 32]);
        let address = Address::from_redemption_key(&key, Network::Mainnet);
        let utxo = ledger.fund(address, 500);

        let signed = build_signed_claim(&key, &receiver(), &utxo).unwrap();
        ledger.send_transaction(&signed.encoded).await.unwrap();

        assert!(ledger.utxos_at(&address).is_empty());
        assert_eq!(ledger.balance(&receiver()), 500);
        assert_eq!(ledger.accepted_tx_ids(), vec![signed.tx_id]);
    }

    #[tokio::test]
    async fn double_spend_is_rejected() {
        let ledger = InMemoryLedger::new();
        let key = RedemptionKey::from_bytes(&[2u8; 32]);
        let utxo = ledger.fund(Address::from_redemption_key(&key, Network::Mainnet), 9);

        let signed = build_signed_claim(&key, &receiver(), &utxo).unwrap();
        ledger.send_transaction(&signed.encoded).await.unwrap();
        let err = ledger.send_transaction(&signed.encoded).await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected { status: 409, .. }));
        assert_eq!(ledger.submission_count(), 2);
        assert_eq!(ledger.accepted_tx_ids().len(), 1);
    }

    #[tokio::test]
    async fn garbage_is_rejected() {
        let ledger = InMemoryLedger::new();
        let err = ledger.send_transaction("not a tx").await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected { status: 400, .. }));
    }

    #[tokio::test]
    async fn lookup_preserves_ledger_order() {
        let ledger = InMemoryLedger::new();
        let a = Address::wallet(&[1u8; 32], Network::Mainnet);
        let b = Address::wallet(&[2u8; 32], Network::Mainnet);
        let first = ledger.fund(a, 1);
        ledger.fund(b, 2);
        let third = ledger.fund(a, 3);

        let found = ledger.get_utxos_for_addresses(&[a]).await.unwrap();
        assert_eq!(found, vec![first, third]);
        assert_eq!(ledger.lookup_count(), 1);
    }

    #[tokio::test]
    async fn offline_ledger_fails_with_transport_errors() {
        let ledger = InMemoryLedger::new();
        ledger.set_offline(true);
        assert!(matches!(
            ledger.get_utxos_for_addresses(&[receiver()]).await,
            Err(BackendError::Transport(_))
        ));
        assert!(matches!(
            ledger.send_transaction("x").await,
            Err(BackendError::Transport(_))
        ));
    }
}
