//! # UTXO Resolver
//!
//! Finds the outputs that fund a redemption key. The resolver owns its
//! [`ResolverConfig`]: the network decides which address a key maps to, and
//! the page size bounds how many addresses go into one backend query.
//!
//! An empty answer is not an error at this level. The orchestrator turns it
//! into "already redeemed".

use tracing::debug;

use crate::address::Address;
use crate::backend::{BackendError, LedgerBackend, Utxo};
use crate::config::ResolverConfig;
use crate::crypto::keys::RedemptionKey;

/// Backend lookups for redemption addresses.
#[derive(Debug, Clone)]
pub struct UtxoResolver<B> {
    backend: B,
    config: ResolverConfig,
}

impl<B: LedgerBackend> UtxoResolver<B> {
    pub fn new(backend: B, config: ResolverConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The address `key` owns on the configured network.
    pub fn address_for(&self, key: &RedemptionKey) -> Address {
        Address::from_redemption_key(key, self.config.network)
    }

    /// Outputs owned by `address`, in backend order.
    pub async fn find_utxos(&self, address: &Address) -> Result<Vec<Utxo>, BackendError> {
        self.find_utxos_for(std::slice::from_ref(address)).await
    }

    /// Outputs owned by any of `addresses`.
    ///
    /// Addresses are sent in pages of `utxo_page_size`; results are
    /// concatenated page by page without re-sorting.
    pub async fn find_utxos_for(&self, addresses: &[Address]) -> Result<Vec<Utxo>, BackendError> {
        let page_size = self.config.utxo_page_size.max(1);
        let mut utxos = Vec::new();

        for (page, chunk) in addresses.chunks(page_size).enumerate() {
            let found = self.backend.get_utxos_for_addresses(chunk).await?;
            debug!(page, addresses = chunk.len(), found = found.len(), "utxo page resolved");
            utxos.extend(found);
        }

        Ok(utxos)
    }
}
