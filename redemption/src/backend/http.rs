//! reqwest client for the wallet backend's JSON API.
//!
//! ```text
//! POST {base}/api/txs/utxoForAddresses   {"addresses": [...]}
//!   -> [{"utxo_id", "tx_hash", "tx_index", "receiver", "amount"}]
//! POST {base}/api/txs/signed             {"signedTx": "<base64>"}
//! ```
//!
//! Amounts come back as decimal strings. Lovelace totals can exceed what a
//! JSON number survives in some clients, so the backend never sends them
//! as numbers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BackendError, LedgerBackend, Utxo};
use crate::address::Address;
use crate::config::{SIGNED_TX_PATH, UTXO_FOR_ADDRESSES_PATH};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct UtxoQuery {
    addresses: Vec<String>,
}

/// One entry of the UTXO lookup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireUtxo {
    pub utxo_id: String,
    pub tx_hash: String,
    pub tx_index: u32,
    pub receiver: String,
    pub amount: String,
}

impl WireUtxo {
    pub fn from_utxo(utxo: &Utxo) -> Self {
        Self {
            utxo_id: utxo.utxo_id.clone(),
            tx_hash: utxo.tx_hash.clone(),
            tx_index: utxo.tx_index,
            receiver: utxo.receiver.to_base58(),
            amount: utxo.amount.to_string(),
        }
    }

    fn into_utxo(self) -> Result<Utxo, BackendError> {
        let receiver = Address::from_base58(&self.receiver)
            .map_err(|e| BackendError::InvalidResponse(format!("receiver: {e}")))?;
        let amount = self
            .amount
            .parse::<u64>()
            .map_err(|e| BackendError::InvalidResponse(format!("amount {:?}: {e}", self.amount)))?;
        Ok(Utxo {
            utxo_id: self.utxo_id,
            tx_hash: self.tx_hash,
            tx_index: self.tx_index,
            receiver,
            amount,
        })
    }
}

/// Body of the signed transaction submission.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTxRequest {
    pub signed_tx: String,
}

// ---------------------------------------------------------------------------
// HttpBackend
// ---------------------------------------------------------------------------

/// [`LedgerBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// A backend rooted at `base_url` (scheme and host, optionally a path
    /// prefix; a trailing slash is ignored).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a preconfigured client, e.g. one with timeouts or a proxy.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(err: reqwest::Error) -> BackendError {
    BackendError::Transport(err.to_string())
}

async fn reject(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    BackendError::Rejected { status, body }
}

#[async_trait]
impl LedgerBackend for HttpBackend {
    async fn get_utxos_for_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<Utxo>, BackendError> {
        let query = UtxoQuery {
            addresses: addresses.iter().map(Address::to_base58).collect(),
        };
        debug!(count = addresses.len(), "querying utxos");

        let response = self
            .client
            .post(self.url(UTXO_FOR_ADDRESSES_PATH))
            .json(&query)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let wire: Vec<WireUtxo> = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        wire.into_iter().map(WireUtxo::into_utxo).collect()
    }

    async fn send_transaction(&self, encoded_tx: &str) -> Result<(), BackendError> {
        let body = SignedTxRequest {
            signed_tx: encoded_tx.to_string(),
        };

        let response = self
            .client
            .post(self.url(SIGNED_TX_PATH))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }
        Ok(())
    }
}
