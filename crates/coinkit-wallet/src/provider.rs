//! Unspent output providers.
//!
//! [`EsploraProvider`] talks to an Esplora-compatible REST API
//! (`GET {base}/address/{address}/utxo`). The response carries no locking
//! scripts, so each output's `script_pubkey` is rebuilt from the address it
//! was queried for.

use std::time::Duration;

use async_trait::async_trait;
use coinkit_core::address::Address;
use coinkit_core::coin::Coin;
use coinkit_core::types::{OutPoint, Txid, UnspentOutput};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::WalletError;

/// Source of the current unspent outputs for a set of addresses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UtxoProvider: Send + Sync {
    /// Fetch every unspent output locked to any of `addresses`.
    async fn reload(&self, addresses: &[Address]) -> Result<Vec<UnspentOutput>, WalletError>;
}

/// One entry of an Esplora `/address/:address/utxo` response.
#[derive(Debug, Deserialize)]
struct EsploraUtxo {
    txid: Txid,
    vout: u32,
    value: u64,
}

/// HTTP provider backed by an Esplora REST endpoint.
#[derive(Debug, Clone)]
pub struct EsploraProvider {
    client: Client,
    base_url: String,
}

impl EsploraProvider {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WalletError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::ProviderFailure(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Provider for the public endpoint of `coin`, if one is known.
    pub fn for_coin(coin: Coin) -> Result<Self, WalletError> {
        let url = Self::default_url(coin).ok_or(WalletError::UnsupportedCoin(coin))?;
        Self::new(url, Self::DEFAULT_TIMEOUT)
    }

    /// Public Esplora endpoint for `coin`.
    pub fn default_url(coin: Coin) -> Option<&'static str> {
        match coin {
            Coin::Bitcoin => Some("https://blockstream.info/api"),
            Coin::BitcoinTestnet => Some("https://blockstream.info/testnet/api"),
            Coin::Litecoin => None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn utxo_url(&self, address: &Address) -> String {
        format!("{}/address/{}/utxo", self.base_url, address)
    }

    async fn fetch(&self, address: &Address) -> Result<Vec<UnspentOutput>, WalletError> {
        let url = self.utxo_url(address);
        let entries: Vec<EsploraUtxo> = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| WalletError::ProviderFailure(format!("GET {url}: {e}")))?
            .json()
            .await
            .map_err(|e| WalletError::ProviderFailure(format!("decode {url}: {e}")))?;

        debug!(%address, count = entries.len(), "fetched unspent outputs");
        Ok(to_unspent(entries, address))
    }
}

fn to_unspent(entries: Vec<EsploraUtxo>, address: &Address) -> Vec<UnspentOutput> {
    let script_pubkey = address.script_pubkey();
    entries
        .into_iter()
        .map(|e| UnspentOutput::new(OutPoint::new(e.txid, e.vout), e.value, script_pubkey.clone()))
        .collect()
}

#[async_trait]
impl UtxoProvider for EsploraProvider {
    async fn reload(&self, addresses: &[Address]) -> Result<Vec<UnspentOutput>, WalletError> {
        let mut utxos = Vec::new();
        for address in addresses {
            utxos.extend(self.fetch(address).await?);
        }
        Ok(utxos)
    }
}
