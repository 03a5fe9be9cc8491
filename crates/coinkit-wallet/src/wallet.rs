//! Wallet facade: one key, one address, the full send pipeline.
//!
//! [`UtxoWallet`] owns a private key and drives
//! select → build → sign → serialize over injected collaborators. The
//! pipeline is synchronous and does no I/O; only [`UtxoWallet::reload_balance`]
//! touches the network.

use std::fmt;
use std::sync::Arc;

use coinkit_core::address::Address;
use coinkit_core::coin::Coin;
use coinkit_core::constants::{DUST_THRESHOLD, MAX_MONEY};
use coinkit_core::crypto::PrivateKey;
use coinkit_core::types::{Txid, UnspentOutput};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::builder::{Destination, StandardTransactionBuilder, TransactionBuilder};
use crate::coin_selection::{DustAwareSelector, UtxoSelector};
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::provider::{EsploraProvider, UtxoProvider};
use crate::signer::{P2pkhSigner, TransactionSigner};

/// Where a transaction is in the send pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Selecting,
    Building,
    Signing,
    Serialized,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Selecting => "selecting",
            PipelineStage::Building => "building",
            PipelineStage::Signing => "signing",
            PipelineStage::Serialized => "serialized",
            PipelineStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A signed transaction plus the accounting behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTransaction {
    /// Lowercase hex of the signed transaction, ready for broadcast.
    pub hex: String,
    pub txid: Txid,
    /// Fee in satoshis.
    pub fee: u64,
    /// Change returned to the wallet's own address. 0 when there was none
    /// or when it fell below the dust threshold and went to the fee.
    pub change: u64,
    /// Outputs consumed, in input order.
    pub spent: Vec<UnspentOutput>,
}

/// Single-key, single-address UTXO wallet.
pub struct UtxoWallet {
    key: PrivateKey,
    address: Address,
    provider: Arc<dyn UtxoProvider>,
    selector: Box<dyn UtxoSelector>,
    builder: Box<dyn TransactionBuilder>,
    signer: Box<dyn TransactionSigner>,
    dust_threshold: u64,
}

impl UtxoWallet {
    /// Create a wallet with the production components for the key's coin.
    ///
    /// Fails with [`WalletError::UnsupportedCoin`] when no public provider
    /// endpoint is known for the coin.
    pub fn new(key: PrivateKey) -> Result<Self, WalletError> {
        let coin = key.coin();
        let provider = EsploraProvider::for_coin(coin)?;
        Ok(Self::with_components(
            key,
            provider,
            DustAwareSelector::default(),
            StandardTransactionBuilder::new(coin),
            P2pkhSigner,
        ))
    }

    /// Create a production wallet from loaded configuration.
    pub fn from_config(key: PrivateKey, config: &WalletConfig) -> Result<Self, WalletError> {
        config.validate()?;
        if key.coin() != config.coin {
            return Err(WalletError::Config(format!(
                "key is for {}, config is for {}",
                key.coin(),
                config.coin
            )));
        }
        let url = config.resolved_provider_url()?;
        let provider = EsploraProvider::new(&url, config.request_timeout())?;
        Ok(Self::with_components(
            key,
            provider,
            DustAwareSelector::new(config.fee_policy()),
            StandardTransactionBuilder::new(config.coin),
            P2pkhSigner,
        )
        .with_dust_threshold(config.dust_threshold))
    }

    /// Create a wallet from explicit collaborators, for any coin.
    pub fn with_components(
        key: PrivateKey,
        provider: impl UtxoProvider + 'static,
        selector: impl UtxoSelector + 'static,
        builder: impl TransactionBuilder + 'static,
        signer: impl TransactionSigner + 'static,
    ) -> Self {
        let address = key.address();
        Self {
            key,
            address,
            provider: Arc::new(provider),
            selector: Box::new(selector),
            builder: Box::new(builder),
            signer: Box::new(signer),
            dust_threshold: DUST_THRESHOLD,
        }
    }

    /// Change below this many satoshis is added to the fee instead of
    /// creating an output.
    pub fn with_dust_threshold(mut self, dust_threshold: u64) -> Self {
        self.dust_threshold = dust_threshold;
        self
    }

    /// The wallet's own P2PKH address; also where change goes.
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn coin(&self) -> Coin {
        self.key.coin()
    }

    /// Fetch the unspent outputs at the wallet's address. Not cached.
    pub async fn reload_balance(&self) -> Result<Vec<UnspentOutput>, WalletError> {
        let utxos = self.provider.reload(std::slice::from_ref(&self.address)).await?;
        debug!(address = %self.address, count = utxos.len(), "reloaded balance");
        Ok(utxos)
    }

    /// Start a reload on the current Tokio runtime.
    ///
    /// The receiver resolves exactly once. Without a running runtime it
    /// resolves immediately with [`WalletError::ProviderFailure`].
    pub fn reload_balance_detached(
        &self,
    ) -> oneshot::Receiver<Result<Vec<UnspentOutput>, WalletError>> {
        let (tx, rx) = oneshot::channel();
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                let _ = tx.send(Err(WalletError::ProviderFailure(format!("no runtime: {e}"))));
                return rx;
            }
        };

        let provider = Arc::clone(&self.provider);
        let address = self.address.clone();
        handle.spawn(async move {
            let result = provider.reload(std::slice::from_ref(&address)).await;
            if tx.send(result).is_err() {
                debug!(%address, "reload receiver dropped");
            }
        });
        rx
    }

    /// Pay `amount` to `to` from `utxos`; returns the signed transaction hex.
    pub fn create_transaction(
        &self,
        to: &Address,
        amount: u64,
        utxos: &[UnspentOutput],
    ) -> Result<String, WalletError> {
        self.create_transaction_detailed(to, amount, utxos)
            .map(|created| created.hex)
    }

    /// Like [`create_transaction`](Self::create_transaction), with the fee,
    /// change and spent outputs.
    pub fn create_transaction_detailed(
        &self,
        to: &Address,
        amount: u64,
        utxos: &[UnspentOutput],
    ) -> Result<CreatedTransaction, WalletError> {
        debug!(stage = %PipelineStage::Idle, %to, amount, candidates = utxos.len(), "create transaction");
        if amount > MAX_MONEY {
            return Err(failed(
                PipelineStage::Idle,
                WalletError::InvalidAmount(format!("{amount} exceeds max money")),
            ));
        }

        debug!(stage = %PipelineStage::Selecting, "selecting coins");
        let selection = self
            .selector
            .select(utxos, amount)
            .map_err(|e| failed(PipelineStage::Selecting, e))?;

        let selected = selection.total().ok_or_else(|| {
            failed(
                PipelineStage::Selecting,
                WalletError::BuildFailed("selected value overflow".into()),
            )
        })?;
        let required = amount.saturating_add(selection.fee);
        let change = selected
            .checked_sub(amount)
            .and_then(|rest| rest.checked_sub(selection.fee))
            .ok_or_else(|| {
                failed(
                    PipelineStage::Selecting,
                    WalletError::SelectorContractViolation { selected, required },
                )
            })?;

        let (fee, change) = if change < self.dust_threshold {
            if change > 0 {
                debug!(change, dust_threshold = self.dust_threshold, "dust change added to fee");
            }
            (selection.fee + change, 0)
        } else {
            (selection.fee, change)
        };

        debug!(stage = %PipelineStage::Building, fee, change, "building transaction");
        let mut destinations = vec![Destination::new(to.clone(), amount)];
        if change > 0 {
            destinations.push(Destination::new(self.address.clone(), change));
        }
        let unsigned = self
            .builder
            .build(&destinations, &selection.selected)
            .map_err(|e| failed(PipelineStage::Building, e))?;

        debug!(stage = %PipelineStage::Signing, inputs = unsigned.spent().len(), "signing inputs");
        let signed = self
            .signer
            .sign(&unsigned, std::slice::from_ref(&self.key))
            .map_err(|e| failed(PipelineStage::Signing, e))?;

        let created = CreatedTransaction {
            hex: signed.to_hex(),
            txid: signed.txid(),
            fee,
            change,
            spent: selection.selected,
        };
        info!(
            stage = %PipelineStage::Serialized,
            txid = %created.txid,
            fee = created.fee,
            change = created.change,
            inputs = created.spent.len(),
            "transaction created"
        );
        Ok(created)
    }
}

impl fmt::Debug for UtxoWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UtxoWallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

fn failed(stage: PipelineStage, err: WalletError) -> WalletError {
    warn!(stage = %PipelineStage::Failed, failed_at = %stage, error = %err, "pipeline failed");
    err
}
