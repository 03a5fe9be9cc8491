//! Shared helpers for integration and property tests.

use async_trait::async_trait;
use bitcoin::hashes::Hash;
use coinkit_core::address::Address;
use coinkit_core::coin::Coin;
use coinkit_core::crypto::PrivateKey;
use coinkit_core::types::{OutPoint, Txid, UnspentOutput};
use coinkit_wallet::{
    DustAwareSelector, P2pkhSigner, StandardTransactionBuilder, UtxoProvider, UtxoWallet,
    WalletError,
};

/// Deterministic mainnet key from a seed byte (seed must be non-zero).
pub fn key(seed: u8) -> PrivateKey {
    key_on(seed, Coin::Bitcoin)
}

pub fn key_on(seed: u8, coin: Coin) -> PrivateKey {
    PrivateKey::from_bytes(&[seed; 32], coin).unwrap()
}

/// A P2PKH address nobody in the tests holds the key for.
pub fn foreign_address(seed: u8) -> Address {
    Address::from_pubkey_hash([seed; 20], Coin::Bitcoin)
}

/// Unspent output locked to `owner` at a distinct outpoint.
pub fn utxo(owner: &Address, txid_seed: u8, vout: u32, value: u64) -> UnspentOutput {
    UnspentOutput::new(
        OutPoint::new(Txid::from_byte_array([txid_seed; 32]), vout),
        value,
        owner.script_pubkey(),
    )
}

/// One output per value, all owned by `owner`, each with a unique outpoint.
pub fn utxos(owner: &Address, values: &[u64]) -> Vec<UnspentOutput> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| utxo(owner, (i % 250) as u8 + 1, i as u32, v))
        .collect()
}

/// Provider that returns a fixed set of outputs, or a fixed error.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    result: Result<Vec<UnspentOutput>, WalletError>,
}

impl StaticProvider {
    pub fn new(utxos: Vec<UnspentOutput>) -> Self {
        Self { result: Ok(utxos) }
    }

    pub fn failing(err: WalletError) -> Self {
        Self { result: Err(err) }
    }
}

#[async_trait]
impl UtxoProvider for StaticProvider {
    async fn reload(&self, _addresses: &[Address]) -> Result<Vec<UnspentOutput>, WalletError> {
        self.result.clone()
    }
}

/// Wallet with default components and an in-memory provider.
pub fn wallet_with(key: PrivateKey, provider: StaticProvider) -> UtxoWallet {
    let coin = key.coin();
    UtxoWallet::with_components(
        key,
        provider,
        DustAwareSelector::default(),
        StandardTransactionBuilder::new(coin),
        P2pkhSigner,
    )
}

pub fn wallet(key: PrivateKey) -> UtxoWallet {
    wallet_with(key, StaticProvider::new(Vec::new()))
}
