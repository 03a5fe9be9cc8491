//! # coinkit-wallet — single-address UTXO wallet pipeline.
//!
//! Selects unspent outputs, assembles an unsigned transaction, signs every
//! input with the wallet's key and serializes the result for broadcast.
//! Unspent outputs come from an async provider.
//!
//! # Modules
//!
//! - [`error`] — `WalletError` enum
//! - [`coin_selection`] — Dust-aware UTXO selection and fee policy
//! - [`builder`] — Unsigned transaction assembly
//! - [`signer`] — P2PKH input signing
//! - [`provider`] — Unspent output providers (Esplora over HTTP)
//! - [`config`] — Layered wallet configuration
//! - [`wallet`] — High-level wallet facade

pub mod builder;
pub mod coin_selection;
pub mod config;
pub mod error;
pub mod provider;
pub mod signer;
pub mod wallet;

// Re-exports for convenient access
pub use builder::{Destination, StandardTransactionBuilder, TransactionBuilder, UnsignedTransaction};
pub use coin_selection::{CoinSelection, DustAwareSelector, FeePolicy, UtxoSelector};
pub use config::WalletConfig;
pub use error::WalletError;
pub use provider::{EsploraProvider, UtxoProvider};
pub use signer::{P2pkhSigner, SignedTransaction, TransactionSigner};
pub use wallet::{CreatedTransaction, PipelineStage, UtxoWallet};
