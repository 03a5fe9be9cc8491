//! Wallet error types.

use coinkit_core::coin::Coin;
use coinkit_core::error::{AddressError, CryptoError, TransactionError};
use thiserror::Error;

/// Errors that can occur anywhere in the transaction pipeline.
///
/// The first failure stops the pipeline; no partial result is ever returned
/// alongside an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The available outputs cannot cover the amount plus fee.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds {
        /// Total value of the candidate outputs in satoshis.
        have: u64,
        /// Amount plus the smallest fee that could have applied.
        need: u64,
    },

    /// Invalid monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A destination the builder cannot pay to.
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    /// Transaction assembly failure.
    #[error("build failed: {0}")]
    BuildFailed(String),

    /// No supplied key owns the output spent by this input.
    #[error("no key for input {index}")]
    MissingKey { index: usize },

    /// The signature primitive rejected the input.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// A selector returned less value than amount plus fee.
    #[error("selector contract violation: selected {selected}, required {required}")]
    SelectorContractViolation { selected: u64, required: u64 },

    /// No production components exist for this coin.
    #[error("unsupported coin: {0}")]
    UnsupportedCoin(Coin),

    /// The unspent output provider failed.
    #[error("provider failure: {0}")]
    ProviderFailure(String),

    /// Configuration could not be loaded or is invalid.
    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Address(#[from] AddressError),
}
