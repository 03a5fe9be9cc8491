//! # coinkit-core
//! Ledger primitives for single-address UTXO wallets.
//!
//! - [`types`]: `bitcoin` transactions, hex encoding and unspent outputs
//! - [`crypto`]: secp256k1 keys, WIF and legacy `SIGHASH_ALL` signing
//! - [`address`]: Base58Check and Bech32/Bech32m addresses
//! - [`coin`]: per-ledger encoding parameters

pub mod address;
pub mod coin;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod types;
