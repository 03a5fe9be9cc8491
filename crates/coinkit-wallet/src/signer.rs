//! Input signing.

use coinkit_core::crypto::{self, PrivateKey};
use coinkit_core::types::{encode_hex, ScriptBuf, Transaction, Txid};
use tracing::debug;

use crate::builder::UnsignedTransaction;
use crate::error::WalletError;

/// A transaction with an unlocking script on every input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    tx: Transaction,
}

impl SignedTransaction {
    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    pub fn into_inner(self) -> Transaction {
        self.tx
    }

    pub fn txid(&self) -> Txid {
        self.tx.compute_txid()
    }

    pub fn serialize(&self) -> Vec<u8> {
        bitcoin::consensus::encode::serialize(&self.tx)
    }

    /// Lowercase hex of the consensus serialization.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.tx)
    }
}

/// Produces unlocking scripts for every input of an unsigned transaction.
pub trait TransactionSigner: Send + Sync {
    /// Sign all inputs. Fails without returning anything partially signed.
    fn sign(
        &self,
        unsigned: &UnsignedTransaction,
        keys: &[PrivateKey],
    ) -> Result<SignedTransaction, WalletError>;
}

/// Signs P2PKH inputs with legacy `SIGHASH_ALL`.
///
/// The key for each input is the one whose P2PKH locking script equals the
/// spent output's `script_pubkey`.
#[derive(Debug, Clone, Copy, Default)]
pub struct P2pkhSigner;

impl TransactionSigner for P2pkhSigner {
    fn sign(
        &self,
        unsigned: &UnsignedTransaction,
        keys: &[PrivateKey],
    ) -> Result<SignedTransaction, WalletError> {
        let scripts: Vec<ScriptBuf> = keys.iter().map(|k| k.address().script_pubkey()).collect();

        // Resolve every owner before touching any input.
        let owners = unsigned
            .spent()
            .iter()
            .enumerate()
            .map(|(index, utxo)| {
                scripts
                    .iter()
                    .position(|s| *s == utxo.script_pubkey)
                    .map(|k| &keys[k])
                    .ok_or(WalletError::MissingKey { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = unsigned.tx().clone();
        for (index, (key, utxo)) in owners.iter().zip(unsigned.spent()).enumerate() {
            crypto::sign_input(&mut tx, index, key, &utxo.script_pubkey)
                .map_err(|e| WalletError::SigningFailed(format!("input {index}: {e}")))?;
        }

        for (index, utxo) in unsigned.spent().iter().enumerate() {
            crypto::verify_input(&tx, index, &utxo.script_pubkey)
                .map_err(|e| WalletError::SigningFailed(format!("input {index}: {e}")))?;
        }

        let signed = SignedTransaction { tx };
        debug!(txid = %signed.txid(), inputs = owners.len(), "signed transaction");
        Ok(signed)
    }
}
