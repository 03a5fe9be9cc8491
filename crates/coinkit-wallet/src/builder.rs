//! Unsigned transaction assembly.
//!
//! The builder turns a list of destinations and the outputs chosen to fund
//! them into a version-1 [`Transaction`] with empty unlocking scripts. It does not
//! select coins or compute fees; whatever the inputs exceed the outputs by is
//! the fee.

use bitcoin::absolute::LockTime;
use bitcoin::transaction::Version;
use bitcoin::{Amount, Sequence, Witness};
use coinkit_core::address::Address;
use coinkit_core::coin::Coin;
use coinkit_core::constants::{MAX_STANDARD_TX_SIZE, P2PKH_INPUT_SIZE};
use coinkit_core::types::{
    check_sanity, output_total, total_value, ScriptBuf, Transaction, TxIn, TxOut, UnspentOutput,
};
use tracing::debug;

use crate::error::WalletError;

/// Serialized size of an input with an empty unlocking script.
const UNSIGNED_INPUT_SIZE: u64 = 41;

/// A payment: destination address and amount in satoshis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub address: Address,
    pub amount: u64,
}

impl Destination {
    pub fn new(address: Address, amount: u64) -> Self {
        Self { address, amount }
    }
}

/// A transaction awaiting signatures, with the outputs its inputs spend.
///
/// `spent[i]` is the output consumed by `tx.input[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    tx: Transaction,
    spent: Vec<UnspentOutput>,
}

impl UnsignedTransaction {
    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    pub fn spent(&self) -> &[UnspentOutput] {
        &self.spent
    }

    /// Input value minus output value.
    pub fn fee(&self) -> Option<u64> {
        total_value(&self.spent)?.checked_sub(output_total(&self.tx)?)
    }

    /// Serialized size once every input carries a P2PKH signature.
    pub fn estimated_signed_size(&self) -> u64 {
        self.tx.total_size() as u64
            + self.tx.input.len() as u64 * (P2PKH_INPUT_SIZE - UNSIGNED_INPUT_SIZE)
    }

    pub fn into_parts(self) -> (Transaction, Vec<UnspentOutput>) {
        (self.tx, self.spent)
    }
}

/// Assembles unsigned transactions from destinations and funding outputs.
pub trait TransactionBuilder: Send + Sync {
    fn build(
        &self,
        destinations: &[Destination],
        utxos: &[UnspentOutput],
    ) -> Result<UnsignedTransaction, WalletError>;
}

/// Builder for standard version-1 transactions on a single coin.
#[derive(Debug, Clone)]
pub struct StandardTransactionBuilder {
    coin: Coin,
    lock_time: LockTime,
}

impl StandardTransactionBuilder {
    pub fn new(coin: Coin) -> Self {
        Self {
            coin,
            lock_time: LockTime::ZERO,
        }
    }

    /// Set the transaction lock time (default 0), as a block height below
    /// 500 000 000 or a Unix timestamp at or above it.
    pub fn with_lock_time(mut self, lock_time: u32) -> Self {
        self.lock_time = LockTime::from_consensus(lock_time);
        self
    }

    pub fn coin(&self) -> Coin {
        self.coin
    }
}

impl TransactionBuilder for StandardTransactionBuilder {
    fn build(
        &self,
        destinations: &[Destination],
        utxos: &[UnspentOutput],
    ) -> Result<UnsignedTransaction, WalletError> {
        if destinations.is_empty() {
            return Err(WalletError::BuildFailed("no destinations".into()));
        }
        if utxos.is_empty() {
            return Err(WalletError::BuildFailed("no inputs".into()));
        }

        let mut inputs = Vec::with_capacity(utxos.len());
        for utxo in utxos {
            inputs.push(TxIn {
                previous_output: utxo.outpoint,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            });
        }

        let mut outputs = Vec::with_capacity(destinations.len());
        for (i, dest) in destinations.iter().enumerate() {
            if dest.amount == 0 {
                return Err(WalletError::InvalidDestination(format!(
                    "zero amount at destination {i}"
                )));
            }
            if dest.address.coin() != self.coin {
                return Err(WalletError::InvalidDestination(format!(
                    "{} is a {} address, expected {}",
                    dest.address,
                    dest.address.coin(),
                    self.coin
                )));
            }
            outputs.push(TxOut {
                value: Amount::from_sat(dest.amount),
                script_pubkey: dest.address.script_pubkey(),
            });
        }

        let unsigned = UnsignedTransaction {
            tx: Transaction {
                version: Version::ONE,
                lock_time: self.lock_time,
                input: inputs,
                output: outputs,
            },
            spent: utxos.to_vec(),
        };

        let output_total = output_total(&unsigned.tx)
            .ok_or_else(|| WalletError::BuildFailed("output value overflow".into()))?;
        let input_total = total_value(utxos)
            .ok_or_else(|| WalletError::BuildFailed("input value overflow".into()))?;
        if output_total > input_total {
            return Err(WalletError::BuildFailed(format!(
                "outputs {output_total} exceed inputs {input_total}"
            )));
        }

        check_sanity(&unsigned.tx).map_err(|e| WalletError::BuildFailed(e.to_string()))?;

        let size = unsigned.estimated_signed_size();
        if size > MAX_STANDARD_TX_SIZE as u64 {
            return Err(WalletError::BuildFailed(format!(
                "estimated size {size} exceeds {MAX_STANDARD_TX_SIZE}"
            )));
        }

        debug!(
            inputs = utxos.len(),
            outputs = destinations.len(),
            estimated_size = size,
            "built unsigned transaction"
        );
        Ok(unsigned)
    }
}
