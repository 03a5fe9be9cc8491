//! Core ledger types: transactions, outpoints, unspent outputs.
//!
//! Transactions are `bitcoin` crate types, so the bytes produced here are the
//! consensus bytes a node validates. All monetary values are in satoshis.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use bitcoin::{OutPoint, Script, ScriptBuf, Transaction, TxIn, TxOut, Txid};

use crate::constants::{MAX_MONEY, MAX_STANDARD_TX_SIZE};
use crate::error::TransactionError;

/// Parse a raw transaction from hex, requiring it to hold exactly one.
pub fn decode_hex(s: &str) -> Result<Transaction, TransactionError> {
    bitcoin::consensus::encode::deserialize_hex(s.trim())
        .map_err(|e| TransactionError::Decode(e.to_string()))
}

/// Lowercase hex of the consensus serialization, ready for broadcast.
pub fn encode_hex(tx: &Transaction) -> String {
    bitcoin::consensus::encode::serialize_hex(tx)
}

/// Context-free structural checks: non-empty, no repeated outpoint,
/// output total within [`MAX_MONEY`], size within the standard limit.
pub fn check_sanity(tx: &Transaction) -> Result<(), TransactionError> {
    if tx.input.is_empty() || tx.output.is_empty() {
        return Err(TransactionError::EmptyInputsOrOutputs);
    }

    let mut seen = HashSet::with_capacity(tx.input.len());
    for input in &tx.input {
        if !seen.insert(input.previous_output) {
            return Err(TransactionError::DuplicateInput(input.previous_output.to_string()));
        }
    }

    match output_total(tx) {
        Some(total) if total <= MAX_MONEY => {}
        _ => return Err(TransactionError::ValueOverflow),
    }

    let size = tx.total_size();
    if size > MAX_STANDARD_TX_SIZE {
        return Err(TransactionError::OversizedTransaction {
            size,
            max: MAX_STANDARD_TX_SIZE,
        });
    }
    Ok(())
}

/// Sum of all output values in satoshis. Returns None on overflow.
pub fn output_total(tx: &Transaction) -> Option<u64> {
    tx.output
        .iter()
        .try_fold(0u64, |acc, out| acc.checked_add(out.value.to_sat()))
}

/// A previously created output that has not been spent yet.
///
/// Created by a provider from network state; the wallet only ever references
/// it. Serializes as `{"outpoint": "<txid>:<vout>", "value": .., "script_pubkey": "<hex>"}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnspentOutput {
    pub outpoint: OutPoint,
    /// Value in satoshis.
    pub value: u64,
    /// Locking script guarding the output, used for ownership lookup and
    /// the signature digest.
    pub script_pubkey: ScriptBuf,
}

impl UnspentOutput {
    pub fn new(outpoint: OutPoint, value: u64, script_pubkey: ScriptBuf) -> Self {
        Self {
            outpoint,
            value,
            script_pubkey,
        }
    }
}

/// Sum of the values of a set of unspent outputs. Returns None on overflow.
pub fn total_value(utxos: &[UnspentOutput]) -> Option<u64> {
    utxos
        .iter()
        .try_fold(0u64, |acc, u| acc.checked_add(u.value))
}
