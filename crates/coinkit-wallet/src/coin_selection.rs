//! Dust-aware coin selection.
//!
//! Picks a run of consecutive outputs (by ascending value) whose sum covers
//! the target plus the fee for that many inputs, preferring selections that
//! leave a change output above the dust threshold and whose total lands
//! closest to twice the target. Fee/size circularity is avoided by
//! recomputing the fee for every candidate input count.

use coinkit_core::constants::{
    DEFAULT_FEE_PER_BYTE, DUST_THRESHOLD, P2PKH_INPUT_SIZE, P2PKH_OUTPUT_SIZE, TX_OVERHEAD_SIZE,
};
use coinkit_core::types::{total_value, UnspentOutput};
use tracing::debug;

use crate::error::WalletError;

/// Fee and dust parameters used by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    /// Satoshis per estimated byte.
    pub fee_per_byte: u64,
    /// Smallest change worth creating an output for.
    pub dust_threshold: u64,
    /// Outputs the transaction is assumed to carry (payment + change).
    pub outputs: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            fee_per_byte: DEFAULT_FEE_PER_BYTE,
            dust_threshold: DUST_THRESHOLD,
            outputs: 2,
        }
    }
}

impl FeePolicy {
    /// Estimated size in bytes of a P2PKH transaction.
    pub fn estimated_size(n_inputs: u64, n_outputs: u64) -> u64 {
        n_inputs
            .saturating_mul(P2PKH_INPUT_SIZE)
            .saturating_add(n_outputs.saturating_mul(P2PKH_OUTPUT_SIZE))
            .saturating_add(TX_OVERHEAD_SIZE)
    }

    /// Fee for spending `n_inputs` outputs under this policy.
    pub fn fee(&self, n_inputs: u64) -> u64 {
        Self::estimated_size(n_inputs, self.outputs).saturating_mul(self.fee_per_byte)
    }
}

/// Result of coin selection: which outputs to spend and the fee they imply.
///
/// `sum(selected.value) >= target + fee` always holds for a selection
/// returned by [`DustAwareSelector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSelection {
    /// Selected outputs, ascending by value.
    pub selected: Vec<UnspentOutput>,
    /// Fee in satoshis.
    pub fee: u64,
}

impl CoinSelection {
    /// Sum of the selected values. None on overflow.
    pub fn total(&self) -> Option<u64> {
        total_value(&self.selected)
    }
}

/// Strategy for choosing which unspent outputs fund a payment.
pub trait UtxoSelector: Send + Sync {
    /// Select outputs covering `target` plus fee. `target` must be non-zero.
    fn select(&self, utxos: &[UnspentOutput], target: u64) -> Result<CoinSelection, WalletError>;
}

/// Sliding-window selector that avoids dust change.
///
/// Deterministic: the same candidates (in any order) and target always yield
/// the same selection.
#[derive(Debug, Clone, Default)]
pub struct DustAwareSelector {
    policy: FeePolicy,
}

impl DustAwareSelector {
    pub fn new(policy: FeePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FeePolicy {
        &self.policy
    }

    /// Find the best window of `n` consecutive outputs with sum >= `target + fee(n) + margin`.
    ///
    /// With `closest_to` set, the window whose sum is nearest that value wins;
    /// otherwise the first qualifying window does. Ties go to the earliest.
    fn best_window(
        &self,
        prefix: &[u128],
        n: usize,
        target: u64,
        margin: u64,
        closest_to: Option<u128>,
    ) -> Option<usize> {
        let required = target as u128 + self.policy.fee(n as u64) as u128 + margin as u128;
        let mut best: Option<(usize, u128)> = None;

        for start in 0..=(prefix.len() - 1 - n) {
            let sum = prefix[start + n] - prefix[start];
            if sum < required {
                continue;
            }
            let Some(anchor) = closest_to else {
                return Some(start);
            };
            let distance = sum.abs_diff(anchor);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((start, distance));
            }
        }
        best.map(|(start, _)| start)
    }
}

impl UtxoSelector for DustAwareSelector {
    fn select(&self, utxos: &[UnspentOutput], target: u64) -> Result<CoinSelection, WalletError> {
        if target == 0 {
            return Err(WalletError::InvalidAmount("target must be non-zero".into()));
        }

        let mut sorted = utxos.to_vec();
        sorted.sort_by(|a, b| a.value.cmp(&b.value).then_with(|| a.outpoint.cmp(&b.outpoint)));

        let mut prefix = Vec::with_capacity(sorted.len() + 1);
        prefix.push(0u128);
        for utxo in &sorted {
            let last = prefix[prefix.len() - 1];
            prefix.push(last + utxo.value as u128);
        }
        let total = prefix[sorted.len()];
        let have = u64::try_from(total).unwrap_or(u64::MAX);
        let need = target.saturating_add(self.policy.fee(sorted.len().max(1) as u64));

        if sorted.is_empty() || total < target as u128 {
            return Err(WalletError::InsufficientFunds { have, need });
        }

        let anchor = (target as u128) * 2;
        let passes = [
            (self.policy.dust_threshold, Some(anchor)),
            (0, None),
        ];
        for (margin, closest_to) in passes {
            for n in 1..=sorted.len() {
                if let Some(start) = self.best_window(&prefix, n, target, margin, closest_to) {
                    let fee = self.policy.fee(n as u64);
                    let selected = sorted[start..start + n].to_vec();
                    debug!(
                        target,
                        fee,
                        inputs = n,
                        dust_free = closest_to.is_some(),
                        "coin selection complete"
                    );
                    return Ok(CoinSelection { selected, fee });
                }
            }
        }

        Err(WalletError::InsufficientFunds { have, need })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::hashes::Hash;
    use coinkit_core::types::{OutPoint, ScriptBuf, Txid};

    fn utxo(seed: u8, value: u64) -> UnspentOutput {
        UnspentOutput::new(
            OutPoint::new(Txid::from_byte_array([seed; 32]), 0),
            value,
            ScriptBuf::from_bytes(vec![0x76, 0xa9]),
        )
    }

    fn values(selection: &CoinSelection) -> Vec<u64> {
        selection.selected.iter().map(|u| u.value).collect()
    }

    // --- FeePolicy ---

    #[test]
    fn default_policy() {
        let policy = FeePolicy::default();
        assert_eq!(policy.fee_per_byte, 1);
        assert_eq!(policy.dust_threshold, 546);
        assert_eq!(policy.outputs, 2);
    }

    #[test]
    fn fee_formula() {
        let policy = FeePolicy::default();
        assert_eq!(policy.fee(1), 148 + 2 * 34 + 10);
        assert_eq!(policy.fee(3), 3 * 148 + 2 * 34 + 10);

        let pricey = FeePolicy {
            fee_per_byte: 20,
            ..FeePolicy::default()
        };
        assert_eq!(pricey.fee(1), 226 * 20);
    }

    #[test]
    fn fee_saturates() {
        let policy = FeePolicy {
            fee_per_byte: u64::MAX,
            ..FeePolicy::default()
        };
        assert_eq!(policy.fee(u64::MAX), u64::MAX);
    }

    // --- Selection ---

    #[test]
    fn reference_scenario() {
        let selector = DustAwareSelector::default();
        let result = selector
            .select(&[utxo(1, 5000), utxo(2, 3000)], 4000)
            .unwrap();
        assert_eq!(values(&result), vec![5000]);
        assert_eq!(result.fee, 226);
        assert_eq!(result.total(), Some(5000));
    }

    #[test]
    fn single_small_output_insufficient() {
        let selector = DustAwareSelector::default();
        let err = selector.select(&[utxo(1, 100)], 4000).unwrap_err();
        assert_eq!(
            err,
            WalletError::InsufficientFunds {
                have: 100,
                need: 4226
            }
        );
    }

    #[test]
    fn empty_input_insufficient() {
        let selector = DustAwareSelector::default();
        assert!(matches!(
            selector.select(&[], 1).unwrap_err(),
            WalletError::InsufficientFunds { have: 0, .. }
        ));
    }

    #[test]
    fn zero_target_rejected() {
        let selector = DustAwareSelector::default();
        assert!(matches!(
            selector.select(&[utxo(1, 5000)], 0).unwrap_err(),
            WalletError::InvalidAmount(_)
        ));
    }

    #[test]
    fn total_covers_target_but_not_fee() {
        let selector = DustAwareSelector::default();
        let err = selector.select(&[utxo(1, 4100)], 4000).unwrap_err();
        assert_eq!(
            err,
            WalletError::InsufficientFunds {
                have: 4100,
                need: 4226
            }
        );
    }

    #[test]
    fn prefers_window_closest_to_twice_target() {
        let selector = DustAwareSelector::default();
        let utxos = [utxo(1, 3000), utxo(2, 8000), utxo(3, 20_000)];
        let result = selector.select(&utxos, 4000).unwrap();
        assert_eq!(values(&result), vec![8000]);
    }

    #[test]
    fn uses_fewest_inputs_first() {
        let selector = DustAwareSelector::default();
        // No single output suffices, a pair does.
        let utxos = [utxo(1, 1000), utxo(2, 2500), utxo(3, 2600)];
        let result = selector.select(&utxos, 4000).unwrap();
        assert_eq!(values(&result), vec![2500, 2600]);
        assert_eq!(result.fee, 2 * 148 + 2 * 34 + 10);
    }

    #[test]
    fn falls_back_to_dust_change() {
        let selector = DustAwareSelector::default();
        // 4300 covers 4000 + 226 but leaves only 74 in change.
        let result = selector.select(&[utxo(1, 4300)], 4000).unwrap();
        assert_eq!(values(&result), vec![4300]);
        assert_eq!(result.fee, 226);
    }

    #[test]
    fn dust_free_pass_beats_fewer_inputs_with_dust() {
        let selector = DustAwareSelector::default();
        // Fewer-input fallback is only used when no window avoids dust.
        let utxos = [utxo(1, 2500), utxo(2, 2600), utxo(3, 4300)];
        let result = selector.select(&utxos, 4000).unwrap();
        let total: u64 = values(&result).iter().sum();
        assert!(total >= 4000 + result.fee + 546);
    }

    #[test]
    fn exact_cover_without_change() {
        let selector = DustAwareSelector::default();
        let result = selector.select(&[utxo(1, 4226)], 4000).unwrap();
        assert_eq!(result.total(), Some(4000 + result.fee));
    }

    #[test]
    fn result_is_independent_of_input_order() {
        let selector = DustAwareSelector::default();
        let a = [utxo(1, 1000), utxo(2, 7000), utxo(3, 3000), utxo(4, 3000)];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(selector.select(&a, 4000).unwrap(), selector.select(&b, 4000).unwrap());
    }

    #[test]
    fn ties_broken_by_outpoint() {
        let selector = DustAwareSelector::default();
        let result = selector.select(&[utxo(9, 6000), utxo(3, 6000)], 4000).unwrap();
        assert_eq!(result.selected[0].outpoint.txid, Txid::from_byte_array([3; 32]));
    }

    #[test]
    fn selection_is_ascending_by_value() {
        let selector = DustAwareSelector::default();
        let utxos = [utxo(1, 900), utxo(2, 1200), utxo(3, 1100), utxo(4, 1000)];
        let result = selector.select(&utxos, 2500).unwrap();
        let got = values(&result);
        let mut sorted = got.clone();
        sorted.sort();
        assert_eq!(got, sorted);
    }

    #[test]
    fn huge_values_do_not_overflow() {
        let selector = DustAwareSelector::default();
        let utxos = [utxo(1, u64::MAX), utxo(2, u64::MAX)];
        let result = selector.select(&utxos, u64::MAX - 10_000).unwrap();
        assert_eq!(result.selected.len(), 1);
    }

    #[test]
    fn higher_fee_rate_changes_selection() {
        let selector = DustAwareSelector::new(FeePolicy {
            fee_per_byte: 10,
            ..FeePolicy::default()
        });
        // 5000 no longer covers 4000 + 2260.
        let result = selector.select(&[utxo(1, 5000), utxo(2, 3000)], 4000).unwrap();
        assert_eq!(values(&result), vec![3000, 5000]);
        assert_eq!(result.fee, (2 * 148 + 2 * 34 + 10) * 10);
    }
}
