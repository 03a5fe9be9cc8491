//! Protocol constants. All monetary values in satoshis (1 BTC = 10^8 satoshis).

pub const COIN: u64 = 100_000_000;

/// Upper bound on any single amount the ledger can represent.
pub const MAX_MONEY: u64 = 21_000_000 * COIN;

/// Largest transaction (in bytes) that nodes relay under standardness policy.
pub const MAX_STANDARD_TX_SIZE: usize = 100_000;

/// Estimated serialized size of one signed P2PKH input.
///
/// outpoint (36) + script length (1) + scriptSig (≤107) + sequence (4).
pub const P2PKH_INPUT_SIZE: u64 = 148;

/// Estimated serialized size of one P2PKH output: value (8) + length (1) + script (25).
pub const P2PKH_OUTPUT_SIZE: u64 = 34;

/// Fixed transaction overhead: version, both counts and lock time.
pub const TX_OVERHEAD_SIZE: u64 = 10;

/// Default fee rate in satoshis per byte.
pub const DEFAULT_FEE_PER_BYTE: u64 = 1;

/// Outputs below this value cost more to spend than they are worth.
pub const DUST_THRESHOLD: u64 = 3 * 182;
