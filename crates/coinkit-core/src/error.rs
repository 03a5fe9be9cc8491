//! Error types for the coinkit ledger primitives.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("decode failed: {0}")] Decode(String),
    #[error("empty inputs or outputs")] EmptyInputsOrOutputs,
    #[error("duplicate input: {0}")] DuplicateInput(String),
    #[error("value overflow")] ValueOverflow,
    #[error("oversized: {size} > {max}")] OversizedTransaction { size: usize, max: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid private key")] InvalidPrivateKey,
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("signature verification failed")] VerificationFailed,
    #[error("pubkey hash does not match expected")] PubkeyHashMismatch,
    #[error("unsupported sighash type: {0:#04x}")] UnsupportedSighash(u32),
    #[error("invalid WIF: {0}")] InvalidWif(String),
    #[error("input index out of bounds: {index} >= {len}")] InputIndexOutOfBounds { index: usize, len: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58: {0}")] InvalidBase58(String),
    #[error("invalid length")] InvalidLength,
    #[error("invalid checksum")] InvalidChecksum,
    #[error("invalid character: {0}")] InvalidCharacter(char),
    #[error("invalid version: {0}")] InvalidVersion(u8),
    #[error("invalid witness version: {0}")] InvalidWitnessVersion(u8),
    #[error("invalid witness program length: {0}")] InvalidProgramLength(usize),
    #[error("invalid padding bits")] InvalidPadding,
    #[error("missing separator")] MissingSeparator,
    #[error("mixed case")] MixedCase,
    #[error("wrong checksum variant for witness version {0}")] WrongVariant(u8),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoinError {
    #[error("unknown coin: {0}")] UnknownCoin(String),
}
