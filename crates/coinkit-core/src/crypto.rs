//! secp256k1 keys and legacy transaction signing.
//!
//! # Signing scheme
//!
//! Inputs are signed with the legacy `SIGHASH_ALL` digest computed by
//! [`SighashCache::legacy_signature_hash`]: the input being signed carries
//! the locking script of the output it spends, every other unlocking script
//! is cleared.
//!
//! Signatures are RFC 6979 deterministic ECDSA, DER encoded with the sighash
//! type byte appended, and placed in a P2PKH unlocking script alongside the
//! public key.

use bitcoin::hashes::Hash;
use bitcoin::script::{Builder, Instruction, PushBytesBuf};
use bitcoin::sighash::{EcdsaSighashType, LegacySighash, SighashCache};
use rand::RngCore;
use secp256k1::{ecdsa, Message, SecretKey, SECP256K1};
use std::fmt;

pub use bitcoin::PublicKey;

use crate::address::Address;
use crate::coin::Coin;
use crate::error::CryptoError;
use crate::types::{Script, ScriptBuf, Transaction};

/// A secp256k1 private key bound to a coin.
///
/// The `compressed` flag selects which public key serialization the key's
/// address and signatures commit to. Debug output never includes the secret.
#[derive(Clone)]
pub struct PrivateKey {
    secret: SecretKey,
    coin: Coin,
    compressed: bool,
}

impl PrivateKey {
    /// Generate a random key using the OS cryptographic RNG.
    pub fn generate(coin: Coin) -> Self {
        let mut rng = rand::rngs::OsRng;
        let mut bytes = [0u8; 32];
        loop {
            rng.fill_bytes(&mut bytes);
            if let Ok(secret) = SecretKey::from_slice(&bytes) {
                return Self {
                    secret,
                    coin,
                    compressed: true,
                };
            }
        }
    }

    /// Create a compressed key from 32 bytes of secret material.
    pub fn from_bytes(bytes: &[u8; 32], coin: Coin) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self {
            secret,
            coin,
            compressed: true,
        })
    }

    /// Create a compressed key from 64 hex characters.
    pub fn from_hex(s: &str, coin: Coin) -> Result<Self, CryptoError> {
        let bytes: [u8; 32] = hex::decode(s.trim())
            .map_err(|_| CryptoError::InvalidPrivateKey)?
            .try_into()
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        Self::from_bytes(&bytes, coin)
    }

    /// Decode Wallet Import Format. Coin and compression come from the
    /// prefix byte and the optional `0x01` suffix.
    pub fn from_wif(wif: &str) -> Result<Self, CryptoError> {
        let data = bs58::decode(wif.trim())
            .with_check(None)
            .into_vec()
            .map_err(|e| CryptoError::InvalidWif(e.to_string()))?;

        let compressed = match data.len() {
            33 => false,
            34 if data[33] == 0x01 => true,
            34 => return Err(CryptoError::InvalidWif("bad compression flag".into())),
            n => return Err(CryptoError::InvalidWif(format!("unexpected length {n}"))),
        };
        let coin = Coin::from_wif_prefix(data[0])
            .ok_or_else(|| CryptoError::InvalidWif(format!("unknown prefix {:#04x}", data[0])))?;
        let secret =
            SecretKey::from_slice(&data[1..33]).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self {
            secret,
            coin,
            compressed,
        })
    }

    /// Encode as Wallet Import Format.
    pub fn to_wif(&self) -> String {
        let mut data = Vec::with_capacity(34);
        data.push(self.coin.wif_prefix());
        data.extend_from_slice(&self.secret.secret_bytes());
        if self.compressed {
            data.push(0x01);
        }
        bs58::encode(data).with_check().into_string()
    }

    /// Same secret with a different public key serialization.
    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    pub fn coin(&self) -> Coin {
        self.coin
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Raw secret bytes. Handle with care.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.secret_bytes()
    }

    pub fn public_key(&self) -> PublicKey {
        let inner = secp256k1::PublicKey::from_secret_key(SECP256K1, &self.secret);
        if self.compressed {
            PublicKey::new(inner)
        } else {
            PublicKey::new_uncompressed(inner)
        }
    }

    /// The P2PKH address this key controls.
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key(), self.coin)
    }

    /// Sign a 32-byte digest.
    pub fn sign_digest(&self, digest: [u8; 32]) -> ecdsa::Signature {
        SECP256K1.sign_ecdsa(&Message::from_digest(digest), &self.secret)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("coin", &self.coin)
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Legacy `SIGHASH_ALL` digest for one input.
///
/// `script_code` is the locking script of the output being spent.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
) -> Result<LegacySighash, CryptoError> {
    let len = tx.input.len();
    SighashCache::new(tx)
        .legacy_signature_hash(input_index, script_code, EcdsaSighashType::All.to_u32())
        .map_err(|_| CryptoError::InputIndexOutOfBounds {
            index: input_index,
            len,
        })
}

/// Sign a P2PKH input in place.
///
/// `script_pubkey` is the locking script of the spent output; it must lock to
/// the key's pubkey hash. The input's unlocking script is replaced with
/// `<signature || SIGHASH_ALL> <public key>`.
pub fn sign_input(
    tx: &mut Transaction,
    input_index: usize,
    key: &PrivateKey,
    script_pubkey: &Script,
) -> Result<(), CryptoError> {
    let public_key = key.public_key();
    if script_pubkey != ScriptBuf::new_p2pkh(&public_key.pubkey_hash()).as_script() {
        return Err(CryptoError::PubkeyHashMismatch);
    }

    let sighash = signature_hash(tx, input_index, script_pubkey)?;
    let signature = bitcoin::ecdsa::Signature {
        signature: key.sign_digest(sighash.to_byte_array()),
        sighash_type: EcdsaSighashType::All,
    };
    let push = PushBytesBuf::try_from(signature.to_vec()).map_err(|_| CryptoError::InvalidSignature)?;

    let len = tx.input.len();
    let input = tx
        .input
        .get_mut(input_index)
        .ok_or(CryptoError::InputIndexOutOfBounds {
            index: input_index,
            len,
        })?;
    input.script_sig = Builder::new()
        .push_slice(push)
        .push_key(&public_key)
        .into_script();
    Ok(())
}

/// Verify a signed P2PKH input against the locking script it spends.
///
/// Checks that:
/// 1. The unlocking script is exactly `<signature> <public key>`
/// 2. The public key hashes to the pubkey hash in `script_pubkey`
/// 3. The signature verifies against the `SIGHASH_ALL` digest
///
/// High-S signatures are accepted, as they are by consensus.
pub fn verify_input(
    tx: &Transaction,
    input_index: usize,
    script_pubkey: &Script,
) -> Result<(), CryptoError> {
    let input = tx
        .input
        .get(input_index)
        .ok_or(CryptoError::InputIndexOutOfBounds {
            index: input_index,
            len: tx.input.len(),
        })?;

    let pushes = input
        .script_sig
        .instructions()
        .map(|ins| match ins {
            Ok(Instruction::PushBytes(bytes)) => Ok(bytes.as_bytes()),
            _ => Err(CryptoError::InvalidSignature),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let [signature, pubkey] = pushes.as_slice() else {
        return Err(CryptoError::InvalidSignature);
    };

    let public_key = PublicKey::from_slice(pubkey).map_err(|_| CryptoError::InvalidPublicKey)?;
    if script_pubkey != ScriptBuf::new_p2pkh(&public_key.pubkey_hash()).as_script() {
        return Err(CryptoError::PubkeyHashMismatch);
    }

    let signature =
        bitcoin::ecdsa::Signature::from_slice(signature).map_err(|_| CryptoError::InvalidSignature)?;
    if signature.sighash_type != EcdsaSighashType::All {
        return Err(CryptoError::UnsupportedSighash(signature.sighash_type.to_u32()));
    }
    let mut ecdsa_sig = signature.signature;
    ecdsa_sig.normalize_s();

    let sighash = signature_hash(tx, input_index, script_pubkey)?;
    SECP256K1
        .verify_ecdsa(
            &Message::from_digest(sighash.to_byte_array()),
            &ecdsa_sig,
            &public_key.inner,
        )
        .map_err(|_| CryptoError::VerificationFailed)
}
