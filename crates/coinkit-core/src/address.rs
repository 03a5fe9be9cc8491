//! Address encoding.
//!
//! Two families of addresses are supported:
//! - Base58Check ([`Payload::PubkeyHash`], [`Payload::ScriptHash`]) with a
//!   per-coin version byte, e.g. `1...` and `3...` on Bitcoin.
//! - Segregated-witness programs ([`Payload::WitnessProgram`]): Bech32
//!   ([BIP-173]) for version 0 and Bech32m ([BIP-350]) for versions 1–16,
//!   e.g. `bc1q...` and `bc1p...`.
//!
//! Every address maps to exactly one locking script via
//! [`Address::script_pubkey`]. Equality is structural.
//!
//! [BIP-173]: https://github.com/bitcoin/bips/blob/master/bip-0173.mediawiki
//! [BIP-350]: https://github.com/bitcoin/bips/blob/master/bip-0350.mediawiki

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use bitcoin::hashes::Hash;
use bitcoin::{PubkeyHash, ScriptHash, WitnessProgram, WitnessVersion};

use crate::coin::Coin;
use crate::crypto::PublicKey;
use crate::error::AddressError;
use crate::types::{Script, ScriptBuf};

/// Bech32 checksum constant (BIP-173).
const BECH32_CONST: u32 = 1;

/// Bech32m checksum constant (BIP-350).
const BECH32M_CONST: u32 = 0x2bc830a3;

/// Bech32 character set for encoding 5-bit values.
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Maximum length of a Bech32 string.
const BECH32_MAX_LEN: usize = 90;

/// What an address pays to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Payload {
    /// HASH160 of a public key (P2PKH).
    PubkeyHash([u8; 20]),
    /// HASH160 of a redeem script (P2SH).
    ScriptHash([u8; 20]),
    /// Native witness program of a given version.
    WitnessProgram(WitnessProgram),
}

/// A spending destination on a specific coin.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    coin: Coin,
    payload: Payload,
}

impl Address {
    /// Create a P2PKH address from a 20-byte pubkey hash.
    pub fn from_pubkey_hash(pubkey_hash: [u8; 20], coin: Coin) -> Self {
        Self {
            coin,
            payload: Payload::PubkeyHash(pubkey_hash),
        }
    }

    /// Create the P2PKH address of a public key.
    pub fn from_public_key(public_key: &PublicKey, coin: Coin) -> Self {
        Self::from_pubkey_hash(public_key.pubkey_hash().to_byte_array(), coin)
    }

    /// Create a P2SH address from a 20-byte script hash.
    pub fn from_script_hash(script_hash: [u8; 20], coin: Coin) -> Self {
        Self {
            coin,
            payload: Payload::ScriptHash(script_hash),
        }
    }

    /// Create a witness address, validating version and program length.
    pub fn from_witness_program(
        version: u8,
        program: Vec<u8>,
        coin: Coin,
    ) -> Result<Self, AddressError> {
        validate_witness_program(version, &program)?;
        let witness_version = WitnessVersion::try_from(version)
            .map_err(|_| AddressError::InvalidWitnessVersion(version))?;
        let program = WitnessProgram::new(witness_version, &program)
            .map_err(|_| AddressError::InvalidProgramLength(program.len()))?;
        Ok(Self {
            coin,
            payload: Payload::WitnessProgram(program),
        })
    }

    /// Recover the address a standard locking script pays to.
    pub fn from_script(script_pubkey: &Script, coin: Coin) -> Option<Self> {
        let bytes = script_pubkey.as_bytes();
        if script_pubkey.is_p2pkh() {
            Some(Self::from_pubkey_hash(bytes.get(3..23)?.try_into().ok()?, coin))
        } else if script_pubkey.is_p2sh() {
            Some(Self::from_script_hash(bytes.get(2..22)?.try_into().ok()?, coin))
        } else if script_pubkey.is_witness_program() {
            let version = script_pubkey.witness_version()?;
            Self::from_witness_program(version.to_num(), bytes.get(2..)?.to_vec(), coin).ok()
        } else {
            None
        }
    }

    /// The coin this address belongs to.
    pub fn coin(&self) -> Coin {
        self.coin
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The pubkey hash, if this is a P2PKH address.
    pub fn pubkey_hash(&self) -> Option<[u8; 20]> {
        match self.payload {
            Payload::PubkeyHash(hash) => Some(hash),
            _ => None,
        }
    }

    /// The locking script an output paying this address carries.
    pub fn script_pubkey(&self) -> ScriptBuf {
        match &self.payload {
            Payload::PubkeyHash(hash) => {
                ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(*hash))
            }
            Payload::ScriptHash(hash) => {
                ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(*hash))
            }
            Payload::WitnessProgram(program) => ScriptBuf::new_witness_program(program),
        }
    }

    /// Encode as Base58Check or Bech32/Bech32m, depending on the payload.
    pub fn encode(&self) -> String {
        match &self.payload {
            Payload::PubkeyHash(hash) => base58check(self.coin.p2pkh_version(), hash),
            Payload::ScriptHash(hash) => base58check(self.coin.p2sh_version(), hash),
            Payload::WitnessProgram(program) => encode_segwit(
                self.coin.hrp(),
                program.version().to_num(),
                program.program().as_bytes(),
            ),
        }
    }

    /// Decode any supported address string. The coin is inferred from the
    /// version byte or human-readable part.
    pub fn decode(s: &str) -> Result<Self, AddressError> {
        if let Some(sep) = s.rfind('1') {
            let hrp = s[..sep].to_ascii_lowercase();
            if let Some(coin) = Coin::from_hrp(&hrp) {
                let (version, program) = decode_segwit(s)?;
                return Self::from_witness_program(version, program, coin);
            }
        }
        decode_base58(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}

// --- Base58Check ---

fn base58check(version: u8, hash: &[u8; 20]) -> String {
    let mut data = Vec::with_capacity(21);
    data.push(version);
    data.extend_from_slice(hash);
    bs58::encode(data).with_check().into_string()
}

fn decode_base58(s: &str) -> Result<Address, AddressError> {
    let data = bs58::decode(s)
        .with_check(None)
        .into_vec()
        .map_err(|e| match e {
            bs58::decode::Error::InvalidChecksum { .. } => AddressError::InvalidChecksum,
            bs58::decode::Error::NoChecksum => AddressError::InvalidLength,
            other => AddressError::InvalidBase58(other.to_string()),
        })?;

    // into_vec strips the 4 checksum bytes: version (1) + hash (20) remain.
    if data.len() != 21 {
        return Err(AddressError::InvalidLength);
    }
    let (coin, is_script) =
        Coin::from_base58_version(data[0]).ok_or(AddressError::InvalidVersion(data[0]))?;

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&data[1..]);
    Ok(if is_script {
        Address::from_script_hash(hash, coin)
    } else {
        Address::from_pubkey_hash(hash, coin)
    })
}

// --- Bech32 / Bech32m ---

fn validate_witness_program(version: u8, program: &[u8]) -> Result<(), AddressError> {
    if version > 16 {
        return Err(AddressError::InvalidWitnessVersion(version));
    }
    if !(2..=40).contains(&program.len()) {
        return Err(AddressError::InvalidProgramLength(program.len()));
    }
    if version == 0 && program.len() != 20 && program.len() != 32 {
        return Err(AddressError::InvalidProgramLength(program.len()));
    }
    Ok(())
}

/// Checksum constant required for a witness version.
fn checksum_const(version: u8) -> u32 {
    if version == 0 {
        BECH32_CONST
    } else {
        BECH32M_CONST
    }
}

fn encode_segwit(hrp: &str, version: u8, program: &[u8]) -> String {
    let data_5bit = convert_bits(program, 8, 5, true).unwrap_or_default();

    let mut payload = Vec::with_capacity(1 + data_5bit.len());
    payload.push(version);
    payload.extend_from_slice(&data_5bit);

    let checksum = create_checksum(hrp, &payload, checksum_const(version));

    let mut result = String::with_capacity(hrp.len() + 1 + payload.len() + 6);
    result.push_str(hrp);
    result.push('1');
    for &d in payload.iter().chain(checksum.iter()) {
        result.push(CHARSET[d as usize] as char);
    }
    result
}

fn decode_segwit(s: &str) -> Result<(u8, Vec<u8>), AddressError> {
    if s.len() > BECH32_MAX_LEN {
        return Err(AddressError::InvalidLength);
    }

    // Reject mixed case (all alpha chars must be same case)
    let has_lower = s.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = s.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(AddressError::MixedCase);
    }

    let s_lower = s.to_ascii_lowercase();
    let sep_pos = s_lower.rfind('1').ok_or(AddressError::MissingSeparator)?;

    // Need at least 6 checksum chars + 1 version char after separator
    if sep_pos + 8 > s_lower.len() {
        return Err(AddressError::InvalidLength);
    }

    let hrp = &s_lower[..sep_pos];
    let data_part = &s_lower[sep_pos + 1..];

    let mut data = Vec::with_capacity(data_part.len());
    for c in data_part.chars() {
        let pos = CHARSET
            .iter()
            .position(|&ch| ch as char == c)
            .ok_or(AddressError::InvalidCharacter(c))?;
        data.push(pos as u8);
    }

    let residue = polymod_with_hrp(hrp, &data);
    let payload = &data[..data.len() - 6];
    let version = payload[0];
    if version > 16 {
        return Err(AddressError::InvalidWitnessVersion(version));
    }
    if residue != checksum_const(version) {
        return if residue == BECH32_CONST || residue == BECH32M_CONST {
            Err(AddressError::WrongVariant(version))
        } else {
            Err(AddressError::InvalidChecksum)
        };
    }

    let program = convert_bits(&payload[1..], 5, 8, false).ok_or(AddressError::InvalidPadding)?;
    validate_witness_program(version, &program)?;
    Ok((version, program))
}

/// Compute the Bech32 polymod over a sequence of 5-bit values.
fn polymod(values: &[u8]) -> u32 {
    const GEN: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];
    let mut chk: u32 = 1;
    for &v in values {
        let b = chk >> 25;
        chk = ((chk & 0x1ffffff) << 5) ^ (v as u32);
        for (i, &g) in GEN.iter().enumerate() {
            if (b >> i) & 1 != 0 {
                chk ^= g;
            }
        }
    }
    chk
}

/// Expand the HRP for checksum computation.
fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut ret = Vec::with_capacity(hrp.len() * 2 + 1);
    for c in hrp.bytes() {
        ret.push(c >> 5);
    }
    ret.push(0);
    for c in hrp.bytes() {
        ret.push(c & 31);
    }
    ret
}

fn polymod_with_hrp(hrp: &str, data: &[u8]) -> u32 {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    polymod(&values)
}

/// Create the 6-value checksum for the given HRP, data and variant constant.
fn create_checksum(hrp: &str, data: &[u8], constant: u32) -> Vec<u8> {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    let polymod = polymod(&values) ^ constant;
    (0..6)
        .map(|i| ((polymod >> (5 * (5 - i))) & 31) as u8)
        .collect()
}

/// Convert between bit widths (e.g. 8-bit bytes to 5-bit Bech32 groups).
fn convert_bits(data: &[u8], from_bits: u32, to_bits: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut ret = Vec::new();
    let maxv = (1u32 << to_bits) - 1;
    for &value in data {
        let v = value as u32;
        if v >> from_bits != 0 {
            return None;
        }
        acc = (acc << from_bits) | v;
        bits += from_bits;
        while bits >= to_bits {
            bits -= to_bits;
            ret.push(((acc >> bits) & maxv) as u8);
        }
    }
    if pad {
        if bits > 0 {
            ret.push(((acc << (to_bits - bits)) & maxv) as u8);
        }
    } else if bits >= from_bits || ((acc << (to_bits - bits)) & maxv) != 0 {
        return None;
    }
    Some(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;

    fn script_hex(addr: &Address) -> String {
        hex::encode(addr.script_pubkey().as_bytes())
    }

    fn assert_witness_vector(s: &str, coin: Coin, script: &str) {
        let addr: Address = s.parse().unwrap();
        assert_eq!(addr.coin(), coin);
        assert_eq!(script_hex(&addr), script);
        assert_eq!(addr.encode(), s.to_ascii_lowercase());
    }

    const GENERATOR_HASH160: &str = "751e76e8199196d454941c45d1b3a323f1433bd6";

    fn generator_hash() -> [u8; 20] {
        hex::decode(GENERATOR_HASH160).unwrap().try_into().unwrap()
    }

    // --- Base58Check ---

    #[test]
    fn p2pkh_known_vector() {
        let addr = Address::from_pubkey_hash(generator_hash(), Coin::Bitcoin);
        assert_eq!(addr.encode(), "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
    }

    #[test]
    fn p2pkh_from_key_one() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let key = PrivateKey::from_bytes(&secret, Coin::Bitcoin).unwrap();
        let addr = Address::from_public_key(&key.public_key(), Coin::Bitcoin);
        assert_eq!(addr.to_string(), "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
    }

    #[test]
    fn p2pkh_decode_known_vector() {
        let addr: Address = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH".parse().unwrap();
        assert_eq!(addr.coin(), Coin::Bitcoin);
        assert_eq!(addr.pubkey_hash(), Some(generator_hash()));
        assert_eq!(
            script_hex(&addr),
            format!("76a914{GENERATOR_HASH160}88ac")
        );
    }

    #[test]
    fn base58_roundtrip_all_coins() {
        for coin in Coin::ALL {
            let p2pkh = Address::from_pubkey_hash([0x42; 20], coin);
            assert_eq!(Address::decode(&p2pkh.encode()).unwrap(), p2pkh);

            let p2sh = Address::from_script_hash([0x42; 20], coin);
            assert_eq!(Address::decode(&p2sh.encode()).unwrap(), p2sh);
        }
    }

    #[test]
    fn mainnet_prefixes() {
        assert!(Address::from_pubkey_hash([1; 20], Coin::Bitcoin).encode().starts_with('1'));
        assert!(Address::from_script_hash([1; 20], Coin::Bitcoin).encode().starts_with('3'));
        assert!(Address::from_pubkey_hash([1; 20], Coin::Litecoin).encode().starts_with('L'));
        let testnet = Address::from_pubkey_hash([1; 20], Coin::BitcoinTestnet).encode();
        assert!(testnet.starts_with('m') || testnet.starts_with('n'));
    }

    #[test]
    fn p2sh_decodes_as_script_hash() {
        let addr: Address = "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy".parse().unwrap();
        assert_eq!(addr.coin(), Coin::Bitcoin);
        assert!(matches!(addr.payload(), Payload::ScriptHash(_)));
        assert_eq!(addr.pubkey_hash(), None);
        assert!(addr.script_pubkey().is_p2sh());
    }

    #[test]
    fn legacy_litecoin_script_hash_decodes_as_bitcoin() {
        // Version 0x05 belongs to Bitcoin; old Litecoin `3...` addresses share it.
        let legacy = base58check(0x05, &[0x42; 20]);
        let addr = Address::decode(&legacy).unwrap();
        assert_eq!(addr.coin(), Coin::Bitcoin);
        assert_eq!(addr, Address::from_script_hash([0x42; 20], Coin::Bitcoin));
        assert_ne!(addr, Address::from_script_hash([0x42; 20], Coin::Litecoin));
    }

    #[test]
    fn base58_bad_checksum() {
        // Last character altered.
        let err = Address::decode("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMJ").unwrap_err();
        assert_eq!(err, AddressError::InvalidChecksum);
    }

    #[test]
    fn base58_invalid_character() {
        let err = Address::decode("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAM0").unwrap_err();
        assert!(matches!(err, AddressError::InvalidBase58(_)));
    }

    #[test]
    fn base58_unknown_version() {
        let s = bs58::encode([&[0x99u8][..], &[0u8; 20]].concat()).with_check().into_string();
        assert_eq!(Address::decode(&s).unwrap_err(), AddressError::InvalidVersion(0x99));
    }

    #[test]
    fn base58_wrong_length() {
        let s = bs58::encode([0u8; 10]).with_check().into_string();
        assert_eq!(Address::decode(&s).unwrap_err(), AddressError::InvalidLength);
    }

    // --- Bech32 / Bech32m ---

    #[test]
    fn bech32_v0_known_vector() {
        let addr: Address = "BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4".parse().unwrap();
        assert_eq!(addr.coin(), Coin::Bitcoin);
        assert_eq!(script_hex(&addr), format!("0014{GENERATOR_HASH160}"));
        assert_eq!(addr.encode(), "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");
    }

    #[test]
    fn bech32m_v1_known_vector() {
        let addr: Address = "bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqzk5jj0"
            .parse()
            .unwrap();
        assert_eq!(
            script_hex(&addr),
            "512079be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn bip173_script_hash_vectors() {
        let p2wsh = "00201863143c14c5166804bd19203356da136c985678cd4d27a1b8c6329604903262";
        assert_witness_vector(
            "bc1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3qccfmv3",
            Coin::Bitcoin,
            p2wsh,
        );
        assert_witness_vector(
            "tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sl5k7",
            Coin::BitcoinTestnet,
            p2wsh,
        );
        assert_witness_vector(
            "tb1qqqqqp399et2xygdj5xreqhjjvcmzhxw4aywxecjdzew6hylgvsesrxh6hy",
            Coin::BitcoinTestnet,
            "0020000000c4a5cad46221b2a187905e5266362b99d5e91c6ce24d165dab93e86433",
        );
    }

    #[test]
    fn bip350_vectors() {
        assert_witness_vector(
            "bc1pw508d6qejxtdg4y5r3zarvary0c5xw7kw508d6qejxtdg4y5r3zarvary0c5xw7kt5nd6y",
            Coin::Bitcoin,
            "5128751e76e8199196d454941c45d1b3a323f1433bd6751e76e8199196d454941c45d1b3a323f1433bd6",
        );
        assert_witness_vector("BC1SW50QGDZ25J", Coin::Bitcoin, "6002751e");
        assert_witness_vector(
            "tb1pqqqqp399et2xygdj5xreqhjjvcmzhxw4aywxecjdzew6hylgvsesf3hn0c",
            Coin::BitcoinTestnet,
            "5120000000c4a5cad46221b2a187905e5266362b99d5e91c6ce24d165dab93e86433",
        );
    }

    #[test]
    fn bip350_rejects_checksum_of_other_variant() {
        // Valid under BIP-173, but v1+ now requires Bech32m.
        let old_v1 = "bc1pw508d6qejxtdg4y5r3zarvary0c5xw7kw508d6qejxtdg4y5r3zarvary0c5xw7k7grplx";
        assert_eq!(Address::decode(old_v1).unwrap_err(), AddressError::WrongVariant(1));
        let bech32_v1 = "bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqh2y7hd";
        assert_eq!(Address::decode(bech32_v1).unwrap_err(), AddressError::WrongVariant(1));
        let bech32m_v0 = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kemeawh";
        assert_eq!(Address::decode(bech32m_v0).unwrap_err(), AddressError::WrongVariant(0));
    }

    #[test]
    fn segwit_roundtrip() {
        for coin in Coin::ALL {
            let v0 = Address::from_witness_program(0, vec![0xAB; 32], coin).unwrap();
            assert_eq!(Address::decode(&v0.encode()).unwrap(), v0);
            let v1 = Address::from_witness_program(1, vec![0xCD; 32], coin).unwrap();
            assert_eq!(Address::decode(&v1.encode()).unwrap(), v1);
        }
    }

    #[test]
    fn segwit_rejects_wrong_variant() {
        // A v1 program encoded with the v0 (Bech32) checksum.
        let hrp = "bc";
        let mut payload = vec![1u8];
        payload.extend(convert_bits(&[0xCD; 32], 8, 5, true).unwrap());
        let checksum = create_checksum(hrp, &payload, BECH32_CONST);
        let mut s = String::from("bc1");
        for &d in payload.iter().chain(checksum.iter()) {
            s.push(CHARSET[d as usize] as char);
        }
        assert_eq!(Address::decode(&s).unwrap_err(), AddressError::WrongVariant(1));
    }

    #[test]
    fn segwit_rejects_mixed_case() {
        let err = Address::decode("bc1qW508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4").unwrap_err();
        assert_eq!(err, AddressError::MixedCase);
    }

    #[test]
    fn segwit_rejects_bad_checksum() {
        let err = Address::decode("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5").unwrap_err();
        assert_eq!(err, AddressError::InvalidChecksum);
    }

    #[test]
    fn witness_program_validation() {
        assert_eq!(
            Address::from_witness_program(0, vec![0; 25], Coin::Bitcoin).unwrap_err(),
            AddressError::InvalidProgramLength(25)
        );
        assert_eq!(
            Address::from_witness_program(17, vec![0; 32], Coin::Bitcoin).unwrap_err(),
            AddressError::InvalidWitnessVersion(17)
        );
        assert_eq!(
            Address::from_witness_program(2, vec![0; 41], Coin::Bitcoin).unwrap_err(),
            AddressError::InvalidProgramLength(41)
        );
    }

    #[test]
    fn from_script_recovers_every_kind() {
        let addrs = [
            Address::from_pubkey_hash([1; 20], Coin::Bitcoin),
            Address::from_script_hash([2; 20], Coin::Bitcoin),
            Address::from_witness_program(0, vec![3; 20], Coin::Bitcoin).unwrap(),
            Address::from_witness_program(1, vec![4; 32], Coin::Bitcoin).unwrap(),
        ];
        for addr in addrs {
            assert_eq!(Address::from_script(&addr.script_pubkey(), Coin::Bitcoin), Some(addr));
        }
        let bare = ScriptBuf::from_bytes(vec![0xac]);
        assert_eq!(Address::from_script(&bare, Coin::Bitcoin), None);
        let op_return = ScriptBuf::from_bytes(vec![0x6a, 0x01, 0x00]);
        assert_eq!(Address::from_script(&op_return, Coin::Bitcoin), None);
    }

    // --- Serde / equality ---

    #[test]
    fn serde_json_roundtrip() {
        let addr = Address::from_pubkey_hash(generator_hash(), Coin::Bitcoin);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn equality_is_structural() {
        let a = Address::from_pubkey_hash([5; 20], Coin::Bitcoin);
        let b = Address::from_pubkey_hash([5; 20], Coin::Bitcoin);
        let c = Address::from_pubkey_hash([5; 20], Coin::BitcoinTestnet);
        let d = Address::from_script_hash([5; 20], Coin::Bitcoin);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }
}
