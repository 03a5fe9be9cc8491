//! Ledger identities and their address/key encoding parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoinError;

/// A UTXO ledger the primitives know how to encode for.
///
/// Each coin fixes the Base58Check version bytes, the WIF prefix and the
/// Bech32 human-readable part used by its addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Coin {
    /// Bitcoin mainnet (`1...`, `3...`, `bc1...`).
    Bitcoin,
    /// Bitcoin testnet (`m...`/`n...`, `2...`, `tb1...`).
    BitcoinTestnet,
    /// Litecoin mainnet (`L...`, `M...`, `ltc1...`).
    Litecoin,
}

impl Coin {
    /// Every coin, in declaration order.
    pub const ALL: [Coin; 3] = [Coin::Bitcoin, Coin::BitcoinTestnet, Coin::Litecoin];

    /// Base58Check version byte for pay-to-pubkey-hash addresses.
    pub fn p2pkh_version(&self) -> u8 {
        match self {
            Coin::Bitcoin => 0x00,
            Coin::BitcoinTestnet => 0x6f,
            Coin::Litecoin => 0x30,
        }
    }

    /// Base58Check version byte for pay-to-script-hash addresses.
    pub fn p2sh_version(&self) -> u8 {
        match self {
            Coin::Bitcoin => 0x05,
            Coin::BitcoinTestnet => 0xc4,
            Coin::Litecoin => 0x32,
        }
    }

    /// Version byte prefixed to WIF-encoded private keys.
    pub fn wif_prefix(&self) -> u8 {
        match self {
            Coin::Bitcoin => 0x80,
            Coin::BitcoinTestnet => 0xef,
            Coin::Litecoin => 0xb0,
        }
    }

    /// Bech32 human-readable part for witness addresses.
    pub fn hrp(&self) -> &'static str {
        match self {
            Coin::Bitcoin => "bc",
            Coin::BitcoinTestnet => "tb",
            Coin::Litecoin => "ltc",
        }
    }

    /// Stable lowercase name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Coin::Bitcoin => "bitcoin",
            Coin::BitcoinTestnet => "bitcoin-testnet",
            Coin::Litecoin => "litecoin",
        }
    }

    /// Look up the coin owning a Base58Check version byte.
    ///
    /// Returns the coin and whether the byte denotes a script hash.
    ///
    /// Litecoin's legacy P2SH version `0x05` is Bitcoin's, so old Litecoin
    /// `3...` addresses decode as Bitcoin. Only `0x32` (`M...`) maps to
    /// Litecoin.
    pub fn from_base58_version(version: u8) -> Option<(Coin, bool)> {
        Self::ALL.into_iter().find_map(|coin| {
            if coin.p2pkh_version() == version {
                Some((coin, false))
            } else if coin.p2sh_version() == version {
                Some((coin, true))
            } else {
                None
            }
        })
    }

    /// Look up the coin owning a WIF prefix byte.
    pub fn from_wif_prefix(prefix: u8) -> Option<Coin> {
        Self::ALL.into_iter().find(|coin| coin.wif_prefix() == prefix)
    }

    /// Look up the coin owning a Bech32 human-readable part.
    pub fn from_hrp(hrp: &str) -> Option<Coin> {
        Self::ALL.into_iter().find(|coin| coin.hrp() == hrp)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Coin {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bitcoin" | "btc" | "mainnet" => Ok(Coin::Bitcoin),
            "bitcoin-testnet" | "testnet" | "tbtc" => Ok(Coin::BitcoinTestnet),
            "litecoin" | "ltc" => Ok(Coin::Litecoin),
            _ => Err(CoinError::UnknownCoin(s.to_string())),
        }
    }
}
