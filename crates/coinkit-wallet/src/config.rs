//! Wallet configuration.
//!
//! Provides [`WalletConfig`] with defaults for the coin, fee policy and
//! provider endpoint. Values are layered: built-in defaults, then an optional
//! TOML file, then `COINKIT_*` environment variables (e.g.
//! `COINKIT_FEE_PER_BYTE=5`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use coinkit_core::coin::Coin;
use coinkit_core::constants::{DEFAULT_FEE_PER_BYTE, DUST_THRESHOLD};
use serde::{Deserialize, Serialize};

use crate::coin_selection::FeePolicy;
use crate::error::WalletError;
use crate::provider::EsploraProvider;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "COINKIT";

/// Settings for building a production wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Ledger the wallet operates on.
    pub coin: Coin,
    /// Fee rate in satoshis per estimated byte.
    pub fee_per_byte: u64,
    /// Change below this is treated as dust by the selector.
    pub dust_threshold: u64,
    /// Esplora base URL. Falls back to the coin's public endpoint.
    pub provider_url: Option<String>,
    /// HTTP request timeout for the provider.
    pub request_timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            coin: Coin::Bitcoin,
            fee_per_byte: DEFAULT_FEE_PER_BYTE,
            dust_threshold: DUST_THRESHOLD,
            provider_url: None,
            request_timeout_secs: 30,
        }
    }
}

impl WalletConfig {
    /// `<config dir>/coinkit/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("coinkit").join("config.toml"))
    }

    /// Load from an optional file plus the process environment.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(path: Option<&Path>) -> Result<Self, WalletError> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load) but reads variables from `env` instead of
    /// the process environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, WalletError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        );

        let cfg: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| WalletError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings no wallet can operate with.
    pub fn validate(&self) -> Result<(), WalletError> {
        if self.fee_per_byte == 0 {
            return Err(WalletError::Config("fee_per_byte must be positive".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(WalletError::Config("request_timeout_secs must be positive".into()));
        }
        if let Some(url) = &self.provider_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(WalletError::Config(format!("provider_url {url} is not http(s)")));
            }
        }
        Ok(())
    }

    pub fn fee_policy(&self) -> FeePolicy {
        FeePolicy {
            fee_per_byte: self.fee_per_byte,
            dust_threshold: self.dust_threshold,
            ..FeePolicy::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured provider URL, or the coin's public endpoint.
    pub fn resolved_provider_url(&self) -> Result<String, WalletError> {
        match &self.provider_url {
            Some(url) => Ok(url.clone()),
            None => EsploraProvider::default_url(self.coin)
                .map(str::to_owned)
                .ok_or(WalletError::UnsupportedCoin(self.coin)),
        }
    }
}
