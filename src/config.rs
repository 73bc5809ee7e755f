//! Configuration management for LedgerChain

use crate::blockchain::GenesisSecret;
use crate::error::{ChainError, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_GENESIS_SECRET: &str = "ledgerchain-genesis";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub genesis: GenesisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Clone, Deserialize)]
pub struct GenesisConfig {
    #[serde(default = "default_genesis_secret")]
    pub secret: String,
}

impl std::fmt::Debug for GenesisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenesisConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_api_port(),
        }
    }
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            secret: default_genesis_secret(),
        }
    }
}

fn default_storage_path() -> String {
    "./data/blockchain.json".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    3000
}

fn default_genesis_secret() -> String {
    DEFAULT_GENESIS_SECRET.to_string()
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ChainError::ConfigError(e.to_string()))
    }

    pub fn genesis_secret(&self) -> GenesisSecret {
        GenesisSecret::new(self.genesis.secret.clone())
    }

    pub fn api_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.api.host, self.api.port)
            .parse()
            .map_err(|e| {
                ChainError::ConfigError(format!(
                    "invalid api address {}:{}: {}",
                    self.api.host, self.api.port, e
                ))
            })
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var("LEDGER_GENESIS_SECRET").ok(),
            std::env::var("PORT").ok(),
        )
    }

    fn apply_overrides(&mut self, secret: Option<String>, port: Option<String>) -> Result<()> {
        if let Some(secret) = secret {
            self.genesis.secret = secret;
        }
        if let Some(port) = port {
            self.api.port = port.trim().parse::<u16>().map_err(|e| {
                ChainError::ConfigError(format!("invalid PORT {:?}: {}", port, e))
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.storage.path.trim().is_empty() {
            return Err(ChainError::ConfigError(
                "storage.path must be set in config.toml".to_string(),
            ));
        }
        if self.genesis.secret.is_empty() {
            return Err(ChainError::ConfigError(
                "genesis.secret must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

/// Reads `path` if it exists, falls back to defaults otherwise, then applies
/// environment overrides and validates.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let mut config = match fs::read_to_string(path) {
        Ok(content) => Config::from_toml_str(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(e) => {
            return Err(ChainError::ConfigError(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    config.apply_env_overrides()?;
    config.validate()?;

    if config.genesis.secret == DEFAULT_GENESIS_SECRET {
        warn!("using the built-in genesis secret; set genesis.secret or LEDGER_GENESIS_SECRET");
    }

    Ok(config)
}
