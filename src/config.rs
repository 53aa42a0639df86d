//! Configuration loading from TOML with environment variable overrides.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The upstream URL and the snapshot path can be overridden through
//! `QUINALAB_SOURCE_URL` and `QUINALAB_STORE_PATH` for tests and mirrors.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Upstream results endpoint; `None` uses the official Caixa URL.
    #[serde(default)]
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Snapshot file for the draw history; `None` uses the default path.
    #[serde(default)]
    pub path: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply env overrides.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;

        if let Ok(url) = std::env::var("QUINALAB_SOURCE_URL") {
            config.source.base_url = Some(url);
        }
        if let Ok(store_path) = std::env::var("QUINALAB_STORE_PATH") {
            config.storage.path = Some(store_path);
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { port: 5055 },
            source: SourceConfig {
                base_url: None,
                timeout_secs: 10,
            },
            storage: StorageConfig { path: None },
        }
    }
}
