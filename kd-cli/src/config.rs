//! `kd.toml` configuration.
//!
//! Every section and key is optional; a missing file means defaults.
//!
//! ```toml
//! [storage]
//! backend = "sqlite"
//! connection_string = "kd.db"
//! namespace = "kd_calculator_"
//!
//! [leads]
//! webhook_url = "https://script.google.com/macros/s/.../exec"
//! outbox = "leads.jsonl"
//!
//! [rates]
//! endpoint = "https://finans.truncgil.com/v3/today.json"
//! interval_secs = 300
//!
//! [logging]
//! level = "info"
//! file = "kd.log"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kd_core::store::{DEFAULT_NAMESPACE, StoreConfig};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "kd.toml";
pub const DEFAULT_RATES_ENDPOINT: &str = "https://finans.truncgil.com/v3/today.json";
pub const DEFAULT_RATES_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub leads: LeadsConfig,
    pub rates: RatesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: String,
    pub connection_string: String,
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let store = StoreConfig::default();
        Self {
            backend: store.backend,
            connection_string: store.connection_string,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl StorageConfig {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            backend: self.backend.clone(),
            connection_string: self.connection_string.clone(),
        }
    }
}

/// Where captured leads go. The webhook wins when both are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadsConfig {
    pub webhook_url: Option<String>,
    pub outbox: PathBuf,
}

impl Default for LeadsConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            outbox: PathBuf::from("leads.jsonl"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    pub endpoint: String,
    pub interval_secs: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RATES_ENDPOINT.to_string(),
            interval_secs: DEFAULT_RATES_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Bare level or full `EnvFilter` directive. `RUST_LOG` takes precedence.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Reads `path`, or returns defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config at {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
