//! Service configuration.
//!
//! Loaded from a JSON file (`feedcast.json` by default); every field has a
//! sensible default so a minimal file is enough to start.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    #[error("config file '{path}' is not valid JSON: {reason}")]
    Invalid { path: String, reason: String },
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl HttpConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the index log and the persisted schema.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Operator-authored schema config file.
    #[serde(default = "default_schema_config")]
    pub schema_config: PathBuf,

    #[serde(default)]
    pub http: HttpConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_schema_config() -> PathBuf {
    PathBuf::from("./schema-config.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            schema_config: default_schema_config(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Reads a config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Where the append-only feed index log lives.
    pub fn index_log_path(&self) -> PathBuf {
        self.data_dir.join("feeds.log")
    }

    /// Well-known location of the persisted canonical schema.
    pub fn schema_output_path(&self) -> PathBuf {
        self.data_dir.join("schemas").join("feed.json")
    }
}
