//! Configuration system for tgaudit.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;

/// Main configuration struct for tgaudit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Working directories
    pub dirs: DirsConfig,
    /// Remote client tuning
    pub client: ClientTuning,
    /// Format conversion settings
    pub convert: ConvertConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dirs: DirsConfig::default(),
            client: ClientTuning::default(),
            convert: ConvertConfig::default(),
        }
    }
}

/// The three working directories the pipeline provisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirsConfig {
    /// Directory scanned for session/metadata pairs
    pub base: PathBuf,
    /// Where operators park accounts with malformed metadata
    pub errors: PathBuf,
    /// Where operators park banned accounts
    pub banned: PathBuf,
}

impl Default for DirsConfig {
    fn default() -> Self {
        Self {
            base: PathBuf::from("sessions"),
            errors: PathBuf::from("errors"),
            banned: PathBuf::from("banned"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientTuning {
    /// Connection attempts before the client gives up
    pub connection_retries: u32,
    /// Request retries inside the client
    pub request_retries: u32,
    /// Connect timeout in seconds
    pub timeout_secs: u64,
    /// Log full diagnostic detail for unexpected check failures
    pub debug: bool,
}

impl Default for ClientTuning {
    fn default() -> Self {
        Self {
            connection_retries: 50,
            request_retries: 50,
            timeout_secs: 10,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Proxy specification injected into every converted record
    pub proxy: Option<String>,
    /// Persist updated metadata back to its file
    pub write_json: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            write_json: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, figment::Error> {
        let config_dir = Self::config_dir();

        Figment::new()
            // Default values
            .merge(figment::providers::Serialized::defaults(Config::default()))
            // User config
            .merge(Toml::file(config_dir.join("config.toml")))
            // Project config
            .merge(Toml::file(".tgaudit/config.toml"))
            // Environment variables
            .merge(Env::prefixed("TGAUDIT_").split("_"))
            .extract()
    }

    /// Load and validate configuration.
    pub fn load_validated() -> Result<Self, Error> {
        let config = Self::load().map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), Error> {
        if self.client.timeout_secs == 0 {
            return Err(Error::Config(
                "client.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.dirs.base.as_os_str().is_empty() {
            return Err(Error::Config("dirs.base cannot be empty".to_string()));
        }
        if let Some(ref proxy) = self.convert.proxy {
            if proxy.trim().is_empty() {
                return Err(Error::Config(
                    "convert.proxy is set but empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Get the configuration directory.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("tgaudit"))
            .unwrap_or_else(|| PathBuf::from("~/.config/tgaudit"))
    }
}
