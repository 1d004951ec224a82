//! Configuration management
//!
//! Loads store settings from `config.toml` with `SANDFS_*` environment
//! overrides. Every field carries a default so the crate works without a
//! config file.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::provider::DEFAULT_QUOTA_BYTES;

/// Sandbox store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Directory holding the sandboxed store
    pub root_dir: String,

    /// Default persistent-storage quota in bytes
    pub quota_bytes: u64,

    /// Default window size for chunked reads
    pub chunk_size: u64,

    /// Batch size for paginated directory enumeration
    pub page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            root_dir: "./sandbox_root".to_string(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            chunk_size: 1024,
            page_size: 64,
        }
    }
}

impl StoreConfig {
    /// Load configuration from config.toml with environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        let defaults = StoreConfig::default();
        let settings = Config::builder()
            .set_default("root_dir", defaults.root_dir)?
            .set_default("quota_bytes", defaults.quota_bytes)?
            .set_default("chunk_size", defaults.chunk_size)?
            .set_default("page_size", defaults.page_size as u64)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("SANDFS"))
            .build()?;

        let config: StoreConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.root_dir.is_empty() {
            return Err(config::ConfigError::Message(
                "root_dir cannot be empty".into(),
            ));
        }
        if self.quota_bytes == 0 {
            return Err(config::ConfigError::Message(
                "quota_bytes must be greater than 0".into(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(config::ConfigError::Message(
                "chunk_size must be greater than 0".into(),
            ));
        }
        if self.page_size == 0 {
            return Err(config::ConfigError::Message(
                "page_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
