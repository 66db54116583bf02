//! Configuration management for the siebwerk pipeline
//!
//! This module handles loading and validating configuration from environment
//! variables, files, and command-line arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::corpus::ExportOptions;
use crate::normalize::NormalizeOptions;
use crate::pipeline::PipelineConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration
    pub storage: StorageConfig,

    /// Worker pool configuration
    pub pipeline: PipelineConfig,

    /// Normalization toggles applied by the cleaning commands
    pub normalize: NormalizeOptions,

    /// Corpus export parameters
    pub export: ExportOptions,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/siebwerk.db"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = std::env::var("SIEBWERK_DB_PATH").ok().filter(|v| !v.is_empty()) {
            config.storage.db_path = PathBuf::from(path);
        }
        if let Some(workers) = std::env::var("SIEBWERK_WORKERS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            config.pipeline.workers = workers;
        }
        if let Some(min_tokens) = std::env::var("SIEBWERK_MIN_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            config.export.min_tokens = min_tokens;
        }
        if let Some(batch_size) = std::env::var("SIEBWERK_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.export.batch_size = batch_size;
        }
        if let Some(seed) = std::env::var("SIEBWERK_SEED")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.export.seed = seed;
        }
        if let Ok(level) = std::env::var("SIEBWERK_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("SIEBWERK_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.workers == 0 {
            anyhow::bail!("workers must be greater than 0");
        }

        if self.pipeline.channel_buffer_size == 0 {
            anyhow::bail!("channel_buffer_size must be greater than 0");
        }

        if self.pipeline.page_size == 0 {
            anyhow::bail!("page_size must be greater than 0");
        }

        if self.export.batch_size == 0 {
            anyhow::bail!("batch_size must be greater than 0");
        }

        if self.storage.db_path.as_os_str().is_empty() {
            anyhow::bail!("db_path must not be empty");
        }

        Ok(())
    }

    #[must_use]
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage.db_path = path.into();
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.pipeline.workers = workers;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.db_path, PathBuf::from("data/siebwerk.db"));
        assert_eq!(config.export.min_tokens, 5);
        assert_eq!(config.export.batch_size, 10_000);
        assert_eq!(config.export.seed, 1234);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = Config::default();
        config.pipeline.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = Config::default();
        config.export.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_db_path("/tmp/other.db")
            .with_workers(8);
        assert_eq!(config.storage.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.pipeline.workers, 8);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            db_path = "corpus.db"

            [export]
            min_tokens = 3

            [normalize]
            genderstar = true
            remove_punctuation = true
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.db_path, PathBuf::from("corpus.db"));
        assert_eq!(config.export.min_tokens, 3);
        assert_eq!(config.export.seed, 1234);
        assert!(config.normalize.genderstar);
        assert!(!config.normalize.lowercase);
        assert_eq!(config.pipeline.workers, 4);
    }
}
