// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry configuration.
//!
//! Supports both programmatic and file-based configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cache::DEFAULT_CACHE_CAPACITY;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Schema registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum number of synthesized descriptions kept in memory.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Record user and host on newly created generations.
    #[serde(default = "default_true")]
    pub capture_provenance: bool,

    /// SQLite database file. `None` keeps history in memory.
    #[serde(default)]
    pub sqlite_path: Option<PathBuf>,
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_true() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            capture_provenance: true,
            sqlite_path: None,
        }
    }
}

impl RegistryConfig {
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::default()
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache_capacity must be greater than zero".into(),
            ));
        }
        if let Some(path) = &self.sqlite_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("sqlite_path is empty".into()));
            }
        }
        Ok(())
    }
}

/// Builder for [`RegistryConfig`].
#[derive(Debug, Default)]
pub struct RegistryConfigBuilder {
    config: RegistryConfig,
}

impl RegistryConfigBuilder {
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    pub fn capture_provenance(mut self, capture: bool) -> Self {
        self.config.capture_provenance = capture;
        self
    }

    pub fn sqlite_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.sqlite_path = Some(path.into());
        self
    }

    /// Build and validate.
    pub fn build(self) -> Result<RegistryConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.cache_capacity, 256);
        assert!(config.capture_provenance);
        assert!(config.sqlite_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml() {
        let config = RegistryConfig::from_toml_str(
            r#"
            cache_capacity = 16
            sqlite_path = "/var/lib/app/history.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.cache_capacity, 16);
        assert!(config.capture_provenance);
        assert_eq!(
            config.sqlite_path.as_deref(),
            Some(Path::new("/var/lib/app/history.db"))
        );
    }

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(
            RegistryConfig::from_toml_str("").unwrap(),
            RegistryConfig::default()
        );
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = RegistryConfig::from_toml_str("cache_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(RegistryConfig::builder().cache_capacity(0).build().is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = RegistryConfig::from_toml_str("cache_capacity = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.toml");
        std::fs::write(&path, "capture_provenance = false\n").unwrap();

        let config = RegistryConfig::from_file(&path).unwrap();
        assert!(!config.capture_provenance);

        let missing = RegistryConfig::from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }

    #[test]
    fn builder_sets_fields() {
        let config = RegistryConfig::builder()
            .cache_capacity(8)
            .capture_provenance(false)
            .sqlite_path("history.db")
            .build()
            .unwrap();
        assert_eq!(config.cache_capacity, 8);
        assert!(!config.capture_provenance);
        assert_eq!(config.sqlite_path, Some(PathBuf::from("history.db")));
    }
}
