//! Configuration for RocketStore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Main configuration for a RocketStore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files (the storage area)
    /// Internal structure:
    ///   {storage_area}/
    ///     ├── {collection}/{key}   (one JSON record per file)
    ///     ├── {name}_seq           (sequence counters)
    ///     └── lockfile/{name}      (lock markers, transient)
    pub storage_area: PathBuf,

    /// On-disk encoding of records
    pub data_format: DataFormat,

    // -------------------------------------------------------------------------
    // Lock Configuration
    // -------------------------------------------------------------------------
    /// Wait between attempts to take a contended sequence lock
    pub lock_retry_interval: Duration,

    /// Guard sequence counters with lock markers
    pub lock_files: bool,

    // -------------------------------------------------------------------------
    // Validation Configuration
    // -------------------------------------------------------------------------
    /// Rule set applied to collection names
    pub name_check: NameCheck,
}

/// Record encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// JSON text
    Json,

    /// Whatever the platform considers native; resolves to JSON
    Native,

    /// Not implemented
    Xml,

    /// Not implemented
    Php,
}

/// Collection name rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCheck {
    /// Identifier-like names only: `[A-Za-z_$][A-Za-z0-9_$]*`
    Strict,

    /// Anything that is a single safe path segment
    Relaxed,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_area: std::env::temp_dir().join("rsdb"),
            data_format: DataFormat::Native,
            lock_retry_interval: Duration::from_millis(13),
            lock_files: true,
            name_check: NameCheck::Strict,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config and normalize the data format
    ///
    /// `Native` becomes `Json`; formats without an encoder are rejected
    /// rather than silently written as something else.
    pub fn validate(mut self) -> Result<Self> {
        if self.storage_area.as_os_str().is_empty() {
            return Err(StoreError::Config(
                "Data storage area must be a directory path".to_string(),
            ));
        }

        self.data_format = match self.data_format {
            DataFormat::Json | DataFormat::Native => DataFormat::Json,
            other => {
                return Err(StoreError::Config(format!(
                    "Unsupported data format: {:?}",
                    other
                )))
            }
        };

        Ok(self)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the storage area (root for all records and sequences)
    pub fn storage_area(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage_area = path.into();
        self
    }

    /// Set the record data format
    pub fn data_format(mut self, format: DataFormat) -> Self {
        self.config.data_format = format;
        self
    }

    /// Set the lock retry interval
    pub fn lock_retry_interval(mut self, interval: Duration) -> Self {
        self.config.lock_retry_interval = interval;
        self
    }

    /// Set the lock retry interval (in milliseconds)
    pub fn lock_retry_interval_ms(mut self, ms: u64) -> Self {
        self.config.lock_retry_interval = Duration::from_millis(ms);
        self
    }

    /// Enable or disable sequence lock markers
    pub fn lock_files(mut self, enabled: bool) -> Self {
        self.config.lock_files = enabled;
        self
    }

    /// Set the collection name rule set
    pub fn name_check(mut self, check: NameCheck) -> Self {
        self.config.name_check = check;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
