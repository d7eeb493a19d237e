//! Client configuration via `docstore.toml`
//!
//! A client is configured by a small TOML file. [`DocumentClient::open_in`]
//! writes a commented default into the data directory on first use; edit it
//! and reopen to change settings.
//!
//! [`DocumentClient::open_in`]: crate::DocumentClient::open_in

use crate::meter::{NoopMeter, RequestMeter, SizeBasedMeter};
use docstore_core::{Error, Result, MAX_DOCUMENT_SIZE};
use docstore_storage::{ContainerOptions, PartitionRouter};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Config file name placed in the data directory.
pub const CONFIG_FILE_NAME: &str = "docstore.toml";

/// Client configuration loaded from `docstore.toml`.
///
/// # Example
///
/// ```toml
/// partition_count = 16
/// max_item_count = 100
/// max_document_size = 2097152
/// request_meter = "none"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Partition buckets per container (1..=4096).
    #[serde(default = "default_partition_count")]
    pub partition_count: u32,
    /// Largest page a feed iterator returns.
    #[serde(default = "default_max_item_count")]
    pub max_item_count: usize,
    /// Largest accepted document body in bytes (at most 16 MiB).
    #[serde(default = "default_max_document_size")]
    pub max_document_size: usize,
    /// Request meter: `"none"` or `"size"`.
    #[serde(default = "default_request_meter")]
    pub request_meter: String,
}

fn default_partition_count() -> u32 {
    PartitionRouter::DEFAULT_PARTITION_COUNT
}

fn default_max_item_count() -> usize {
    100
}

fn default_max_document_size() -> usize {
    ContainerOptions::DEFAULT_MAX_DOCUMENT_SIZE
}

fn default_request_meter() -> String {
    "none".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            partition_count: default_partition_count(),
            max_item_count: default_max_item_count(),
            max_document_size: default_max_document_size(),
            request_meter: default_request_meter(),
        }
    }
}

impl ClientConfig {
    /// Check every field is in range.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.partition_count == 0 || self.partition_count > PartitionRouter::MAX_PARTITION_COUNT
        {
            return Err(Error::InvalidConfig(format!(
                "partition_count must be between 1 and {}, got {}",
                PartitionRouter::MAX_PARTITION_COUNT,
                self.partition_count
            )));
        }
        if self.max_item_count == 0 {
            return Err(Error::InvalidConfig(
                "max_item_count must be at least 1".to_string(),
            ));
        }
        if self.max_document_size == 0 || self.max_document_size > MAX_DOCUMENT_SIZE {
            return Err(Error::InvalidConfig(format!(
                "max_document_size must be between 1 and {}, got {}",
                MAX_DOCUMENT_SIZE, self.max_document_size
            )));
        }
        self.meter()?;
        Ok(())
    }

    /// Build the configured request meter.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the string is not `"none"` or `"size"`.
    pub fn meter(&self) -> Result<Arc<dyn RequestMeter>> {
        match self.request_meter.as_str() {
            "none" => Ok(Arc::new(NoopMeter)),
            "size" => Ok(Arc::new(SizeBasedMeter::default())),
            other => Err(Error::InvalidConfig(format!(
                "Invalid request_meter '{}' in {}. Expected \"none\" or \"size\".",
                other, CONFIG_FILE_NAME
            ))),
        }
    }

    /// Options for containers created under this config.
    pub fn container_options(&self) -> ContainerOptions {
        ContainerOptions {
            partition_count: self.partition_count,
            max_document_size: self.max_document_size,
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# docstore client configuration
#
# Partition buckets per container (1..=4096). Fixed when a container is
# created; containers created earlier keep their count.
partition_count = 16

# Largest page returned by a feed iterator.
max_item_count = 100

# Largest accepted document body in bytes (default 2 MiB, at most 16 MiB).
max_document_size = 2097152

# Request meter: "none" (zero charges) or "size"
#   "size" = reads 1 RU per KiB, writes 5 RU per KiB, minimum 1 RU
request_meter = "none"
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `InvalidConfig` if it does not
    /// parse or a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            )
        })?;
        let config: ClientConfig = toml::from_str(&content).map_err(|e| {
            Error::InvalidConfig(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
