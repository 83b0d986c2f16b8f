//! Location of the persisted collections.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PricebookError, Result};

/// Environment variable overriding `storage.directory`.
pub const DATA_DIR_ENV: &str = "PRICEBOOK_DATA_DIR";

pub const DEFAULT_ITEMS_FILE: &str = "Products.json";
pub const DEFAULT_HISTORY_FILE: &str = "ProductsPriceHistory.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricebookConfig {
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_items_file")]
    pub items_file: String,
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            items_file: default_items_file(),
            history_file: default_history_file(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_items_file() -> String {
    DEFAULT_ITEMS_FILE.to_string()
}

fn default_history_file() -> String {
    DEFAULT_HISTORY_FILE.to_string()
}

impl PricebookConfig {
    /// Replace the data directory when `data_dir` is set and not blank.
    pub fn with_data_dir(mut self, data_dir: Option<String>) -> Self {
        if let Some(value) = data_dir {
            if !value.trim().is_empty() {
                self.storage.directory = PathBuf::from(value);
            }
        }
        self
    }

    /// Apply `PRICEBOOK_DATA_DIR` if present.
    pub fn from_env_overrides(self) -> Self {
        self.with_data_dir(std::env::var(DATA_DIR_ENV).ok())
    }
}

pub fn read_config(path: &Path) -> Result<PricebookConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        PricebookError::Config(format!("Failed to read config {}: {}", path.display(), e))
    })?;
    toml::from_str(&contents).map_err(|e| {
        PricebookError::Config(format!("Failed to parse config {}: {}", path.display(), e))
    })
}

pub fn write_config(path: &Path, config: &PricebookConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            PricebookError::Config(format!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }
    let contents = toml::to_string_pretty(config)
        .map_err(|e| PricebookError::Config(format!("TOML error: {}", e)))?;
    std::fs::write(path, contents).map_err(|e| {
        PricebookError::Config(format!("Failed to write config {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = PricebookConfig::default();
        assert_eq!(config.storage.directory, PathBuf::from("."));
        assert_eq!(config.storage.items_file, "Products.json");
        assert_eq!(config.storage.history_file, "ProductsPriceHistory.json");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: PricebookConfig =
            toml::from_str("[storage]\ndirectory = \"/srv/pricebook\"\n").unwrap();
        assert_eq!(config.storage.directory, PathBuf::from("/srv/pricebook"));
        assert_eq!(config.storage.items_file, DEFAULT_ITEMS_FILE);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = PricebookConfig::default().with_data_dir(Some("/data".to_string()));

        write_config(&path, &config).unwrap();
        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_blank_override_ignored() {
        let config = PricebookConfig::default().with_data_dir(Some("  ".to_string()));
        assert_eq!(config.storage.directory, PathBuf::from("."));
    }

    #[test]
    fn test_read_missing_is_config_error() {
        let dir = tempdir().unwrap();
        let err = read_config(&dir.path().join("config.toml")).unwrap_err();
        assert!(matches!(err, PricebookError::Config(_)));
    }
}
