//! JSON file record store.
//!
//! Each collection lives in its own file as a JSON array of flat records.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::traits::RecordStore;
use super::types::{HistoryEntry, Item, RecordSet};
use crate::config::StorageSection;
use crate::error::{PricebookError, Result};

/// Record store backed by two JSON files in one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    items_path: PathBuf,
    history_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(
        directory: impl AsRef<Path>,
        items_file: impl AsRef<Path>,
        history_file: impl AsRef<Path>,
    ) -> Self {
        let directory = directory.as_ref();
        Self {
            items_path: directory.join(items_file),
            history_path: directory.join(history_file),
        }
    }

    pub fn from_config(storage: &StorageSection) -> Self {
        Self::new(&storage.directory, &storage.items_file, &storage.history_file)
    }

    pub fn items_path(&self) -> &Path {
        &self.items_path
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PricebookError::NotFound(path.display().to_string()),
            _ => PricebookError::Storage(format!("Failed to read {}: {}", path.display(), e)),
        })?;
        // A `null` document is an empty collection.
        let records: Option<Vec<T>> = serde_json::from_str(&contents)
            .map_err(|e| PricebookError::Parse(format!("{}: {}", path.display(), e)))?;
        Ok(records.unwrap_or_default())
    }

    fn write_collection<T: Serialize>(path: &Path, records: &[&T]) -> Result<()> {
        let data = serde_json::to_vec(records).map_err(|e| {
            PricebookError::Storage(format!("Failed to serialize {}: {}", path.display(), e))
        })?;
        crate::fs::write_atomic(path, &data).map_err(|e| {
            PricebookError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> Result<RecordSet> {
        let items = Self::read_collection(&self.items_path)?;
        let history = Self::read_collection(&self.history_path)?;
        Ok(RecordSet { items, history })
    }

    fn save(&self, items: &[&Item], history: &[&HistoryEntry]) -> Result<()> {
        Self::write_collection(&self.items_path, items)?;
        Self::write_collection(&self.history_path, history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> JsonFileStore {
        JsonFileStore::new(dir, "Products.json", "ProductsPriceHistory.json")
    }

    #[test]
    fn test_load_missing_items_file_is_not_found() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let err = store.load().unwrap_err();
        assert!(matches!(err, PricebookError::NotFound(_)));
    }

    #[test]
    fn test_load_malformed_history_is_parse_error() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.items_path(), "[]").unwrap();
        fs::write(store.history_path(), "[{\"ProductID\": ").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, PricebookError::Parse(_)));
    }

    #[test]
    fn test_load_null_document_is_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.items_path(), "null").unwrap();
        fs::write(store.history_path(), "[]").unwrap();

        let records = store.load().unwrap();
        assert!(records.items.is_empty());
        assert!(records.history.is_empty());
    }

    #[test]
    fn test_save_writes_compact_arrays_in_given_order() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let second = Item::new(2);
        let first = Item::new(1);

        store.save(&[&second, &first], &[]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.items_path()).unwrap()).unwrap();
        assert_eq!(value[0]["ProductID"], 2);
        assert_eq!(value[1]["ProductID"], 1);
        assert_eq!(fs::read_to_string(store.history_path()).unwrap(), "[]");
    }

    #[test]
    fn test_save_into_missing_directory_is_storage_error() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir.path().join("absent"));

        let err = store.save(&[], &[]).unwrap_err();
        assert!(matches!(err, PricebookError::Storage(_)));
    }
}
