//! # Pricebook Core
//!
//! In-memory store for a product catalog and its price history.
//!
//! Two flat collections are loaded from JSON files: items (products) and
//! history entries (price changes). After every load the one-to-many link
//! from each item to its history entries is rebuilt with a merge join, and
//! from then on single-record inserts, updates and deletes patch the links
//! incrementally.
//!
//! ## Architecture
//!
//! - **catalog**: the owning collections, association engine and CRUD facade
//! - **storage**: record types and the load/save boundary
//! - **config**: where the collection files live
//!
//! Links are derived state. They are never persisted and can always be
//! recomputed from the two collections alone.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fs;
pub mod storage;

pub use catalog::{Catalog, CrudRepository, EntryRef, Handle, ItemRef};
pub use config::PricebookConfig;
pub use error::{PricebookError, Result};
pub use storage::{HistoryEntry, Item, JsonFileStore, RecordSet, RecordStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
