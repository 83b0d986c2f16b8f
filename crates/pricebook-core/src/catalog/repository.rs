//! CRUD facade for both record kinds.
//!
//! Each mutator changes exactly one collection and then asks the
//! association engine to patch the affected links. No call rebuilds
//! globally.

use tracing::warn;

use super::{unknown, Catalog, Handle};
use crate::error::Result;
use crate::storage::{HistoryEntry, Item};

/// Single-record mutations on one of the catalog's collections.
pub trait CrudRepository<T> {
    /// Append a record and link it.
    ///
    /// Any link state carried by `record` is discarded. A key duplicating an
    /// existing record's key is accepted without error.
    fn insert(&mut self, record: T) -> Handle<T>;

    /// Repair links after the record at `handle` was changed in place.
    ///
    /// # Errors
    ///
    /// Returns `PricebookError::UnknownRecord` if `handle` is not present.
    fn update(&mut self, handle: Handle<T>) -> Result<()>;

    /// Remove a record, clearing every link it took part in.
    ///
    /// # Returns
    ///
    /// Returns the removed record with its link state cleared.
    ///
    /// # Errors
    ///
    /// Returns `PricebookError::UnknownRecord` if `handle` is not present.
    fn delete(&mut self, handle: Handle<T>) -> Result<T>;
}

impl CrudRepository<HistoryEntry> for Catalog {
    fn insert(&mut self, mut record: HistoryEntry) -> Handle<HistoryEntry> {
        record.owner = None;
        let handle = self.history.insert(record);
        self.link_entry_by_key(handle);
        handle
    }

    fn update(&mut self, handle: Handle<HistoryEntry>) -> Result<()> {
        if !self.history.contains(handle) {
            warn!(slot = handle.slot(), "Update of unknown history entry");
            return Err(unknown("history entry", handle.slot()));
        }
        if self.entry_link_is_current(handle) {
            return Ok(());
        }

        self.detach_entry(handle);
        self.link_entry_by_key(handle);
        Ok(())
    }

    fn delete(&mut self, handle: Handle<HistoryEntry>) -> Result<HistoryEntry> {
        self.detach_entry(handle);
        self.history.remove(handle).ok_or_else(|| {
            warn!(slot = handle.slot(), "Delete of unknown history entry");
            unknown("history entry", handle.slot())
        })
    }
}

impl CrudRepository<Item> for Catalog {
    fn insert(&mut self, mut record: Item) -> Handle<Item> {
        record.entries.clear();
        let product_id = record.product_id;
        let handle = self.items.insert(record);
        self.index.insert(handle.slot(), product_id);
        self.link_item_by_key(handle);
        handle
    }

    fn update(&mut self, handle: Handle<Item>) -> Result<()> {
        let Some(product_id) = self.items.get(handle).map(|item| item.product_id) else {
            warn!(slot = handle.slot(), "Update of unknown item");
            return Err(unknown("item", handle.slot()));
        };

        if self.index.key_of(handle.slot()) != Some(product_id) {
            self.index.insert(handle.slot(), product_id);
        }
        if self.item_links_are_current(handle) {
            return Ok(());
        }

        self.detach_item(handle);
        self.link_item_by_key(handle);
        Ok(())
    }

    fn delete(&mut self, handle: Handle<Item>) -> Result<Item> {
        let Some(mut record) = self.items.remove(handle) else {
            warn!(slot = handle.slot(), "Delete of unknown item");
            return Err(unknown("item", handle.slot()));
        };
        self.index.remove(handle.slot());

        let owned = std::mem::take(&mut record.entries);
        self.release_entries(handle, &owned);
        Ok(record)
    }
}
