//! In-memory catalog of items and their history entries.
//!
//! `Catalog` owns both collections. Records are addressed by [`Handle`]s;
//! the link between an entry and its item is stored as handles on both
//! sides and resolved on access.
//!
//! Preconditions (not enforced):
//! - `ProductID` is unique across items. Duplicates link every matching
//!   entry to the first such item in memory order.
//! - A record mutated through `item_mut` / `entry_mut` is followed by the
//!   matching `update` call before any other mutation.

mod arena;
mod associations;
mod index;
mod repository;

use tracing::debug;

use crate::error::{PricebookError, Result};
use crate::storage::{HistoryEntry, Item, RecordSet, RecordStore};

pub use arena::Handle;
pub use repository::CrudRepository;

use arena::Arena;
use index::KeyIndex;

pub type ItemRef = Handle<Item>;
pub type EntryRef = Handle<HistoryEntry>;

#[derive(Debug, Default)]
pub struct Catalog {
    items: Arena<Item>,
    history: Arena<HistoryEntry>,
    index: KeyIndex,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from records in arbitrary order and link them.
    pub fn from_records(records: RecordSet) -> Self {
        let mut catalog = Self::new();
        catalog.replace(records);
        catalog
    }

    /// Replace both collections with the store's contents and relink.
    ///
    /// On error the current collections are left untouched.
    pub fn load_from<S: RecordStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        let records = store.load()?;
        debug!(
            items = records.items.len(),
            history = records.history.len(),
            "Loaded collections"
        );
        self.replace(records);
        Ok(())
    }

    /// Persist both collections in memory order. Links are not written.
    pub fn save_to<S: RecordStore + ?Sized>(&self, store: &S) -> Result<()> {
        let items: Vec<&Item> = self.items.values().collect();
        let history: Vec<&HistoryEntry> = self.history.values().collect();
        store.save(&items, &history)?;
        debug!(
            items = items.len(),
            history = history.len(),
            "Saved collections"
        );
        Ok(())
    }

    fn replace(&mut self, records: RecordSet) {
        self.items.reset(records.items);
        self.history.reset(records.history);

        self.index.clear();
        for (handle, item) in self.items.iter() {
            self.index.insert(handle.slot(), item.product_id);
        }

        self.rebuild_associations();
    }

    // --- Read access ---

    pub fn item(&self, handle: ItemRef) -> Option<&Item> {
        self.items.get(handle)
    }

    pub fn entry(&self, handle: EntryRef) -> Option<&HistoryEntry> {
        self.history.get(handle)
    }

    /// Mutable access to an item's persisted fields.
    ///
    /// Call [`CrudRepository::update`] afterwards so links follow the change.
    pub fn item_mut(&mut self, handle: ItemRef) -> Option<&mut Item> {
        self.items.get_mut(handle)
    }

    /// Mutable access to an entry's persisted fields.
    ///
    /// Call [`CrudRepository::update`] afterwards so links follow the change.
    pub fn entry_mut(&mut self, handle: EntryRef) -> Option<&mut HistoryEntry> {
        self.history.get_mut(handle)
    }

    /// Apply `change` to an item, then repair its links.
    pub fn modify_item<F>(&mut self, handle: ItemRef, change: F) -> Result<()>
    where
        F: FnOnce(&mut Item),
    {
        let item = self
            .items
            .get_mut(handle)
            .ok_or_else(|| unknown("item", handle.slot()))?;
        change(item);
        self.update(handle)
    }

    /// Apply `change` to a history entry, then repair its link.
    pub fn modify_entry<F>(&mut self, handle: EntryRef, change: F) -> Result<()>
    where
        F: FnOnce(&mut HistoryEntry),
    {
        let entry = self
            .history
            .get_mut(handle)
            .ok_or_else(|| unknown("history entry", handle.slot()))?;
        change(entry);
        self.update(handle)
    }

    /// Items in memory order.
    pub fn items(&self) -> impl Iterator<Item = (ItemRef, &Item)> + '_ {
        self.items.iter()
    }

    /// History entries in memory order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryRef, &HistoryEntry)> + '_ {
        self.history.iter()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn entry_count(&self) -> usize {
        self.history.len()
    }

    /// History entries linked to `item`, in link order.
    pub fn entries_of(&self, item: ItemRef) -> impl Iterator<Item = (EntryRef, &HistoryEntry)> + '_ {
        self.items
            .get(item)
            .into_iter()
            .flat_map(|record| record.entries.iter())
            .filter_map(move |&handle| self.history.get(handle).map(|entry| (handle, entry)))
    }

    /// The item an entry is linked to, if any.
    pub fn owner_of(&self, entry: EntryRef) -> Option<(ItemRef, &Item)> {
        let owner = self.history.get(entry)?.owner?;
        self.items.get(owner).map(|item| (owner, item))
    }

    /// First item in memory order carrying `product_id`.
    pub fn find_item(&self, product_id: i32) -> Option<ItemRef> {
        let indexed = self
            .index
            .first(product_id)
            .and_then(|slot| self.items.handle_at(slot))
            .filter(|&handle| {
                self.items
                    .get(handle)
                    .is_some_and(|item| item.product_id == product_id)
            });

        // An item re-keyed without `update` leaves the index stale.
        indexed.or_else(|| {
            self.items
                .iter()
                .find(|(_, item)| item.product_id == product_id)
                .map(|(handle, _)| handle)
        })
    }

    /// All history entries carrying `product_id`, in memory order.
    pub fn find_entries(&self, product_id: i32) -> Vec<EntryRef> {
        self.history
            .iter()
            .filter(|(_, entry)| entry.product_id == product_id)
            .map(|(handle, _)| handle)
            .collect()
    }

    // --- Maintenance ---

    /// Keys carried by more than one item, ascending.
    pub fn duplicate_product_ids(&self) -> Vec<i32> {
        self.index.duplicates()
    }

    /// Verify the relationship invariant in both directions.
    ///
    /// Checks:
    /// - every owned entry's owner exists, shares its key and lists it once
    /// - every listed entry exists and points back at the listing item
    /// - every item is indexed under its current key
    ///
    /// Unlinked entries are never reported.
    pub fn check_integrity(&self) -> Result<()> {
        for (handle, entry) in self.history.iter() {
            let Some(owner) = entry.owner else {
                continue;
            };
            let item = self.items.get(owner).ok_or_else(|| {
                PricebookError::Integrity(format!(
                    "History entry {} links to missing item {}",
                    handle.slot(),
                    owner.slot()
                ))
            })?;
            if item.product_id != entry.product_id {
                return Err(PricebookError::Integrity(format!(
                    "History entry {} has ProductID {} but its item has {}",
                    handle.slot(),
                    entry.product_id,
                    item.product_id
                )));
            }
            let listed = item.entries.iter().filter(|&&h| h == handle).count();
            if listed != 1 {
                return Err(PricebookError::Integrity(format!(
                    "History entry {} listed {} times by item {}",
                    handle.slot(),
                    listed,
                    owner.slot()
                )));
            }
        }

        for (handle, item) in self.items.iter() {
            for &listed in &item.entries {
                let owner = self.history.get(listed).and_then(|entry| entry.owner);
                if owner != Some(handle) {
                    return Err(PricebookError::Integrity(format!(
                        "Item {} lists history entry {} which does not link back",
                        handle.slot(),
                        listed.slot()
                    )));
                }
            }
            if self.index.key_of(handle.slot()) != Some(item.product_id) {
                return Err(PricebookError::Integrity(format!(
                    "Item {} changed ProductID to {} without an update",
                    handle.slot(),
                    item.product_id
                )));
            }
        }

        Ok(())
    }
}

fn unknown(kind: &str, slot: usize) -> PricebookError {
    PricebookError::UnknownRecord(format!("{} at slot {}", kind, slot))
}
