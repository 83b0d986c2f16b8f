//! Association engine.
//!
//! Builds the item <-> history entry links from scratch with a sort-merge
//! join, and patches them one record at a time after CRUD mutations.
//! These are the only paths that write `Item::entries` and
//! `HistoryEntry::owner`.

use tracing::{debug, trace};

use super::{Catalog, EntryRef, ItemRef};

impl Catalog {
    /// Recompute every link from the two collections alone.
    ///
    /// Items and entries are viewed in ascending `ProductID` order and walked
    /// with a single item cursor, so the cost is dominated by the two sorts.
    /// Existing links are discarded first, which makes repeated calls
    /// produce the same link set.
    pub fn rebuild_associations(&mut self) {
        self.clear_links();

        // Stable sorts over memory-order views: among duplicate item keys the
        // first item in memory order wins, as it does for incremental lookups.
        let mut items: Vec<(i32, ItemRef)> = self
            .items
            .iter()
            .map(|(handle, item)| (item.product_id, handle))
            .collect();
        items.sort_by_key(|&(key, _)| key);

        let mut entries: Vec<(i32, EntryRef)> = self
            .history
            .iter()
            .map(|(handle, entry)| (entry.product_id, handle))
            .collect();
        entries.sort_by_key(|&(key, _)| key);

        if items.is_empty() {
            debug!(
                orphans = entries.len(),
                "No items, every history entry stays unlinked"
            );
            return;
        }

        let mut cursor = items.iter().peekable();
        let mut linked = 0usize;

        'entries: for &(entry_key, entry) in &entries {
            let (item_key, item) = loop {
                // Entries are sorted, so nothing after this one can match either.
                let Some(&&current) = cursor.peek() else {
                    break 'entries;
                };
                if current.0 >= entry_key {
                    break current;
                }
                cursor.next();
            };

            if item_key > entry_key {
                continue;
            }

            self.attach(entry, item);
            linked += 1;
        }

        debug!(
            items = items.len(),
            linked,
            orphans = entries.len() - linked,
            "Rebuilt associations"
        );
    }

    fn clear_links(&mut self) {
        for (_, item) in self.items.iter_mut() {
            item.entries.clear();
        }
        for (_, entry) in self.history.iter_mut() {
            entry.owner = None;
        }
    }

    /// Link `entry` to `item`, detaching it from any previous owner.
    pub(super) fn link(&mut self, entry: EntryRef, item: ItemRef) {
        self.detach_entry(entry);
        self.attach(entry, item);
    }

    fn attach(&mut self, entry: EntryRef, item: ItemRef) {
        let (Some(record), Some(owner)) = (self.history.get_mut(entry), self.items.get_mut(item))
        else {
            return;
        };
        record.owner = Some(item);
        owner.entries.push(entry);
        trace!(
            entry = entry.slot(),
            item = item.slot(),
            product_id = record.product_id,
            "Linked history entry"
        );
    }

    /// Remove `entry` from its owner's list and clear its back-reference.
    pub(super) fn detach_entry(&mut self, entry: EntryRef) {
        let Some(owner) = self.history.get_mut(entry).and_then(|record| record.owner.take())
        else {
            return;
        };
        if let Some(item) = self.items.get_mut(owner) {
            item.entries.retain(|&listed| listed != entry);
        }
        trace!(
            entry = entry.slot(),
            item = owner.slot(),
            "Unlinked history entry"
        );
    }

    /// Clear every link held by `item`.
    pub(super) fn detach_item(&mut self, item: ItemRef) {
        let Some(record) = self.items.get_mut(item) else {
            return;
        };
        let owned = std::mem::take(&mut record.entries);
        self.release_entries(item, &owned);
    }

    /// Clear the back-reference of every entry in `owned` that still points at `item`.
    pub(super) fn release_entries(&mut self, item: ItemRef, owned: &[EntryRef]) {
        for &entry in owned {
            if let Some(record) = self.history.get_mut(entry) {
                if record.owner == Some(item) {
                    record.owner = None;
                }
            }
        }
        if !owned.is_empty() {
            trace!(
                item = item.slot(),
                released = owned.len(),
                "Released history entries"
            );
        }
    }

    /// Link `entry` to the item carrying its key, if one exists.
    pub(super) fn link_entry_by_key(&mut self, entry: EntryRef) {
        let Some(product_id) = self.history.get(entry).map(|record| record.product_id) else {
            return;
        };
        match self.find_item(product_id) {
            Some(item) => self.link(entry, item),
            None => trace!(entry = entry.slot(), product_id, "History entry is an orphan"),
        }
    }

    /// Link every entry carrying `item`'s key to it.
    ///
    /// Does nothing unless `item` is the first item in memory order with
    /// that key, so a duplicate never takes entries from an earlier item.
    pub(super) fn link_item_by_key(&mut self, item: ItemRef) {
        let Some(product_id) = self.items.get(item).map(|record| record.product_id) else {
            return;
        };
        if self.find_item(product_id) != Some(item) {
            trace!(item = item.slot(), product_id, "Duplicate item key, nothing linked");
            return;
        }
        for entry in self.find_entries(product_id) {
            self.link(entry, item);
        }
    }

    /// True when `entry` is already linked to an item with its current key.
    pub(super) fn entry_link_is_current(&self, entry: EntryRef) -> bool {
        let Some(record) = self.history.get(entry) else {
            return false;
        };
        record
            .owner
            .and_then(|owner| self.items.get(owner))
            .is_some_and(|owner| owner.product_id == record.product_id)
    }

    /// True when `item` owns nothing or its first entry shares its key.
    ///
    /// One representative is enough only while every owned entry shares the
    /// item's key going in.
    pub(super) fn item_links_are_current(&self, item: ItemRef) -> bool {
        let Some(record) = self.items.get(item) else {
            return false;
        };
        match record.entries.first() {
            None => true,
            Some(&first) => self
                .history
                .get(first)
                .is_some_and(|entry| entry.product_id == record.product_id),
        }
    }
}
