//! Key to item side index.

use std::collections::{BTreeSet, HashMap};

/// Maps each key to the item slots carrying it.
///
/// The lowest slot wins a lookup, which matches what a linear scan in
/// memory order would return when keys are duplicated.
#[derive(Debug, Default)]
pub struct KeyIndex {
    by_key: HashMap<i32, BTreeSet<usize>>,
    by_slot: HashMap<usize, i32>,
}

impl KeyIndex {
    pub fn insert(&mut self, slot: usize, key: i32) {
        self.remove(slot);
        self.by_key.entry(key).or_default().insert(slot);
        self.by_slot.insert(slot, key);
    }

    pub fn remove(&mut self, slot: usize) -> Option<i32> {
        let key = self.by_slot.remove(&slot)?;
        if let Some(slots) = self.by_key.get_mut(&key) {
            slots.remove(&slot);
            if slots.is_empty() {
                self.by_key.remove(&key);
            }
        }
        Some(key)
    }

    /// Key the slot is currently indexed under.
    pub fn key_of(&self, slot: usize) -> Option<i32> {
        self.by_slot.get(&slot).copied()
    }

    pub fn first(&self, key: i32) -> Option<usize> {
        self.by_key.get(&key)?.iter().next().copied()
    }

    /// Keys carried by more than one slot, ascending.
    pub fn duplicates(&self) -> Vec<i32> {
        let mut keys: Vec<i32> = self
            .by_key
            .iter()
            .filter(|(_, slots)| slots.len() > 1)
            .map(|(key, _)| *key)
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn clear(&mut self) {
        self.by_key.clear();
        self.by_slot.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_prefers_lowest_slot() {
        let mut index = KeyIndex::default();
        index.insert(4, 7);
        index.insert(2, 7);

        assert_eq!(index.first(7), Some(2));
        assert_eq!(index.duplicates(), vec![7]);

        index.remove(2);
        assert_eq!(index.first(7), Some(4));
        assert!(index.duplicates().is_empty());
    }

    #[test]
    fn test_reinsert_moves_slot_to_new_key() {
        let mut index = KeyIndex::default();
        index.insert(0, 2);
        index.insert(0, 9);

        assert_eq!(index.first(2), None);
        assert_eq!(index.first(9), Some(0));
        assert_eq!(index.key_of(0), Some(9));
    }
}
