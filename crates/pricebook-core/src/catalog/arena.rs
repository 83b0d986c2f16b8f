//! Owning record containers addressed by stable handles.
//!
//! Slots are append-only within a generation: a removed record leaves a
//! hole, so iteration order is always insertion order and a stale handle
//! can never alias a newer record. `reset` starts a new generation.
//!
//! Holes are only reclaimed by `reset`. Between loads the slot vector grows
//! by one per insert, so a catalog that churns through many
//! delete-and-insert cycles holds one empty slot per deletion until it is
//! reloaded.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed reference to a record held by the catalog.
pub struct Handle<T> {
    slot: usize,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(slot: usize, generation: u32) -> Self {
        Self {
            slot,
            generation,
            _marker: PhantomData,
        }
    }

    /// Position in memory order. Stable for the lifetime of the handle.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}@{})", self.slot, self.generation)
    }
}

/// Owning container of `T` addressed by [`Handle`]s.
#[derive(Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    generation: u32,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            generation: 0,
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn insert(&mut self, value: T) -> Handle<T> {
        let slot = self.slots.len();
        self.slots.push(Some(value));
        self.len += 1;
        Handle::new(slot, self.generation)
    }

    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        if handle.generation != self.generation {
            return None;
        }
        let value = self.slots.get_mut(handle.slot)?.take()?;
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if handle.generation != self.generation {
            return None;
        }
        self.slots.get(handle.slot)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if handle.generation != self.generation {
            return None;
        }
        self.slots.get_mut(handle.slot)?.as_mut()
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Handle for a live slot of the current generation.
    pub fn handle_at(&self, slot: usize) -> Option<Handle<T>> {
        match self.slots.get(slot) {
            Some(Some(_)) => Some(Handle::new(slot, self.generation)),
            _ => None,
        }
    }

    /// Live records in memory order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        let generation = self.generation;
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(slot, value)| {
                value.as_ref().map(|v| (Handle::new(slot, generation), v))
            })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> + '_ {
        let generation = self.generation;
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(move |(slot, value)| {
                value.as_mut().map(|v| (Handle::new(slot, generation), v))
            })
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Replace the contents, invalidating every handle issued so far.
    pub fn reset(&mut self, values: Vec<T>) {
        self.generation = self.generation.wrapping_add(1);
        self.len = values.len();
        self.slots = values.into_iter().map(Some).collect();
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut arena = Arena::default();
        let a = arena.insert("a");
        let b = arena.insert("b");

        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.remove(a), None);
        assert_eq!(arena.len(), 1);
        assert!(arena.contains(b));
        assert_eq!(arena.handle_at(a.slot()), None);
        assert_eq!(arena.handle_at(b.slot()), Some(b));
    }

    #[test]
    fn test_iteration_keeps_insertion_order_after_removal() {
        let mut arena = Arena::default();
        let handles: Vec<_> = (0..4).map(|i| arena.insert(i)).collect();
        arena.remove(handles[1]);
        arena.insert(9);

        let values: Vec<_> = arena.values().copied().collect();
        assert_eq!(values, vec![0, 2, 3, 9]);
    }

    #[test]
    fn test_removed_slots_are_only_reclaimed_by_reset() {
        let mut arena = Arena::default();
        let first = arena.insert(1);
        arena.remove(first);
        let second = arena.insert(2);

        assert_eq!(second.slot(), 1);
        assert_eq!(arena.len(), 1);

        arena.reset(vec![3]);
        assert_eq!(arena.iter().next().map(|(h, _)| h.slot()), Some(0));
    }

    #[test]
    fn test_reset_invalidates_old_handles() {
        let mut arena = Arena::default();
        let old = arena.insert(1);

        arena.reset(vec![10, 20]);

        assert_eq!(arena.get(old), None);
        assert_eq!(arena.len(), 2);
        let (first, _) = arena.iter().next().unwrap();
        assert_eq!(first.slot(), old.slot());
        assert_ne!(first, old);
        assert_eq!(arena.get(first), Some(&10));
    }
}
