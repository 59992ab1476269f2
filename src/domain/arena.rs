//! Handle-indexed entity storage
//!
//! Slots are append-only: removing an entity leaves an empty slot behind, so
//! a handle can never come to refer to a different entity.

use std::marker::PhantomData;

use super::id::ArenaKey;

/// Owning storage for one entity kind
#[derive(Debug, Clone)]
pub struct Arena<K, T> {
    slots: Vec<Option<T>>,
    len: usize,
    _key: PhantomData<K>,
}

impl<K: ArenaKey, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ArenaKey, T> Arena<K, T> {
    /// Creates an empty arena
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
            _key: PhantomData,
        }
    }

    /// Inserts a value built from its own handle
    pub fn insert_with(&mut self, build: impl FnOnce(K) -> T) -> K {
        let key = K::from_index(self.slots.len());
        self.slots.push(Some(build(key)));
        self.len += 1;
        key
    }

    /// Returns the value for a handle, if still present
    pub fn get(&self, key: K) -> Option<&T> {
        self.slots.get(key.index()).and_then(Option::as_ref)
    }

    /// Returns a mutable reference to the value for a handle
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots.get_mut(key.index()).and_then(Option::as_mut)
    }

    /// Removes and returns the value for a handle
    pub fn remove(&mut self, key: K) -> Option<T> {
        let removed = self.slots.get_mut(key.index()).and_then(Option::take);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Returns true if the handle refers to a live value
    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of live values
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no live values
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over live values in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|value| (K::from_index(index), value)))
    }
}
