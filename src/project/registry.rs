//! Identity index and counter primitives
//!
//! An [`IdIndex`] maps one integer identity space to arena handles. A
//! [`Counter`] mints values in one identity space.

use std::collections::HashMap;

use crate::domain::ArenaKey;

/// Integer identity → handle lookup table
#[derive(Debug, Clone)]
pub struct IdIndex<K> {
    map: HashMap<u32, K>,
}

impl<K: ArenaKey> Default for IdIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ArenaKey> IdIndex<K> {
    /// Creates an empty index
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Looks up the handle holding an identity value
    pub fn get(&self, id: u32) -> Option<K> {
        self.map.get(&id).copied()
    }

    /// Maps an identity value to a handle, returning the displaced handle
    pub fn map(&mut self, id: u32, key: K) -> Option<K> {
        self.map.insert(id, key)
    }

    /// Removes the mapping for `id` only if it still points at `key`
    ///
    /// During sequential renumbering a value may already have been taken
    /// over by another entity; that mapping must survive.
    pub fn unmap(&mut self, id: u32, key: K) -> bool {
        if self.map.get(&id) == Some(&key) {
            self.map.remove(&id);
            true
        } else {
            false
        }
    }

    /// Returns the number of mapped values
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if nothing is mapped
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over (value, handle) pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (u32, K)> + '_ {
        self.map.iter().map(|(id, key)| (*id, *key))
    }
}

/// Mints identity values for one kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counter(u32);

impl Counter {
    /// Advances the counter and returns the new value
    ///
    /// Returns None once the counter sits at `u32::MAX`; the counter is left
    /// unchanged so it never wraps back onto the hidden-root value 0.
    pub fn next(&mut self) -> Option<u32> {
        self.0 = self.0.checked_add(1)?;
        Some(self.0)
    }

    /// Returns the last value handed out
    pub fn current(&self) -> u32 {
        self.0
    }

    /// Raises the counter so the next value is above `value`
    pub fn raise_to(&mut self, value: u32) {
        if value > self.0 {
            self.0 = value;
        }
    }

    /// Sets the counter outright, used after a kind has been renumbered
    pub fn reset_to(&mut self, value: u32) {
        self.0 = value;
    }
}

/// All counters held by a project
#[derive(Debug, Clone, Default)]
pub struct Counters {
    pub task_id: Counter,
    pub task_unique_id: Counter,
    pub resource_id: Counter,
    pub resource_unique_id: Counter,
    pub calendar_unique_id: Counter,
    pub assignment_unique_id: Counter,
}
