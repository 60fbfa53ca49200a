use std::mem;

use crate::types::DEFAULT_INDEX_CAPACITY;

use super::hashing::{HashFn, djb2, probe};

/// Errors returned by [`KeyedIndex`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// No empty or tombstoned slot was found in a full probe cycle.
    #[error("keyed index is full (capacity {capacity})")]
    Full {
        /// Fixed slot count of the table.
        capacity: usize,
    },
}

/// Payload-free view of a slot's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Never used; terminates probing.
    Empty,
    /// Holds a live key/value pair.
    Occupied,
    /// Logically deleted; probing continues past it.
    Tombstoned,
}

#[derive(Debug, Clone)]
enum Slot<V> {
    Empty,
    Occupied { key: String, value: V },
    Tombstoned,
}

impl<V> Slot<V> {
    fn state(&self) -> SlotState {
        match self {
            Slot::Empty => SlotState::Empty,
            Slot::Occupied { .. } => SlotState::Occupied,
            Slot::Tombstoned => SlotState::Tombstoned,
        }
    }
}

/// Fixed-capacity open-addressing table with linear probing.
///
/// Keys are strings; values are opaque. Deletion leaves a tombstone so that
/// probe chains running through the slot stay intact. The table never grows.
#[derive(Debug, Clone)]
pub struct KeyedIndex<V> {
    slots: Vec<Slot<V>>,
    hasher: HashFn,
    live: usize,
    tombstones: usize,
}

impl<V> Default for KeyedIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyedIndex<V> {
    /// Empty table with [`DEFAULT_INDEX_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INDEX_CAPACITY)
    }

    /// Empty table with `capacity` slots, hashing with DJB2.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_hasher(capacity, djb2)
    }

    /// Builds a table that hashes keys with `hasher` instead of DJB2.
    pub fn with_hasher(capacity: usize, hasher: HashFn) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot::Empty);
        Self {
            slots,
            hasher,
            live: 0,
            tombstones: 0,
        }
    }

    /// Inserts or updates `key`.
    ///
    /// Returns the previous value when the key was already live. Probing
    /// stops at the first empty slot; the new pair lands in the first
    /// tombstone seen before that point, or in the empty slot itself.
    pub fn set(&mut self, key: &str, value: V) -> Result<Option<V>, IndexError> {
        let hashcode = (self.hasher)(key.as_bytes());
        let capacity = self.capacity();
        let mut free = None;

        for step in 0..capacity {
            let idx = probe(hashcode, step, capacity);
            match &mut self.slots[idx] {
                Slot::Empty => {
                    free.get_or_insert(idx);
                    break;
                }
                Slot::Occupied { key: k, value: v } if k.as_str() == key => {
                    return Ok(Some(mem::replace(v, value)));
                }
                Slot::Occupied { .. } => {}
                Slot::Tombstoned => {
                    free.get_or_insert(idx);
                }
            }
        }

        let idx = free.ok_or(IndexError::Full { capacity })?;
        if self.slots[idx].state() == SlotState::Tombstoned {
            self.tombstones -= 1;
        }
        self.slots[idx] = Slot::Occupied {
            key: key.to_string(),
            value,
        };
        self.live += 1;
        Ok(None)
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        let idx = self.slot_of(key)?;
        match &self.slots[idx] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let idx = self.slot_of(key)?;
        match &mut self.slots[idx] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// True when `key` is live.
    pub fn contains_key(&self, key: &str) -> bool {
        self.slot_of(key).is_some()
    }

    /// Tombstones the slot holding `key` and returns its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.slot_of(key)?;
        match mem::replace(&mut self.slots[idx], Slot::Tombstoned) {
            Slot::Occupied { value, .. } => {
                self.live -= 1;
                self.tombstones += 1;
                Some(value)
            }
            other => {
                self.slots[idx] = other;
                None
            }
        }
    }

    /// Slot index currently holding `key`, if it is live.
    ///
    /// On a table with no empty slot this scans all `capacity` slots.
    pub fn slot_of(&self, key: &str) -> Option<usize> {
        let hashcode = (self.hasher)(key.as_bytes());
        let capacity = self.capacity();

        for step in 0..capacity {
            let idx = probe(hashcode, step, capacity);
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied { key: k, .. } if k.as_str() == key => return Some(idx),
                Slot::Occupied { .. } | Slot::Tombstoned => {}
            }
        }
        None
    }

    /// State of slot `index`, or `None` past the end of the table.
    pub fn state_at(&self, index: usize) -> Option<SlotState> {
        self.slots.get(index).map(Slot::state)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    /// True when no entry is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Fixed slot count.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots currently tombstoned.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Live pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied { key, value } => Some((key.as_str(), value)),
            _ => None,
        })
    }
}
