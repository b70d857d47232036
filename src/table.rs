//! Slot storage for one cuckoo table.
//!
//! A table is a power-of-two array of `Option<Entry>` slots; `None` marks an
//! empty slot. Storage is obtained with `try_reserve_exact` so allocation
//! failure surfaces as `Error::AllocFailed` instead of aborting.

use core::hash::{BuildHasher, Hash, Hasher};
use core::mem;

use crate::error::{Error, Result};

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

#[derive(Debug)]
pub(crate) struct Table<K, V> {
    slots: Vec<Option<Entry<K, V>>>,
}

impl<K, V> Table<K, V> {
    /// Allocate `len` empty slots. `len` must be a power of two.
    pub(crate) fn try_new(len: usize) -> Result<Self> {
        debug_assert!(len.is_power_of_two());
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(len)
            .map_err(|_| Error::AllocFailed { slots: len })?;
        slots.resize_with(len, || None);
        Ok(Self { slots })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn get(&self, i: usize) -> Option<&Entry<K, V>> {
        self.slots[i].as_ref()
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, i: usize) -> Option<&mut Entry<K, V>> {
        self.slots[i].as_mut()
    }

    /// Store `entry` at `i` unconditionally and return the previous occupant.
    #[inline]
    pub(crate) fn replace(&mut self, i: usize, entry: Entry<K, V>) -> Option<Entry<K, V>> {
        mem::replace(&mut self.slots[i], Some(entry))
    }

    #[inline]
    pub(crate) fn take(&mut self, i: usize) -> Option<Entry<K, V>> {
        self.slots[i].take()
    }

    #[inline]
    pub(crate) fn swap(&mut self, i: usize, j: usize) {
        self.slots.swap(i, j);
    }

    /// Occupied slots in index order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &Entry<K, V>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|e| (i, e)))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entry<K, V>> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Consume the table, yielding its entries in index order.
    pub(crate) fn into_entries(self) -> impl Iterator<Item = Entry<K, V>> {
        self.slots.into_iter().flatten()
    }
}

/// Index of `key` in a table of `len` slots under `hasher` and `salt`.
#[inline]
pub(crate) fn salted_index<S, Q>(hasher: &S, salt: u32, key: &Q, len: usize) -> usize
where
    S: BuildHasher,
    Q: ?Sized + Hash,
{
    let mut h = hasher.build_hasher();
    h.write_u32(salt);
    key.hash(&mut h);
    (h.finish() as usize) & (len - 1)
}
