//! CuckooTable: public map over the three-table store, with a debug
//! reentrancy guard around every entry point.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

use hashbrown::hash_map::DefaultHashBuilder;

use crate::config::{AutoCompact, Config, CuckooTableBuilder};
use crate::error::{InsertError, Result};
use crate::raw::RawCuckoo;
use crate::reentrancy::DebugReentrancy;

/// A cuckoo hash map over three tables of `4·S`, `2·S` and `S` slots.
///
/// Lookups probe one slot per table, so `get` costs at most three key
/// comparisons regardless of load. Inserts and removals are amortized O(1).
///
/// The map is `Send` but not `Sync`; share it behind a lock.
///
/// ```
/// use cuckoo_table::CuckooTable;
///
/// let mut t = CuckooTable::new().unwrap();
/// assert_eq!(t.insert((8u64, 1234u64), "inode").unwrap(), None);
/// assert_eq!(t.insert((8, 1234), "inode'").unwrap(), Some("inode"));
/// assert_eq!(t.get(&(8, 1234)), Some(&"inode'"));
/// assert_eq!(t.remove(&(8, 1234)), Some("inode'"));
/// assert!(t.is_empty());
/// ```
pub struct CuckooTable<K, V, S = DefaultHashBuilder> {
    raw: RawCuckoo<K, V, S>,
    reentrancy: DebugReentrancy,
}

impl<K, V> CuckooTable<K, V>
where
    K: Hash + Eq,
{
    /// Empty table with the default base size (`S = 16`).
    pub fn new() -> Result<Self> {
        CuckooTableBuilder::new().build()
    }

    /// Empty table with base size `2^exp`.
    pub fn with_size_exp(exp: u32) -> Result<Self> {
        CuckooTableBuilder::new().start_size_exp(exp).build()
    }

    /// Same as [`CuckooTableBuilder::new`]. `K` and `V` are not inferred
    /// here, so name them:
    ///
    /// ```
    /// use cuckoo_table::CuckooTable;
    ///
    /// let t: CuckooTable<u64, &str> = CuckooTable::<u64, &str>::builder()
    ///     .start_size_exp(2)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(t.base_size(), 4);
    /// ```
    pub fn builder() -> CuckooTableBuilder {
        CuckooTableBuilder::new()
    }
}

impl<K, V, S> CuckooTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Empty table with base size `2^exp` and caller-supplied hash functions
    /// for `T1`, `T2` and `T3`.
    pub fn with_hashers(exp: u32, hashers: [S; 3]) -> Result<Self> {
        CuckooTableBuilder::new()
            .start_size_exp(exp)
            .hashers(hashers)
            .build()
    }

    pub(crate) fn from_parts(config: Config, hashers: [S; 3]) -> Result<Self> {
        Ok(Self {
            raw: RawCuckoo::new(config, hashers)?,
            reentrancy: DebugReentrancy::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.raw.len
    }

    pub fn is_empty(&self) -> bool {
        self.raw.len == 0
    }

    /// Current base size `S`.
    pub fn base_size(&self) -> usize {
        self.raw.base_size()
    }

    /// Total slot count, `7·S`.
    pub fn capacity(&self) -> usize {
        7 * self.raw.base_size()
    }

    /// Cycle bound of one displacement chain, `⌈√(4·S)⌉`.
    pub fn max_loops(&self) -> usize {
        self.raw.max_loops
    }

    pub fn auto_compact(&self) -> AutoCompact {
        self.raw.auto_compact
    }

    pub fn config(&self) -> &Config {
        &self.raw.config
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("get");
        self.raw.find(q).map(|e| &e.value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("get_key_value");
        self.raw.find(q).map(|e| (&e.key, &e.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("get_mut");
        self.raw.find_mut(q).map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("contains_key");
        self.raw.locate(q).is_some()
    }

    /// Insert or update.
    ///
    /// Returns the previous value when the key was present; the stored key is
    /// kept. On failure the entry left without a slot is handed back in the
    /// error (see [`InsertError`]).
    pub fn insert(&mut self, key: K, value: V) -> core::result::Result<Option<V>, InsertError<K, V>> {
        let _g = self.reentrancy.enter("insert");
        self.raw
            .insert(key, value)
            .map_err(|(error, entry)| InsertError {
                error,
                key: entry.key,
                value: entry.value,
            })
    }

    /// Remove a key and return its value. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Remove a key and return the stored key and value.
    ///
    /// May halve the table afterwards while automatic compaction is on. If
    /// that compaction cannot re-place an entry (a nested growth failed), the
    /// entry is dropped and logged at error level; the removal itself still
    /// succeeds.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("remove");
        self.raw.remove(q).map(|e| (e.key, e.value))
    }

    /// Grow until `additional` more entries fit without further growth and
    /// turn automatic compaction off, so later removals stay O(1).
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let _g = self.reentrancy.enter("reserve");
        self.raw.reserve(additional)
    }

    /// Halve the base size if `S > 2`, `len < 3·S` and the table has not been
    /// compacted since it last grew. Returns whether the base size shrank:
    /// `Ok(false)` also when re-placing entries grew the table straight back.
    /// An entry that cannot be re-placed at all is dropped and logged at error
    /// level.
    pub fn compact(&mut self) -> Result<bool> {
        let _g = self.reentrancy.enter("compact");
        self.raw.compact()
    }

    /// All entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.raw.entries().map(|e| (&e.key, &e.value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        self.raw.entries_mut().map(|e| (&e.key, &mut e.value))
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        self.raw.assert_invariants();
    }
}

impl<K, V, S> fmt::Debug for CuckooTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.raw.entries().map(|e| (&e.key, &e.value)))
            .finish()
    }
}
