//! Growing and compacting by rotating table roles.
//!
//! Growth retires `T3`: the old `T1` and `T2` keep their entries and move down
//! one role together with their hashers and salts, so their placements stay
//! valid. Only the retired table's entries are re-placed. Compaction is the
//! mirror image and retires `T1`.

use core::hash::{BuildHasher, Hash};
use core::mem;

use crate::config::{AutoCompact, MIN_SIZE_EXP};
use crate::error::{Error, Result};
use crate::raw::{role_len, RawCuckoo};
use crate::table::Table;

impl<K, V, S> RawCuckoo<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Double the base size. On failure nothing has changed.
    pub(crate) fn grow(&mut self) -> Result<()> {
        let exp = self.size_exp + 1;
        if exp > self.config.max_size_exp {
            return Err(Error::CapacityLimit {
                max_size_exp: self.config.max_size_exp,
            });
        }
        let fresh = Table::try_new(role_len(0, exp))?;

        self.tables.rotate_right(1);
        self.hashers.rotate_right(1);
        self.salts.rotate_right(1);
        let retired = mem::replace(&mut self.tables[0], fresh);
        self.set_size_exp(exp);
        if self.auto_compact == AutoCompact::Compacted {
            self.auto_compact = AutoCompact::Auto;
        }
        log::debug!("grew to base size {} with {} entries", self.base_size(), self.len);

        self.replace_all(retired);
        Ok(())
    }

    /// Halve the base size if the table is sparse enough.
    ///
    /// Returns `Ok(false)` when compaction does not apply: already compacted
    /// since the last growth, already at the minimum size, or `len ≥ 3·S`.
    /// Also `Ok(false)` when re-placing the retired entries had to grow the
    /// table back to its previous size; the state is then left armed.
    pub(crate) fn compact(&mut self) -> Result<bool> {
        if self.auto_compact == AutoCompact::Compacted
            || self.size_exp <= MIN_SIZE_EXP
            || self.len >= 3 * self.base_size()
        {
            return Ok(false);
        }
        let old_exp = self.size_exp;
        let exp = old_exp - 1;
        let fresh = Table::try_new(role_len(2, exp))?;

        self.tables.rotate_left(1);
        self.hashers.rotate_left(1);
        self.salts.rotate_left(1);
        let retired = mem::replace(&mut self.tables[2], fresh);
        self.set_size_exp(exp);
        log::debug!("compacted to base size {} with {} entries", self.base_size(), self.len);

        self.replace_all(retired);
        let shrunk = self.size_exp < old_exp;
        if shrunk {
            self.auto_compact = AutoCompact::Compacted;
        } else {
            log::debug!("compaction undone by growth at base size {}", self.base_size());
        }
        Ok(shrunk)
    }

    /// Grow until `additional` more entries fit without growing, then turn
    /// automatic compaction off.
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<()> {
        if additional > 0 {
            while self
                .len
                .saturating_add(self.max_loops)
                .saturating_add(additional)
                >= 6 * self.base_size()
            {
                self.grow()?;
            }
        }
        self.auto_compact = AutoCompact::Off;
        Ok(())
    }

    /// Re-place the entries of a retired table. They are still counted in
    /// `len`; an entry that cannot be placed is dropped, uncounted and logged
    /// at error level. The calling operation still succeeds.
    fn replace_all(&mut self, retired: Table<K, V>) {
        for entry in retired.into_entries() {
            if let Err((error, orphan)) = self.place(entry) {
                log::error!(
                    "dropping an entry while resizing to base size {}: {error}",
                    self.base_size()
                );
                self.len -= 1;
                drop(orphan);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::BuildHasherDefault;

    type Sip = BuildHasherDefault<DefaultHasher>;

    fn filled(exp: u32, n: u32) -> RawCuckoo<u32, u32, Sip> {
        let config = Config {
            start_size_exp: exp,
            seed: Some(99),
            ..Config::default()
        }
        .normalized();
        let mut r = RawCuckoo::new(config, Default::default()).unwrap();
        for k in 0..n {
            assert_eq!(r.insert(k, k * 3).ok(), Some(None));
        }
        r
    }

    /// Growth doubles S, keeps every entry and rotates hasher roles.
    #[test]
    fn grow_doubles_and_preserves() {
        let mut r = filled(2, 10);
        let salts = r.salts;
        let exp = r.size_exp;
        r.grow().unwrap();
        assert_eq!(r.size_exp, exp + 1);
        assert_eq!(r.len, 10);
        // Old T1 and T2 salts now serve roles 2 and 3.
        assert_eq!(r.salts[1..], salts[..2]);
        r.assert_invariants();
        for k in 0..10 {
            assert_eq!(r.find(&k).map(|e| e.value), Some(k * 3));
        }
    }

    #[test]
    fn grow_respects_size_limit() {
        let mut r = filled(2, 5);
        r.config.max_size_exp = 2;
        assert_eq!(r.grow(), Err(Error::CapacityLimit { max_size_exp: 2 }));
        assert_eq!(r.size_exp, 2);
        r.assert_invariants();
    }

    #[test]
    fn compact_halves_and_preserves() {
        let mut r = filled(4, 12);
        assert_eq!(r.compact(), Ok(true));
        assert_eq!(r.size_exp, 3);
        assert_eq!(r.auto_compact, AutoCompact::Compacted);
        assert_eq!(r.len, 12);
        r.assert_invariants();
        for k in 0..12 {
            assert_eq!(r.find(&k).map(|e| e.value), Some(k * 3));
        }
        // Only once until the next growth.
        assert_eq!(r.compact(), Ok(false));
    }

    #[test]
    fn compact_refuses_dense_or_minimal_tables() {
        let mut dense = filled(2, 12);
        let applies = dense.len < 3 * dense.base_size();
        assert_eq!(dense.compact(), Ok(applies));
        let mut tiny = filled(1, 1);
        assert_eq!(tiny.compact(), Ok(false));
        assert_eq!(tiny.size_exp, 1);
    }

    // Index is the key itself, masked; salts have no effect.
    #[derive(Clone, Default)]
    struct IdentityBuildHasher;
    struct IdentityHasher(u64);
    impl BuildHasher for IdentityBuildHasher {
        type Hasher = IdentityHasher;
        fn build_hasher(&self) -> IdentityHasher {
            IdentityHasher(0)
        }
    }
    impl std::hash::Hasher for IdentityHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn write_u32(&mut self, _salt: u32) {}
        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
        fn finish(&self) -> u64 {
            self.0
        }
    }

    /// Keys that are all multiples of 8 fit four slots at `S = 4` but only
    /// three at `S = 2`, so re-placing the retired `T1` grows the table back.
    /// Compaction must then report that nothing shrank and stay armed.
    #[test]
    fn compact_undone_by_nested_growth_reports_false() {
        let config = Config {
            start_size_exp: 2,
            seed: Some(1),
            ..Config::default()
        }
        .normalized();
        let mut r: RawCuckoo<u64, u64, IdentityBuildHasher> =
            RawCuckoo::new(config, Default::default()).unwrap();
        for k in [0u64, 8, 16, 24] {
            assert_eq!(r.insert(k, k + 1).ok(), Some(None));
        }
        assert_eq!(r.size_exp, 2);
        r.assert_invariants();

        assert_eq!(r.compact(), Ok(false));
        assert_eq!(r.size_exp, 2);
        assert_eq!(r.auto_compact, AutoCompact::Auto);
        assert_eq!(r.len, 4);
        r.assert_invariants();
        for k in [0u64, 8, 16, 24] {
            assert_eq!(r.find(&k).map(|e| e.value), Some(k + 1));
        }
    }

    #[test]
    fn grow_rearms_compaction_but_not_off() {
        let mut r = filled(4, 4);
        r.compact().unwrap();
        r.grow().unwrap();
        assert_eq!(r.auto_compact, AutoCompact::Auto);
        r.auto_compact = AutoCompact::Off;
        r.grow().unwrap();
        assert_eq!(r.auto_compact, AutoCompact::Off);
    }

    #[test]
    fn reserve_makes_room_and_disables_compaction() {
        let mut r = filled(1, 3);
        r.reserve(100).unwrap();
        assert!(r.len + r.max_loops + 100 < 6 * r.base_size());
        assert_eq!(r.auto_compact, AutoCompact::Off);
        let exp = r.size_exp;
        for k in 3..103 {
            r.insert(k, k).ok().unwrap();
        }
        assert_eq!(r.size_exp, exp, "reserved room must not need growth");
        r.assert_invariants();
    }

    #[test]
    fn remove_triggers_single_compaction() {
        let mut r = filled(2, 60);
        let peak = r.size_exp;
        for k in 0..58 {
            assert_eq!(r.remove(&k).map(|e| e.value), Some(k * 3));
            r.assert_invariants();
        }
        assert!(r.size_exp < peak);
        assert_eq!(r.len, 2);
    }
}
