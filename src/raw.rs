//! Three-table store shared by the displacement and resize engines.
//!
//! Role 0 is `T1` (`4·S` slots), role 1 is `T2` (`2·S`), role 2 is `T3` (`S`).
//! Hashers and salts are indexed by the same role, so rotating the three
//! arrays together moves a table together with the function that placed it.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};

use crate::config::{AutoCompact, Config};
use crate::displace::Homeless;
use crate::error::Result;
use crate::salt::SaltSource;
use crate::table::{salted_index, Entry, Table};

pub(crate) const ROLES: usize = 3;

pub(crate) struct RawCuckoo<K, V, S> {
    pub(crate) tables: [Table<K, V>; ROLES],
    pub(crate) hashers: [S; ROLES],
    pub(crate) salts: [u32; ROLES],
    pub(crate) salt_source: SaltSource,
    pub(crate) size_exp: u32,
    pub(crate) max_loops: usize,
    pub(crate) len: usize,
    pub(crate) auto_compact: AutoCompact,
    pub(crate) config: Config,
}

/// Smallest `m` with `m² ≥ 4·2^size_exp`.
pub(crate) fn max_loops_for(size_exp: u32) -> usize {
    let target = 4usize << size_exp;
    let mut m = (target as f64).sqrt() as usize;
    while m * m < target {
        m += 1;
    }
    while m > 1 && (m - 1) * (m - 1) >= target {
        m -= 1;
    }
    m
}

/// Slot count of `role` for base size `2^size_exp`.
#[inline]
pub(crate) fn role_len(role: usize, size_exp: u32) -> usize {
    (4usize >> role) << size_exp
}

impl<K, V, S> RawCuckoo<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub(crate) fn new(config: Config, hashers: [S; ROLES]) -> Result<Self> {
        let exp = config.start_size_exp;
        let tables = [
            Table::try_new(role_len(0, exp))?,
            Table::try_new(role_len(1, exp))?,
            Table::try_new(role_len(2, exp))?,
        ];
        let mut salt_source = SaltSource::new(config.seed);
        let salts = salt_source.triple();
        Ok(Self {
            tables,
            hashers,
            salts,
            salt_source,
            size_exp: exp,
            max_loops: max_loops_for(exp),
            len: 0,
            auto_compact: AutoCompact::Auto,
            config,
        })
    }

    #[inline]
    pub(crate) fn base_size(&self) -> usize {
        1 << self.size_exp
    }

    pub(crate) fn set_size_exp(&mut self, exp: u32) {
        self.size_exp = exp;
        self.max_loops = max_loops_for(exp);
    }

    #[inline]
    pub(crate) fn index_of<Q>(&self, role: usize, q: &Q) -> usize
    where
        Q: ?Sized + Hash,
    {
        salted_index(
            &self.hashers[role],
            self.salts[role],
            q,
            self.tables[role].len(),
        )
    }

    /// Probe `T1`, `T2`, `T3` in order; at most three comparisons.
    pub(crate) fn locate<Q>(&self, q: &Q) -> Option<(usize, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        (0..ROLES).find_map(|role| {
            let i = self.index_of(role, q);
            match self.tables[role].get(i) {
                Some(e) if e.key.borrow() == q => Some((role, i)),
                _ => None,
            }
        })
    }

    pub(crate) fn find<Q>(&self, q: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (role, i) = self.locate(q)?;
        self.tables[role].get(i)
    }

    pub(crate) fn find_mut<Q>(&mut self, q: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (role, i) = self.locate(q)?;
        self.tables[role].get_mut(i)
    }

    /// Upsert. `Ok(Some(old))` when the key was present.
    pub(crate) fn insert(
        &mut self,
        key: K,
        value: V,
    ) -> core::result::Result<Option<V>, Homeless<K, V>> {
        if let Some(entry) = self.find_mut(&key) {
            return Ok(Some(core::mem::replace(&mut entry.value, value)));
        }
        self.place(Entry { key, value })?;
        self.len += 1;
        Ok(None)
    }

    /// Take the entry out of its slot; may trigger automatic compaction.
    pub(crate) fn remove<Q>(&mut self, q: &Q) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (role, i) = self.locate(q)?;
        let entry = self.tables[role].take(i)?;
        self.len -= 1;
        if self.auto_compact == AutoCompact::Auto
            && self.base_size() > 2
            && self.len <= 2 * self.base_size()
        {
            if let Err(err) = self.compact() {
                log::warn!("automatic compaction skipped: {err}");
            }
        }
        Some(entry)
    }

    /// Table sizes, placement, shadowing and the element count all agree.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let mut seen = 0;
        for role in 0..ROLES {
            assert_eq!(
                self.tables[role].len(),
                role_len(role, self.size_exp),
                "role {role} has the wrong size"
            );
            for (i, e) in self.tables[role].iter() {
                assert_eq!(self.index_of(role, &e.key), i, "entry misplaced in role {role}");
                assert_eq!(self.locate(&e.key), Some((role, i)), "entry shadowed");
                seen += 1;
            }
        }
        assert_eq!(seen, self.len, "element count out of sync");
        assert_eq!(self.max_loops, max_loops_for(self.size_exp));
    }
}

impl<K, V, S> RawCuckoo<K, V, S> {
    /// Entries of `T1`, `T2`, `T3` in that order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = &Entry<K, V>> {
        self.tables.iter().flat_map(|t| t.iter().map(|(_, e)| e))
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut Entry<K, V>> {
        self.tables.iter_mut().flat_map(|t| t.iter_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_loops_is_ceil_sqrt_of_four_s() {
        // 4S = 8, 16, 32, 64, 128
        assert_eq!(max_loops_for(1), 3);
        assert_eq!(max_loops_for(2), 4);
        assert_eq!(max_loops_for(3), 6);
        assert_eq!(max_loops_for(4), 8);
        assert_eq!(max_loops_for(5), 12);
        for exp in 1..40 {
            let m = max_loops_for(exp);
            let target = 4usize << exp;
            assert!(m * m >= target);
            assert!((m - 1) * (m - 1) < target);
        }
    }

    #[test]
    fn role_lengths_follow_four_two_one() {
        assert_eq!(role_len(0, 3), 32);
        assert_eq!(role_len(1, 3), 16);
        assert_eq!(role_len(2, 3), 8);
    }
}
