//! Displacement ("kick chain") insertion and per-table rehashing.

use core::hash::{BuildHasher, Hash};

use crate::error::Error;
use crate::raw::{RawCuckoo, ROLES};
use crate::table::{salted_index, Entry};

/// Rounds of kick chain plus rehash/grow before an insert gives up. Round `n`
/// grows the table instead of rehashing once `len > n·S`.
pub(crate) const INSERT_ROUNDS: usize = 6;

/// A failed placement: the reason plus the entry left without a slot.
pub(crate) type Homeless<K, V> = (Error, Entry<K, V>);

impl<K, V, S> RawCuckoo<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Run at most `max_loops` T1→T2→T3 cycles, each step storing the
    /// candidate at its slot and carrying on with the evicted occupant.
    ///
    /// On stall every stored entry is still at a valid position; the entry
    /// still in hand is returned.
    pub(crate) fn kick(&mut self, mut entry: Entry<K, V>) -> Result<(), Entry<K, V>> {
        for _ in 0..self.max_loops {
            for role in 0..ROLES {
                let table = &mut self.tables[role];
                let i = salted_index(&self.hashers[role], self.salts[role], &entry.key, table.len());
                match table.replace(i, entry) {
                    None => return Ok(()),
                    Some(evicted) => entry = evicted,
                }
            }
        }
        Err(entry)
    }

    /// Store an entry whose key is not present. Does not touch `len`.
    ///
    /// Alternates kick chains with a rehash, or with a grow once the table is
    /// judged too full; a grow resets the round budget.
    pub(crate) fn place(&mut self, entry: Entry<K, V>) -> Result<(), Homeless<K, V>> {
        let mut entry = entry;
        let mut n = INSERT_ROUNDS;
        while n > 0 {
            entry = match self.kick(entry) {
                Ok(()) => return Ok(()),
                Err(homeless) => homeless,
            };
            if self.len > n * self.base_size() {
                if let Err(error) = self.grow() {
                    return Err((error, entry));
                }
                n = INSERT_ROUNDS;
            } else {
                self.rehash();
                n -= 1;
            }
        }
        log::warn!(
            "insert exhausted {INSERT_ROUNDS} rounds at {} entries, base size {}",
            self.len,
            self.base_size()
        );
        Err((Error::Exhausted, entry))
    }

    /// Redraw the salt of every table and move entries to match.
    pub(crate) fn rehash(&mut self) {
        for role in 0..ROLES {
            self.rehash_table(role);
        }
    }

    /// Try fresh salts for one table. If none is collision free within the
    /// attempt budget, fall back to the previous salt. Returns whether the salt
    /// changed.
    pub(crate) fn rehash_table(&mut self, role: usize) -> bool {
        let previous = self.salts[role];
        for _ in 0..self.config.rehash_attempts {
            let salt = self.salt_source.next_salt();
            if self.relocate(role, salt) {
                self.salts[role] = salt;
                return true;
            }
        }
        // The previous salt placed these same entries without collision.
        let restored = self.relocate(role, previous);
        debug_assert!(restored);
        log::debug!(
            "rehash of table {} kept its salt after {} attempts",
            role + 1,
            self.config.rehash_attempts
        );
        false
    }

    /// Move every entry of `role` to its slot under `salt`, in place.
    ///
    /// Each swap puts one entry at its final slot, so the pass terminates.
    /// Fails as soon as a target slot is already held by an entry that
    /// belongs there, leaving the table in some permutation of its entries.
    fn relocate(&mut self, role: usize, salt: u32) -> bool {
        let hasher = &self.hashers[role];
        let table = &mut self.tables[role];
        let len = table.len();
        for i in 0..len {
            loop {
                let Some(entry) = table.get(i) else { break };
                let j = salted_index(hasher, salt, &entry.key, len);
                if j == i {
                    break;
                }
                let occupant_home = table
                    .get(j)
                    .map(|other| salted_index(hasher, salt, &other.key, len));
                match occupant_home {
                    None => {
                        table.swap(i, j);
                        break;
                    }
                    Some(home) if home == j => return false,
                    Some(_) => table.swap(i, j),
                }
            }
        }
        true
    }
}
