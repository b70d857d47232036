//! Construction-time settings and the table builder.

use core::hash::{BuildHasher, Hash};

use hashbrown::hash_map::DefaultHashBuilder;

use crate::cuckoo_table::CuckooTable;
use crate::error::Result;

/// Smallest base size exponent (`S = 2`).
pub const MIN_SIZE_EXP: u32 = 1;
/// Largest base size exponent; keeps `7·S` slot counts representable.
pub const MAX_SIZE_EXP: u32 = usize::BITS - 4;
/// Default start exponent (`S = 16`).
pub const DEFAULT_START_SIZE_EXP: u32 = 4;
/// Salts tried per table during one rehash before keeping the old one.
pub const DEFAULT_REHASH_ATTEMPTS: u32 = 16;

/// Automatic compaction state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AutoCompact {
    /// `reserve` was called; `remove` never compacts.
    Off,
    /// `remove` compacts once the load drops low enough.
    Auto,
    /// Already compacted since the last growth; no further compaction.
    Compacted,
}

/// Plain settings, resolved by [`CuckooTableBuilder`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub start_size_exp: u32,
    pub max_size_exp: u32,
    pub rehash_attempts: u32,
    /// Fixed salt seed; `None` draws a random one.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_size_exp: DEFAULT_START_SIZE_EXP,
            max_size_exp: MAX_SIZE_EXP,
            rehash_attempts: DEFAULT_REHASH_ATTEMPTS,
            seed: None,
        }
    }
}

impl Config {
    /// Clamp every field into its valid range.
    pub(crate) fn normalized(mut self) -> Self {
        self.max_size_exp = self.max_size_exp.clamp(MIN_SIZE_EXP, MAX_SIZE_EXP);
        self.start_size_exp = self.start_size_exp.clamp(MIN_SIZE_EXP, self.max_size_exp);
        self.rehash_attempts = self.rehash_attempts.max(1);
        self
    }
}

/// Builder for [`CuckooTable`].
///
/// ```
/// use cuckoo_table::CuckooTableBuilder;
///
/// let mut t = CuckooTableBuilder::new()
///     .start_size_exp(2)
///     .seed(42)
///     .build::<u64, &str>()
///     .unwrap();
/// assert_eq!(t.base_size(), 4);
/// t.insert(1, "one").unwrap();
/// assert_eq!(t.get(&1), Some(&"one"));
/// ```
#[derive(Debug)]
pub struct CuckooTableBuilder<S = DefaultHashBuilder> {
    config: Config,
    hashers: [S; 3],
}

impl CuckooTableBuilder<DefaultHashBuilder> {
    /// Builder with default settings and three independently keyed hashers.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            hashers: [
                DefaultHashBuilder::default(),
                DefaultHashBuilder::default(),
                DefaultHashBuilder::default(),
            ],
        }
    }
}

impl Default for CuckooTableBuilder<DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BuildHasher> CuckooTableBuilder<S> {
    /// Initial base size is `2^exp`.
    #[must_use]
    pub fn start_size_exp(mut self, exp: u32) -> Self {
        debug_assert!(exp >= MIN_SIZE_EXP, "base size must be at least 2");
        self.config.start_size_exp = exp;
        self
    }

    /// Growth beyond base size `2^exp` fails with `Error::CapacityLimit`.
    #[must_use]
    pub fn max_size_exp(mut self, exp: u32) -> Self {
        debug_assert!(exp <= MAX_SIZE_EXP, "base size exponent too large");
        self.config.max_size_exp = exp;
        self
    }

    /// Salts tried per table during a rehash.
    #[must_use]
    pub fn rehash_attempts(mut self, attempts: u32) -> Self {
        self.config.rehash_attempts = attempts;
        self
    }

    /// Fix the salt seed for reproducible placement.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Replace all settings at once.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Use custom hash functions for the three table roles.
    #[must_use]
    pub fn hashers<T: BuildHasher>(self, hashers: [T; 3]) -> CuckooTableBuilder<T> {
        CuckooTableBuilder {
            config: self.config,
            hashers,
        }
    }

    /// Allocate the table.
    pub fn build<K, V>(self) -> Result<CuckooTable<K, V, S>>
    where
        K: Hash + Eq,
    {
        CuckooTable::from_parts(self.config.normalized(), self.hashers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_clamps_out_of_range_values() {
        let c = Config {
            start_size_exp: 0,
            max_size_exp: 99,
            rehash_attempts: 0,
            seed: None,
        }
        .normalized();
        assert_eq!(c.start_size_exp, MIN_SIZE_EXP);
        assert_eq!(c.max_size_exp, MAX_SIZE_EXP);
        assert_eq!(c.rehash_attempts, 1);
    }

    #[test]
    fn start_never_exceeds_max() {
        let c = Config {
            start_size_exp: 10,
            max_size_exp: 3,
            ..Config::default()
        }
        .normalized();
        assert_eq!(c.start_size_exp, 3);
    }
}
