//! Error types for cuckoo-table.

use core::fmt;

use thiserror::Error;

/// Failure of a growing, compacting or inserting operation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("allocating a table of {slots} slots failed")]
    AllocFailed { slots: usize },

    #[error("base size limit of 2^{max_size_exp} reached")]
    CapacityLimit { max_size_exp: u32 },

    #[error("insert gave up after exhausting its rehash/grow rounds")]
    Exhausted,
}

impl Error {
    /// True for failures caused by running out of memory or size budget.
    pub fn is_alloc(&self) -> bool {
        matches!(self, Self::AllocFailed { .. } | Self::CapacityLimit { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A failed insert. Carries the entry that ended up without a slot.
///
/// The homeless entry is not necessarily the one passed to `insert`: a stalled
/// displacement chain may have stored the new entry and pushed out an older
/// one. Either way `len()` is unchanged by the failed call.
#[derive(Error)]
#[error("{error}")]
pub struct InsertError<K, V> {
    pub error: Error,
    pub key: K,
    pub value: V,
}

impl<K, V> InsertError<K, V> {
    /// Take back the homeless entry.
    pub fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}

// Manual impl so K and V need not be Debug.
impl<K, V> fmt::Debug for InsertError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
