//! cuckoo-table: a three-table cuckoo hash map with worst-case constant
//! lookups, automatic growth and optional automatic compaction.
//!
//! Internal Design:
//!
//! Summary
//! - Three slot arrays of sizes `4·S`, `2·S` and `S` (`S = 2^k`, `k ≥ 1`),
//!   each with its own hash function and salt. A key may live only at its
//!   hashed slot in one of the three, so a lookup probes at most three slots.
//! - Layers:
//!   - `Table<K, V>`: one slot array of `Option<Entry>`, allocated fallibly.
//!   - `RawCuckoo<K, V, S>`: the three tables plus hashers, salts and
//!     counters; displacement, rehash, grow and compact live here.
//!   - `CuckooTable<K, V, S>`: public map API with a debug-only reentrancy
//!     guard around every entry point.
//!
//! Insertion
//! - An insert runs a displacement chain: store at `T1`, carry the evicted
//!   entry to `T2`, then `T3`, then `T1` again, for at most `⌈√(4·S)⌉`
//!   cycles. A stalled chain is followed by a rehash of all three tables, or
//!   by doubling `S` once the table is judged too full. After six fruitless
//!   rounds the insert fails and hands back the entry left without a slot.
//! - Inserting an existing key replaces its value in place.
//!
//! Resizing
//! - Growth allocates a new `T1` of `8·S` slots; the old `T1` and `T2` become
//!   `T2` and `T3` with their hashers and salts, so their entries stay put.
//!   Only the retired `T3` is re-inserted. Compaction is the mirror image.
//! - `remove` compacts at most once per growth when the load drops to
//!   `2·S`; `reserve` disables that so removals stay O(1).
//!
//! Reentrancy policy
//! - User `Hash`/`Eq` impls run while entries are in flight. Calling back
//!   into the same table from them panics in debug builds and is
//!   unsupported in release builds.
//!
//! Concurrency
//! - `Send` when `K`, `V` and `S` are, never `Sync`. Share behind a lock.
//!
//! Notes and non-goals
//! - No persistence, no lock-free access, no stable iteration order.

mod config;
mod cuckoo_table;
mod cuckoo_table_proptest;
mod displace;
mod error;
mod raw;
mod reentrancy;
mod resize;
mod salt;
mod table;

// Public surface
pub use config::{
    AutoCompact, Config, CuckooTableBuilder, DEFAULT_REHASH_ATTEMPTS, DEFAULT_START_SIZE_EXP,
    MAX_SIZE_EXP, MIN_SIZE_EXP,
};
pub use cuckoo_table::CuckooTable;
pub use error::{Error, InsertError, Result};
pub use reentrancy::{DebugReentrancy, ReentrancyGuard};
