//! Debug-only reentrancy guard.
//!
//! User `Hash` and `Eq` impls run while a table is mid-operation; if one of
//! them reaches back into the same table the tables may be observed between
//! a swap and its completion. In debug builds, entering twice panics and names
//! the operation already in progress. In release builds the guard is empty.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-table reentrancy tracker. Public entry points call
/// `let _g = self.reentrancy.enter("op");` before touching the raw table.
#[derive(Debug)]
pub struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Send but !Sync in every build: tables are shared behind a caller lock.
    _not_sync: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _not_sync: PhantomData,
        }
    }

    /// Enter operation `op`. In debug builds, panics if another operation on
    /// the same table has not returned yet.
    #[inline]
    pub fn enter(&self, op: &'static str) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("reentrancy detected: `{op}` called while `{outer}` is running");
            }
            self.active.set(Some(op));
            ReentrancyGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            ReentrancyGuard { _z: PhantomData }
        }
    }

    /// Name of the operation currently in progress (debug builds only).
    #[cfg(debug_assertions)]
    pub fn active(&self) -> Option<&'static str> {
        self.active.get()
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `DebugReentrancy::enter`.
pub struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}
