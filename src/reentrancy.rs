//! Debug-only reentrancy guard.
//!
//! The map calls into user code (`Hash`, `Eq`, `Default`, value
//! constructors) while a chain is being walked or relinked. In debug
//! builds, entering the map again from such code panics instead of
//! observing a half-updated chain. In release builds the guard compiles
//! to nothing.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map reentrancy tracker. Public entry points call
/// `let _g = self.reentrancy.enter();` before touching user code.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    entered: Cell<bool>,
    // The map is single-threaded; this keeps it !Send + !Sync.
    _nosend: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            entered: Cell::new(false),
            _nosend: PhantomData,
        }
    }

    /// Enter a guarded section. Panics in debug builds if already inside one.
    #[inline]
    pub(crate) fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.entered.replace(true),
                "reentrancy detected: ChainedOrderedMap entered from user code"
            );
            ReentrancyGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            ReentrancyGuard { _z: PhantomData }
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by [`DebugReentrancy::enter`].
pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let was = self.owner.entered.replace(false);
            debug_assert!(was);
        }
    }
}
