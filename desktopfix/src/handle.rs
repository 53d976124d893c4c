//! Relocatable memory blocks
//!
//! The Memory Manager may move or purge an unlocked block whenever it
//! compacts the heap. Anything that reads block contents over a span of
//! work must lock the block first and afterwards put back exactly the
//! state it found (`HGetState` / `HLock` / `HSetState`).
//!
//! [`Handle::lock`] returns a [`HandleLock`] that does the restore on drop,
//! so every exit path of the caller is covered.

use core::ops::Deref;

use bitflags::bitflags;
use spin::Mutex;

bitflags! {
    /// Block state byte as returned by `HGetState`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HandleState: u8 {
        /// Block may not move or be purged
        const LOCKED = 0x80;
        /// Block may be purged when unlocked
        const PURGEABLE = 0x40;
        /// Block belongs to a resource file
        const RESOURCE = 0x20;
    }
}

/// A relocatable block.
///
/// `master` is `None` once the block has been purged (an empty handle).
#[derive(Debug)]
pub struct Handle<T> {
    master: Option<T>,
    state: Mutex<HandleState>,
}

impl<T> Handle<T> {
    /// Allocate an unlocked, non-purgeable block
    pub fn new(value: T) -> Self {
        Self::with_state(value, HandleState::empty())
    }

    /// Allocate a block with a given initial state
    pub fn with_state(value: T, state: HandleState) -> Self {
        Self {
            master: Some(value),
            state: Mutex::new(state),
        }
    }

    /// A handle whose block has been purged
    pub fn purged(state: HandleState) -> Self {
        Self {
            master: None,
            state: Mutex::new(state),
        }
    }

    /// Check if the master pointer is nil
    pub fn is_purged(&self) -> bool {
        self.master.is_none()
    }

    /// Look at the block without locking it.
    ///
    /// Only valid for reads that finish before the next heap compaction.
    pub fn peek(&self) -> Option<&T> {
        self.master.as_ref()
    }

    /// `HGetState`
    pub fn state(&self) -> HandleState {
        *self.state.lock()
    }

    /// `HSetState`
    pub fn set_state(&self, state: HandleState) {
        *self.state.lock() = state;
    }

    /// Lock the block for the lifetime of the returned guard.
    ///
    /// Returns `None` without touching the state if the block is purged.
    pub fn lock(&self) -> Option<HandleLock<'_, T>> {
        let data = self.master.as_ref()?;
        let prior = {
            let mut state = self.state.lock();
            let prior = *state;
            state.insert(HandleState::LOCKED);
            prior
        };
        Some(HandleLock {
            handle: self,
            data,
            prior,
        })
    }
}

/// Scoped lock on a [`Handle`]. Restores the recorded state on drop.
pub struct HandleLock<'a, T> {
    handle: &'a Handle<T>,
    data: &'a T,
    prior: HandleState,
}

impl<'a, T> HandleLock<'a, T> {
    /// The state the block had before it was locked
    pub fn prior_state(&self) -> HandleState {
        self.prior
    }
}

impl<'a, T> Deref for HandleLock<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.data
    }
}

impl<'a, T> Drop for HandleLock<'a, T> {
    fn drop(&mut self) {
        self.handle.set_state(self.prior);
    }
}
