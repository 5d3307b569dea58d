use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use strum::{Display, FromRepr};

/// Progress of the bulk load. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, FromRepr, Display)]
#[repr(u8)]
pub enum LoadState {
    NotStarted = 0,
    Loading = 1,
    Merging = 2,
    Ready = 3,
}

/// Completion signal for the bulk load.
///
/// `is_ready()` is a non-blocking poll; `wait()` blocks until the loader
/// marks the gate ready.
pub struct ReadinessGate {
    state: AtomicU8,
    condvar: Condvar,
    mutex: Mutex<()>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LoadState::NotStarted as u8),
            condvar: Condvar::new(),
            mutex: Mutex::new(()),
        }
    }

    pub fn state(&self) -> LoadState {
        LoadState::from_repr(self.state.load(Ordering::Acquire)).unwrap_or(LoadState::NotStarted)
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LoadState::Ready
    }

    /// Move to `next` if it is ahead of the current state.
    ///
    /// Returns `false` when the gate is already at or past `next`.
    pub(crate) fn advance(&self, next: LoadState) -> bool {
        // Held across the store so a waiter cannot miss the notification
        let _guard = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);
        let advanced = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < next as u8).then_some(next as u8)
            })
            .is_ok();

        if advanced && next == LoadState::Ready {
            self.condvar.notify_all();
        }
        advanced
    }

    /// Block until the gate is ready.
    pub fn wait(&self) {
        let guard = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);
        let _guard = self
            .condvar
            .wait_while(guard, |_| !self.is_ready())
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Wait up to `timeout` for the gate.
    ///
    /// Returns `true` if the gate is ready.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_ready() {
            return true;
        }

        let guard = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = self
            .condvar
            .wait_timeout_while(guard, timeout, |_| !self.is_ready())
            .unwrap_or_else(PoisonError::into_inner);
        self.is_ready()
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}
