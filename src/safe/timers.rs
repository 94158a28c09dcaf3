//! Timers owned by a [`SafeDisposable`](super::SafeDisposable).

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::task::AbortHandle;

/// Live timer tasks, aborted together when the owner is disposed.
#[derive(Default)]
pub(crate) struct TimerSet {
    next_id: AtomicU64,
    handles: Mutex<HashMap<u64, AbortHandle>>,
}

impl TimerSet {
    /// Spawns the future built by `make` and tracks it until it finishes or is cleared.
    pub(crate) fn spawn<F, Fut>(self: &Arc<Self>, make: F) -> TimerHandle
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // Held across the spawn so a task that finishes at once cannot forget
        // itself before it is tracked.
        let mut handles = self.handles.lock();
        let task = tokio::spawn(make(id));
        handles.insert(id, task.abort_handle());
        TimerHandle {
            id,
            timers: Arc::downgrade(self),
        }
    }

    /// Stops tracking a timer that finished on its own.
    pub(crate) fn forget(&self, id: u64) {
        self.handles.lock().remove(&id);
    }

    fn clear(&self, id: u64) -> bool {
        match self.handles.lock().remove(&id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Aborts every live timer.
    pub(crate) fn clear_all(&self) {
        let handles: Vec<AbortHandle> = self.handles.lock().drain().map(|(_, handle)| handle).collect();
        for handle in handles {
            handle.abort();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.lock().len()
    }
}

/// Handle to a timer created with `set_timeout` or `set_interval`.
#[derive(Clone)]
pub struct TimerHandle {
    id: u64,
    timers: Weak<TimerSet>,
}

impl TimerHandle {
    /// Cancels the timer; returns false when it already fired or was cleared.
    pub fn clear(&self) -> bool {
        self.timers.upgrade().map_or(false, |timers| timers.clear(self.id))
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle").field("id", &self.id).finish()
    }
}
