//! Guard tokens that postpone teardown while an operation is in flight.

use std::fmt;

use tokio::sync::watch;

use crate::collection::RemoveHandle;

/// Token for an in-flight operation on a [`SafeDisposable`](super::SafeDisposable).
///
/// While a guard is held, `dispose()` waits for it before running the default
/// group. The guard is released by [`done`](Self::done) or by dropping it, so an
/// early return or a panic inside the guarded region still releases it. A guard
/// that outlives its timeout during disposal is no longer waited for.
#[must_use = "dropping a guard releases it immediately"]
pub struct Guard {
    name: String,
    release: Option<watch::Sender<bool>>,
    remove: RemoveHandle,
}

impl Guard {
    pub(crate) fn new(name: String, release: watch::Sender<bool>, remove: RemoveHandle) -> Self {
        Self {
            name,
            release: Some(release),
            remove,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Releases the guard.
    pub fn done(self) {}

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            // No receiver left means the guard entry is already gone.
            let _ = release.send(true);
            self.remove.remove();
        }
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("name", &self.name)
            .field("released", &self.release.is_none())
            .finish()
    }
}
