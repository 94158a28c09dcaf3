//! Per-group registry of named disposables with reverse-order teardown.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::collection::RemoveHandle;
use crate::diagnostics::DisposableInfo;
use crate::disposable::{Disposable, DisposableKey};
use crate::error::{BoxError, DisposalError, DisposalResult};

/// What a group does when an entry exceeds its timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimeoutPolicy {
    /// Abort the whole disposal with [`DisposalError::Timeout`]
    Fail,
    /// Stop waiting and continue with the next entry
    Abandon,
}

struct NamedDisposable {
    key: DisposableKey,
    disposable: Disposable,
    name: String,
    timeout: Duration,
    policy: TimeoutPolicy,
}

/// Payload of a disposer that panicked.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct DisposerPanic(String);

/// Container for one group's disposables, disposed in LIFO order.
///
/// Entries are keyed by handle identity; insertion order defines teardown order.
pub(crate) struct DisposeBag {
    group: String,
    entries: Mutex<Vec<NamedDisposable>>,
}

impl DisposeBag {
    pub(crate) fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// A bag that starts out holding `seed`, in order.
    ///
    /// Every seeded handle must be distinct; no duplicate check is made.
    pub(crate) fn seeded(group: impl Into<String>, seed: Vec<(String, Disposable)>, timeout: Duration) -> Self {
        let entries = seed
            .into_iter()
            .map(|(name, disposable)| NamedDisposable {
                key: disposable.key(),
                disposable,
                name,
                timeout,
                policy: TimeoutPolicy::Fail,
            })
            .collect();
        Self {
            group: group.into(),
            entries: Mutex::new(entries),
        }
    }

    pub(crate) fn group(&self) -> &str {
        &self.group
    }

    /// Register a disposable at the end of insertion order.
    pub(crate) fn add(
        self: &Arc<Self>,
        disposable: Disposable,
        name: String,
        timeout: Duration,
        policy: TimeoutPolicy,
    ) -> DisposalResult<RemoveHandle> {
        let key = disposable.key();
        let mut entries = self.entries.lock();
        if entries.iter().any(|entry| entry.key == key) {
            return Err(DisposalError::DuplicateDisposable {
                name,
                group: self.group.clone(),
            });
        }
        debug!(group = %self.group, name = %name, timeout_ms = timeout.as_millis() as u64, "disposable added");
        entries.push(NamedDisposable {
            key,
            disposable,
            name,
            timeout,
            policy,
        });
        Ok(RemoveHandle::new(Arc::downgrade(self), key))
    }

    /// Remove the entry for `key`; returns false when absent.
    pub(crate) fn remove(&self, key: DisposableKey) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|entry| entry.key == key) {
            Some(index) => {
                let entry = entries.remove(index);
                debug!(group = %self.group, name = %entry.name, "disposable removed");
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, key: DisposableKey) -> bool {
        self.entries.lock().iter().any(|entry| entry.key == key)
    }

    /// Snapshot of the entries in insertion order.
    pub(crate) fn list(&self) -> Vec<DisposableInfo> {
        self.entries
            .lock()
            .iter()
            .map(|entry| DisposableInfo {
                name: entry.name.clone(),
                timeout: entry.timeout,
            })
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Dispose every entry in reverse insertion order.
    ///
    /// The registry is emptied before the first disposer runs, so disposers that
    /// add to or remove from this group do not affect the pass in flight.
    pub(crate) async fn dispose(&self) -> DisposalResult<()> {
        let entries = std::mem::take(&mut *self.entries.lock());
        for entry in entries.into_iter().rev() {
            self.dispose_entry(entry).await?;
        }
        Ok(())
    }

    async fn dispose_entry(&self, entry: NamedDisposable) -> DisposalResult<()> {
        trace!(group = %self.group, name = %entry.name, "disposing");
        let disposable = entry.disposable;
        // Dropping the JoinHandle on timeout detaches the task; it may still finish.
        let task = tokio::spawn(async move { disposable.invoke().await });

        match tokio::time::timeout(entry.timeout, task).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(source))) => Err(failure(entry.name, source)),
            Ok(Err(join_error)) => {
                let source: BoxError = if join_error.is_panic() {
                    Box::new(DisposerPanic(panic_message(join_error.into_panic())))
                } else {
                    Box::new(join_error)
                };
                Err(failure(entry.name, source))
            }
            Err(_) => match entry.policy {
                TimeoutPolicy::Fail => {
                    warn!(group = %self.group, name = %entry.name, timeout_ms = entry.timeout.as_millis() as u64, "disposal timed out");
                    Err(DisposalError::Timeout {
                        name: entry.name,
                        timeout_ms: entry.timeout.as_millis(),
                    })
                }
                TimeoutPolicy::Abandon => {
                    warn!(group = %self.group, name = %entry.name, timeout_ms = entry.timeout.as_millis() as u64, "stopped waiting for disposable");
                    Ok(())
                }
            },
        }
    }
}

/// Wrap a disposer error, passing timeouts through untouched.
fn failure(name: String, source: BoxError) -> DisposalError {
    match source.downcast::<DisposalError>() {
        Ok(inner) if matches!(*inner, DisposalError::Timeout { .. }) => *inner,
        Ok(inner) => DisposalError::Failed {
            name,
            message: inner.to_string(),
            source: inner,
        },
        Err(source) => DisposalError::Failed {
            name,
            message: source.to_string(),
            source,
        },
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "disposer panicked".to_string()
    }
}
