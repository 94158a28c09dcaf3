//! Disposable handles.
//!
//! A [`Disposable`] is the teardown action for one resource: a closure or an
//! object implementing [`Dispose`] / [`AsyncDispose`]. Every variant is normalized
//! to the same async invocation when the group disposes it, and every variant is
//! identified by the address of the `Arc` it wraps.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::BoxError;
use crate::traits::{AsyncDispose, Dispose};

/// Future returned by a single disposer invocation.
pub(crate) type DisposeFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send>>;

type AsyncDisposeFn = dyn Fn() -> DisposeFuture + Send + Sync;
type SyncDisposeFn = dyn Fn() -> Result<(), BoxError> + Send + Sync;

/// Teardown action for one resource.
///
/// Handles are compared by identity, never structurally: a clone of a handle is
/// the same disposable, while two handles built from two separate closures are
/// different even if the closures are identical. Keep a clone of the handle to
/// [`remove`](crate::Disposables::remove) it later.
///
/// # Examples
///
/// ```
/// use disposal_groups::Disposable;
/// use std::sync::Arc;
///
/// let close = Disposable::from_sync_fn(|| println!("closed"));
/// let same = close.clone();
/// assert_eq!(close.key(), same.key());
///
/// let other = Disposable::from_sync_fn(|| println!("closed"));
/// assert_ne!(close.key(), other.key());
/// ```
#[derive(Clone)]
pub enum Disposable {
    /// Async closure
    Async(Arc<AsyncDisposeFn>),
    /// Sync closure
    Sync(Arc<SyncDisposeFn>),
    /// Object with an async `dispose()`
    Object(Arc<dyn AsyncDispose>),
    /// Object with a sync `dispose()`
    SyncObject(Arc<dyn Dispose>),
}

impl Disposable {
    /// Wraps an infallible async closure.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Disposable::Async(Arc::new(move || {
            let fut = f();
            Box::pin(async move {
                fut.await;
                Ok(())
            }) as DisposeFuture
        }))
    }

    /// Wraps an async closure that may fail.
    pub fn from_fallible_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Disposable::Async(Arc::new(move || Box::pin(f()) as DisposeFuture))
    }

    /// Wraps an infallible sync closure.
    pub fn from_sync_fn<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Disposable::Sync(Arc::new(move || {
            f();
            Ok(())
        }))
    }

    /// Wraps a sync closure that may fail.
    pub fn from_fallible_sync_fn<F>(f: F) -> Self
    where
        F: Fn() -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Disposable::Sync(Arc::new(f))
    }

    /// Wraps a shared object with an async `dispose()`.
    ///
    /// Wrapping the same `Arc` twice yields the same identity.
    pub fn object<T: AsyncDispose>(object: Arc<T>) -> Self {
        Disposable::Object(object)
    }

    /// Wraps a shared object with a sync `dispose()`.
    pub fn sync_object<T: Dispose>(object: Arc<T>) -> Self {
        Disposable::SyncObject(object)
    }

    /// Identity of this handle.
    pub fn key(&self) -> DisposableKey {
        let ptr = match self {
            Disposable::Async(f) => Arc::as_ptr(f) as *const (),
            Disposable::Sync(f) => Arc::as_ptr(f) as *const (),
            Disposable::Object(o) => Arc::as_ptr(o) as *const (),
            Disposable::SyncObject(o) => Arc::as_ptr(o) as *const (),
        };
        DisposableKey(ptr as usize)
    }

    /// Runs the teardown action.
    pub(crate) fn invoke(&self) -> DisposeFuture {
        match self {
            Disposable::Async(f) => f(),
            Disposable::Sync(f) => {
                let f = f.clone();
                Box::pin(async move { f() })
            }
            Disposable::Object(o) => {
                let o = o.clone();
                Box::pin(async move { o.dispose().await })
            }
            Disposable::SyncObject(o) => {
                let o = o.clone();
                Box::pin(async move { o.dispose() })
            }
        }
    }
}

impl PartialEq for Disposable {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Disposable {}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Disposable::Async(_) => "Async",
            Disposable::Sync(_) => "Sync",
            Disposable::Object(_) => "Object",
            Disposable::SyncObject(_) => "SyncObject",
        };
        f.debug_tuple("Disposable").field(&kind).field(&self.key()).finish()
    }
}

/// Identity of a [`Disposable`], derived from the address of its `Arc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisposableKey(usize);

/// Source of `unnamed-<n>` labels for disposables added without a name.
///
/// Labels are never reused or reset for the life of the sequence. Each
/// [`Disposables`](crate::Disposables) owns one; clone it into several
/// orchestrators to share a single numbering.
#[derive(Debug, Clone, Default)]
pub struct NameSequence(Arc<AtomicU64>);

impl NameSequence {
    /// Creates a sequence starting at `unnamed-0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused label.
    pub fn next_name(&self) -> String {
        format!("unnamed-{}", self.0.fetch_add(1, Ordering::Relaxed))
    }
}
