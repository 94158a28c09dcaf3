//! # disposal-groups
//!
//! Ordered, timeout-guarded teardown for async Rust.
//!
//! ## Features
//!
//! - **Named groups**: disposables live in named groups ordered by `before`/`after` constraints
//! - **LIFO teardown**: within a group, the last disposable added is disposed first
//! - **Per-entry timeouts**: a slow disposer fails the pass with a named timeout error
//! - **Fail-fast**: the first failing group stops disposal of the groups after it
//! - **Guards**: [`SafeDisposable`] holds off teardown while operations are in flight
//! - **Disposal-safe timers**: timers that never fire after disposal started
//!
//! ## Quick Start
//!
//! ```rust
//! use disposal_groups::{AddOptions, Disposable, Disposables, GroupConstraint};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), disposal_groups::DisposalError> {
//! let disposables = Disposables::new();
//!
//! // Connections close before anything in the default group
//! disposables.register_group("connections", GroupConstraint::before("default"))?;
//!
//! disposables.add(
//!     Disposable::from_fn(|| async { /* close the pool */ }),
//!     AddOptions::named("pool")
//!         .in_group("connections")
//!         .with_timeout(Duration::from_millis(500)),
//! )?;
//! disposables.add(Disposable::from_sync_fn(|| { /* flush caches */ }), AddOptions::named("cache"))?;
//!
//! assert_eq!(disposables.list().total_timeout, Duration::from_millis(1500));
//! disposables.dispose().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Guards
//!
//! ```rust
//! use disposal_groups::{GuardOptions, SafeDisposable};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), disposal_groups::DisposalError> {
//! let service = SafeDisposable::new("service");
//!
//! let guard = service.guard(GuardOptions::named("request"))?;
//! let disposing = tokio::spawn({
//!     let service = service.clone();
//!     async move { service.dispose().await }
//! });
//!
//! // Teardown waits for the request to finish
//! tokio::task::yield_now().await;
//! guard.done();
//!
//! disposing.await.unwrap()?;
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod collection;
pub mod config;
pub mod constraints;
pub mod diagnostics;
pub mod disposable;
pub mod error;
pub mod options;
pub mod safe;
pub mod state;
pub mod traits;

// Internal modules
mod internal;

// Re-export core types
pub use collection::{Disposables, RemoveHandle, DEFAULT_GROUP};
pub use config::{DisposalConfig, DEFAULT_GUARD_TIMEOUT, DEFAULT_TIMEOUT};
pub use constraints::{
    normalize_constraints, resolve_insertion_index, GroupConstraint, InsertionIndex, RegisteredConstraint,
};
pub use diagnostics::{DisposableInfo, DisposablesSnapshot, GroupSnapshot};
pub use disposable::{Disposable, DisposableKey, NameSequence};
pub use error::{BoxError, DisposalError, DisposalResult};
pub use options::{AddOptions, GuardOptions};
pub use safe::{Guard, SafeDisposable, TimerHandle, DELAY_DISPOSAL_GROUP};
pub use state::DisposalState;
pub use traits::{AsyncDispose, Dispose};

/// Creates an orchestrator with only the `"default"` group.
///
/// With `allow_unnamed_disposables` set to false, every `add` must carry a name.
///
/// # Examples
///
/// ```
/// use disposal_groups::{create_disposables, Disposable, DisposalError};
///
/// let strict = create_disposables(false);
/// let err = strict.add(Disposable::from_sync_fn(|| {}), "default").unwrap_err();
/// assert!(matches!(err, DisposalError::UnnamedDisposable { .. }));
/// ```
pub fn create_disposables(allow_unnamed_disposables: bool) -> Disposables {
    Disposables::with_config(DisposalConfig::default().allow_unnamed_disposables(allow_unnamed_disposables))
}

/// Creates a [`SafeDisposable`] named `name`.
pub fn create_safe_disposable(name: impl Into<String>) -> SafeDisposable {
    SafeDisposable::new(name)
}
