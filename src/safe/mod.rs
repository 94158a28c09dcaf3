//! Disposal with reentrancy guards.
//!
//! [`SafeDisposable`] wraps a [`Disposables`] orchestrator and adds:
//!
//! - an idempotent `dispose()` with an observable [`DisposalState`]
//! - [`Guard`] tokens that hold off teardown while operations are in flight
//! - timers that never fire after disposal started and are aborted by it
//!
//! Guards live in a reserved group, [`DELAY_DISPOSAL_GROUP`], which runs before
//! `"default"`, so every outstanding guard is waited for (up to its timeout)
//! before any default-group disposable runs.

mod guard;
mod timers;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant};
use tracing::debug;

use crate::collection::{Disposables, RemoveHandle};
use crate::config::DisposalConfig;
use crate::constraints::GroupConstraint;
use crate::diagnostics::DisposablesSnapshot;
use crate::disposable::Disposable;
use crate::error::{DisposalError, DisposalResult};
use crate::internal::TimeoutPolicy;
use crate::options::{AddOptions, GuardOptions};
use crate::state::DisposalState;

pub use guard::Guard;
pub use timers::TimerHandle;

use timers::TimerSet;

/// Reserved group holding outstanding guards; disposed before `"default"`.
pub const DELAY_DISPOSAL_GROUP: &str = "DELAY_DISPOSAL";

/// A disposable owner that refuses new work once disposal starts.
///
/// # Examples
///
/// ```
/// use disposal_groups::{Disposable, GuardOptions, SafeDisposable};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), disposal_groups::DisposalError> {
/// let service = SafeDisposable::new("service");
/// let closed = Arc::new(AtomicBool::new(false));
/// let flag = closed.clone();
/// service.add(Disposable::from_sync_fn(move || flag.store(true, Ordering::SeqCst)), "default")?;
///
/// let value = service
///     .guarded(GuardOptions::named("request"), async { 40 + 2 })
///     .await?;
/// assert_eq!(value, 42);
///
/// service.dispose().await?;
/// assert!(closed.load(Ordering::SeqCst));
/// assert!(service.guard(GuardOptions::new()).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SafeDisposable {
    inner: Arc<SafeInner>,
}

struct SafeInner {
    name: String,
    disposables: Disposables,
    state: Arc<Mutex<DisposalState>>,
    timers: Arc<TimerSet>,
}

impl SafeDisposable {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, DisposalConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: DisposalConfig) -> Self {
        let name = name.into();
        let timers = Arc::new(TimerSet::default());
        let clear = timers.clone();
        let disposables = Disposables::with_leading_groups(
            name.clone(),
            config,
            &[DELAY_DISPOSAL_GROUP],
            vec![(
                "clear timers".to_string(),
                Disposable::from_sync_fn(move || clear.clear_all()),
            )],
        );

        Self {
            inner: Arc::new(SafeInner {
                name,
                disposables,
                state: Arc::new(Mutex::new(DisposalState::Active)),
                timers,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn config(&self) -> &DisposalConfig {
        self.inner.disposables.config()
    }

    pub fn state(&self) -> DisposalState {
        *self.inner.state.lock()
    }

    /// True once disposal started, including while it is still running.
    pub fn is_disposed(&self) -> bool {
        self.state().is_disposed()
    }

    /// The wrapped orchestrator.
    pub fn disposables(&self) -> &Disposables {
        &self.inner.disposables
    }

    /// See [`Disposables::add`].
    pub fn add(&self, disposable: Disposable, options: impl Into<AddOptions>) -> DisposalResult<RemoveHandle> {
        self.inner.disposables.add(disposable, options)
    }

    /// See [`Disposables::remove`].
    pub fn remove(&self, disposable: &Disposable) -> bool {
        self.inner.disposables.remove(disposable)
    }

    /// See [`Disposables::register_group`].
    pub fn register_group(
        &self,
        name: impl Into<String>,
        constraints: impl Into<Vec<GroupConstraint>>,
    ) -> DisposalResult<()> {
        self.inner.disposables.register_group(name, constraints)
    }

    /// See [`Disposables::list`].
    pub fn list(&self) -> DisposablesSnapshot {
        self.inner.disposables.list()
    }

    /// Disposes all groups once.
    ///
    /// Calls made while disposal is running or after it finished return `Ok(())`
    /// immediately. Outstanding guards are waited for before the default group runs.
    ///
    /// # Errors
    ///
    /// Returns the first teardown failure of the wrapped orchestrator. The state
    /// still ends up [`DisposalState::Disposed`].
    pub async fn dispose(&self) -> DisposalResult<()> {
        {
            let mut state = self.inner.state.lock();
            if *state != DisposalState::Active {
                debug!(name = %self.inner.name, state = ?*state, "dispose skipped");
                return Ok(());
            }
            *state = DisposalState::Disposing;
        }

        let result = self.inner.disposables.dispose().await;
        *self.inner.state.lock() = DisposalState::Disposed;
        result
    }

    /// Runs `register` with the state locked, provided the instance is still usable.
    ///
    /// `dispose()` cannot flip the state between the check and the registration,
    /// so anything registered here is seen by the disposal pass.
    fn while_usable<T>(
        &self,
        used_while_disposing: bool,
        register: impl FnOnce() -> DisposalResult<T>,
    ) -> DisposalResult<T> {
        let state = self.inner.state.lock();
        match *state {
            DisposalState::Active => register(),
            DisposalState::Disposing if used_while_disposing => register(),
            _ => Err(DisposalError::InstanceDisposed {
                name: self.inner.name.clone(),
            }),
        }
    }

    /// Takes a guard that postpones teardown until it is released.
    ///
    /// # Errors
    ///
    /// Returns [`DisposalError::InstanceDisposed`] after disposal finished, or while
    /// it runs unless [`GuardOptions::used_while_disposing`] is set.
    pub fn guard(&self, options: GuardOptions) -> DisposalResult<Guard> {
        let timeout = options.timeout.unwrap_or(self.config().guard_timeout);
        let name = options
            .name
            .unwrap_or_else(|| format!("{} guard", self.inner.name));

        let (release, released) = watch::channel(false);
        let wait = Disposable::from_fn(move || {
            let mut released = released.clone();
            async move {
                // A dropped sender also counts as released.
                let _ = released.wait_for(|done| *done).await;
            }
        });

        let remove = self.while_usable(options.used_while_disposing, || {
            self.inner.disposables.add_with_policy(
                wait,
                AddOptions::named(name.clone()).in_group(DELAY_DISPOSAL_GROUP),
                timeout,
                TimeoutPolicy::Abandon,
            )
        })?;
        debug!(name = %self.inner.name, guard = %name, "guard taken");
        Ok(Guard::new(name, release, remove))
    }

    /// Runs `future` under a guard released on every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`DisposalError::InstanceDisposed`] when the guard cannot be taken;
    /// `future` is not polled in that case.
    pub async fn guarded<F: Future>(&self, options: GuardOptions, future: F) -> DisposalResult<F::Output> {
        let guard = self.guard(options)?;
        let output = future.await;
        guard.done();
        Ok(output)
    }

    /// Calls `callback` once after `delay`, unless disposal started first.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`DisposalError::InstanceDisposed`] once disposal started.
    pub fn set_timeout<F>(&self, callback: F, delay: Duration) -> DisposalResult<TimerHandle>
    where
        F: FnOnce() + Send + 'static,
    {
        let state = self.inner.state.clone();
        let timers = self.inner.timers.clone();
        self.while_usable(false, || {
            Ok(self.inner.timers.spawn(move |id| async move {
                tokio::time::sleep(delay).await;
                timers.forget(id);
                if !state.lock().is_disposed() {
                    callback();
                }
            }))
        })
    }

    /// Calls `callback` every `period` until disposal starts or the timer is cleared.
    ///
    /// The first call happens one `period` after registration. Must be called from
    /// within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`DisposalError::InstanceDisposed`] once disposal started.
    pub fn set_interval<F>(&self, callback: F, period: Duration) -> DisposalResult<TimerHandle>
    where
        F: FnMut() + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let state = self.inner.state.clone();
        let timers = self.inner.timers.clone();
        self.while_usable(false, || {
            Ok(self.inner.timers.spawn(move |id| async move {
                let mut callback = callback;
                let mut ticks = interval_at(Instant::now() + period, period);
                loop {
                    ticks.tick().await;
                    if state.lock().is_disposed() {
                        break;
                    }
                    callback();
                }
                timers.forget(id);
            }))
        })
    }

    /// Number of timers that are still pending.
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.len()
    }
}

impl fmt::Debug for SafeDisposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeDisposable")
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .field("disposables", &self.inner.disposables)
            .finish()
    }
}
