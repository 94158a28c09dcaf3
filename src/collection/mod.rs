//! Disposal-group orchestrator.
//!
//! [`Disposables`] owns an ordered sequence of named groups, each a LIFO registry
//! of disposables. Groups are disposed one after another in sequence order, and a
//! failing group stops the whole pass.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::DisposalConfig;
use crate::constraints::{normalize_constraints, resolve_insertion_index, GroupConstraint, RegisteredConstraint};
use crate::diagnostics::{DisposablesSnapshot, GroupSnapshot};
use crate::disposable::{Disposable, DisposableKey, NameSequence};
use crate::error::{DisposalError, DisposalResult};
use crate::internal::{DisposeBag, TimeoutPolicy};
use crate::options::AddOptions;

/// Name of the group every orchestrator starts with.
pub const DEFAULT_GROUP: &str = "default";

/// Ordered collection of disposal groups.
///
/// Cloning is cheap and yields a handle to the same groups.
///
/// # Examples
///
/// ```
/// use disposal_groups::{Disposable, Disposables, GroupConstraint};
/// use std::sync::{Arc, Mutex};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), disposal_groups::DisposalError> {
/// let order = Arc::new(Mutex::new(Vec::new()));
/// let record = |label: &'static str| {
///     let order = order.clone();
///     Disposable::from_sync_fn(move || order.lock().unwrap().push(label))
/// };
///
/// let disposables = Disposables::new();
/// disposables.register_group("first", GroupConstraint::before("default"))?;
/// disposables.register_group("last", GroupConstraint::after("default"))?;
///
/// disposables.add(record("last"), "last")?;
/// disposables.add(record("default"), "default")?;
/// disposables.add(record("first"), "first")?;
///
/// disposables.dispose().await?;
/// assert_eq!(*order.lock().unwrap(), vec!["first", "default", "last"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Disposables {
    inner: Arc<DisposablesInner>,
}

struct DisposablesInner {
    label: Option<String>,
    config: DisposalConfig,
    names: NameSequence,
    groups: Mutex<Vec<Arc<DisposeBag>>>,
    constraints: Mutex<Vec<RegisteredConstraint>>,
}

impl Disposables {
    /// Creates an orchestrator with only the `"default"` group.
    pub fn new() -> Self {
        Self::with_config(DisposalConfig::default())
    }

    /// Creates an orchestrator whose label appears in log events.
    pub fn named(label: impl Into<String>) -> Self {
        Self::build(Some(label.into()), DisposalConfig::default(), NameSequence::new(), &[], Vec::new())
    }

    pub fn with_config(config: DisposalConfig) -> Self {
        Self::build(None, config, NameSequence::new(), &[], Vec::new())
    }

    /// Creates an orchestrator that draws `unnamed-<n>` labels from `names`.
    ///
    /// Orchestrators built from clones of one [`NameSequence`] never hand out the
    /// same label twice.
    pub fn with_name_sequence(config: DisposalConfig, names: NameSequence) -> Self {
        Self::build(None, config, names, &[], Vec::new())
    }

    /// Creates an orchestrator with `leading` groups placed before `"default"`,
    /// each constrained to run before it, and `seed` already in the default group.
    pub(crate) fn with_leading_groups(
        label: String,
        config: DisposalConfig,
        leading: &[&str],
        seed: Vec<(String, Disposable)>,
    ) -> Self {
        Self::build(Some(label), config, NameSequence::new(), leading, seed)
    }

    fn build(
        label: Option<String>,
        config: DisposalConfig,
        names: NameSequence,
        leading: &[&str],
        seed: Vec<(String, Disposable)>,
    ) -> Self {
        let mut groups: Vec<Arc<DisposeBag>> = leading
            .iter()
            .map(|name| Arc::new(DisposeBag::new(*name)))
            .collect();
        groups.push(Arc::new(DisposeBag::seeded(
            DEFAULT_GROUP,
            seed,
            whole_millis(config.default_timeout),
        )));

        let constraints = leading
            .iter()
            .map(|name| RegisteredConstraint::new(name, &GroupConstraint::before(DEFAULT_GROUP)))
            .collect();

        Self {
            inner: Arc::new(DisposablesInner {
                label,
                config,
                names,
                groups: Mutex::new(groups),
                constraints: Mutex::new(constraints),
            }),
        }
    }

    /// Label given at construction, if any.
    pub fn name(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }

    pub fn config(&self) -> &DisposalConfig {
        &self.inner.config
    }

    /// Group names in disposal order.
    pub fn group_names(&self) -> Vec<String> {
        self.inner
            .groups
            .lock()
            .iter()
            .map(|group| group.group().to_string())
            .collect()
    }

    /// Registers a new empty group positioned by `constraints`.
    ///
    /// Accepts a single [`GroupConstraint`], a `Vec`, or an array; all constraints
    /// must hold at once.
    ///
    /// # Errors
    ///
    /// - [`DisposalError::EmptyConstraints`] for an empty constraint list
    /// - [`DisposalError::DuplicateGroup`] when `name` is taken
    /// - [`DisposalError::UnknownConstraintTarget`] when a constraint names a missing group
    /// - [`DisposalError::ContradictoryConstraints`] when no position satisfies all constraints
    pub fn register_group(
        &self,
        name: impl Into<String>,
        constraints: impl Into<Vec<GroupConstraint>>,
    ) -> DisposalResult<()> {
        let name = name.into();
        let mut groups = self.inner.groups.lock();
        let existing: Vec<&str> = groups.iter().map(|group| group.group()).collect();

        let constraints = normalize_constraints(constraints, &name, &existing)?;
        let position = resolve_insertion_index(&constraints, &existing)?.position(existing.len());

        debug!(label = ?self.inner.label, group = %name, position, "group registered");
        groups.insert(position, Arc::new(DisposeBag::new(name.clone())));
        self.inner
            .constraints
            .lock()
            .extend(constraints.iter().map(|c| RegisteredConstraint::new(&name, c)));
        Ok(())
    }

    /// Adds `disposable` to a group.
    ///
    /// `options` may be [`AddOptions`] or a bare group name. Returns a handle that
    /// removes this entry again. Timeouts are rounded up to whole milliseconds,
    /// with a floor of 1ms.
    ///
    /// # Errors
    ///
    /// - [`DisposalError::UnknownGroup`] when the target group does not exist
    /// - [`DisposalError::DuplicateDisposable`] when the handle is already in that group
    /// - [`DisposalError::UnnamedDisposable`] when no name is given and unnamed
    ///   disposables are disabled
    pub fn add(&self, disposable: Disposable, options: impl Into<AddOptions>) -> DisposalResult<RemoveHandle> {
        let options = options.into();
        let timeout = options.timeout.unwrap_or(self.inner.config.default_timeout);
        self.add_with_policy(disposable, options, timeout, TimeoutPolicy::Fail)
    }

    pub(crate) fn add_with_policy(
        &self,
        disposable: Disposable,
        options: AddOptions,
        timeout: Duration,
        policy: TimeoutPolicy,
    ) -> DisposalResult<RemoveHandle> {
        let group_name = options.group.as_deref().unwrap_or(DEFAULT_GROUP);
        let group = self.find_group(group_name)?;

        let name = match options.name {
            Some(name) => name,
            None if self.inner.config.allow_unnamed_disposables => self.inner.names.next_name(),
            None => {
                return Err(DisposalError::UnnamedDisposable {
                    group: group_name.to_string(),
                })
            }
        };

        group.add(disposable, name, whole_millis(timeout), policy)
    }

    fn find_group(&self, name: &str) -> DisposalResult<Arc<DisposeBag>> {
        self.inner
            .groups
            .lock()
            .iter()
            .find(|group| group.group() == name)
            .cloned()
            .ok_or_else(|| DisposalError::UnknownGroup {
                group: name.to_string(),
            })
    }

    /// Removes `disposable` from every group holding it.
    ///
    /// Returns false when no group held it; that is not an error.
    pub fn remove(&self, disposable: &Disposable) -> bool {
        let key = disposable.key();
        let groups = self.inner.groups.lock().clone();
        groups
            .iter()
            .fold(false, |removed, group| group.remove(key) || removed)
    }

    /// Returns true when any group holds `disposable`.
    pub fn contains(&self, disposable: &Disposable) -> bool {
        let key = disposable.key();
        self.inner.groups.lock().iter().any(|group| group.contains(key))
    }

    /// Disposes every group in sequence order.
    ///
    /// Each group disposes its entries last-added first, and the next group starts
    /// only after the previous one finished. The first failure is returned and the
    /// remaining groups are left untouched.
    ///
    /// # Errors
    ///
    /// - [`DisposalError::Timeout`] when a disposer exceeds its timeout
    /// - [`DisposalError::Failed`] when a disposer returns an error or panics
    pub async fn dispose(&self) -> DisposalResult<()> {
        let groups = self.inner.groups.lock().clone();
        info!(label = ?self.inner.label, groups = groups.len(), "disposing");
        for group in groups {
            group.dispose().await?;
        }
        info!(label = ?self.inner.label, "disposed");
        Ok(())
    }

    /// Diagnostic snapshot of constraints, groups and timeouts.
    pub fn list(&self) -> DisposablesSnapshot {
        let constraints = self.inner.constraints.lock().clone();
        let groups = self
            .inner
            .groups
            .lock()
            .iter()
            .map(|group| GroupSnapshot::new(group.group().to_string(), group.list()))
            .collect();
        DisposablesSnapshot::new(constraints, groups)
    }
}

impl Default for Disposables {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Disposables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposables")
            .field("label", &self.inner.label)
            .field("groups", &self.group_names())
            .finish()
    }
}

impl Drop for DisposablesInner {
    fn drop(&mut self) {
        let undisposed = self.groups.get_mut().iter().any(|group| !group.is_empty());
        if undisposed {
            warn!(label = ?self.label, "Disposables dropped with undisposed resources. Call dispose().await before dropping.");
        }
    }
}

/// Rounds `timeout` up to whole milliseconds, never below 1ms.
fn whole_millis(timeout: Duration) -> Duration {
    let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    if millis > 0 && timeout.subsec_nanos() % 1_000_000 == 0 {
        timeout
    } else {
        Duration::from_millis(millis.saturating_add(1))
    }
}

/// Removes one entry added with [`Disposables::add`].
///
/// Holds only a weak reference to the group, so it never keeps the orchestrator alive.
#[derive(Clone)]
pub struct RemoveHandle {
    group: Weak<DisposeBag>,
    key: DisposableKey,
}

impl RemoveHandle {
    pub(crate) fn new(group: Weak<DisposeBag>, key: DisposableKey) -> Self {
        Self { group, key }
    }

    /// Removes the entry; returns false when it was already gone.
    pub fn remove(&self) -> bool {
        self.group
            .upgrade()
            .map_or(false, |group| group.remove(self.key))
    }
}

impl fmt::Debug for RemoveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveHandle")
            .field("group", &self.group.upgrade().map(|g| g.group().to_string()))
            .field("key", &self.key)
            .finish()
    }
}
