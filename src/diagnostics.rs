//! Read-only snapshots returned by `list()`.

use std::time::Duration;

use crate::constraints::RegisteredConstraint;

/// One registered disposable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DisposableInfo {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "timeout_ms", serialize_with = "as_millis"))]
    pub timeout: Duration,
}

/// One group, in disposal order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GroupSnapshot {
    pub name: String,
    /// Entries in insertion order (disposed last to first)
    pub disposables: Vec<DisposableInfo>,
    /// Sum of the entries' timeouts
    #[cfg_attr(feature = "serde", serde(rename = "total_timeout_ms", serialize_with = "as_millis"))]
    pub total_timeout: Duration,
}

/// Diagnostic view of a [`Disposables`](crate::Disposables) instance.
///
/// Taking a snapshot never mutates the orchestrator.
///
/// # Examples
///
/// ```
/// use disposal_groups::{AddOptions, Disposable, Disposables};
/// use std::time::Duration;
///
/// let disposables = Disposables::new();
/// disposables
///     .add(
///         Disposable::from_sync_fn(|| {}),
///         AddOptions::named("cache").with_timeout(Duration::from_millis(20)),
///     )
///     .unwrap();
///
/// let snapshot = disposables.list();
/// assert_eq!(snapshot.groups[0].name, "default");
/// assert_eq!(snapshot.groups[0].disposables[0].name, "cache");
/// assert_eq!(snapshot.total_timeout, Duration::from_millis(20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DisposablesSnapshot {
    /// Every constraint accepted so far, in registration order
    pub constraints: Vec<RegisteredConstraint>,
    /// Groups in disposal order
    pub groups: Vec<GroupSnapshot>,
    /// Sum across all groups
    #[cfg_attr(feature = "serde", serde(rename = "total_timeout_ms", serialize_with = "as_millis"))]
    pub total_timeout: Duration,
}

impl GroupSnapshot {
    pub(crate) fn new(name: String, disposables: Vec<DisposableInfo>) -> Self {
        let total_timeout = disposables.iter().map(|d| d.timeout).sum();
        Self {
            name,
            disposables,
            total_timeout,
        }
    }
}

impl DisposablesSnapshot {
    pub(crate) fn new(constraints: Vec<RegisteredConstraint>, groups: Vec<GroupSnapshot>) -> Self {
        let total_timeout = groups.iter().map(|g| g.total_timeout).sum();
        Self {
            constraints,
            groups,
            total_timeout,
        }
    }

    /// Finds a group by name.
    pub fn group(&self, name: &str) -> Option<&GroupSnapshot> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Number of disposables across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.disposables.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the snapshot as pretty-printed JSON.
    #[cfg(feature = "diagnostics")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(feature = "serde")]
fn as_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
