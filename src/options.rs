//! Options for adding disposables and taking guards.

use std::time::Duration;

/// Options for [`Disposables::add`](crate::Disposables::add).
///
/// Unset fields fall back to the orchestrator's [`DisposalConfig`](crate::DisposalConfig):
/// the default timeout, an auto-generated `unnamed-<n>` label, and the
/// `"default"` group. A bare group name converts into options, so
/// `add(handle, "cleanup")` targets the `cleanup` group.
///
/// # Examples
///
/// ```
/// use disposal_groups::AddOptions;
/// use std::time::Duration;
///
/// let options = AddOptions::named("socket")
///     .with_timeout(Duration::from_millis(250))
///     .in_group("network");
/// assert_eq!(options.group.as_deref(), Some("network"));
///
/// let sugar: AddOptions = "network".into();
/// assert_eq!(sugar.group.as_deref(), Some("network"));
/// assert!(sugar.name.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Label used in logs and error messages
    pub name: Option<String>,
    /// Maximum time to wait for this disposer
    pub timeout: Option<Duration>,
    /// Target group
    pub group: Option<String>,
}

impl AddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

impl From<&str> for AddOptions {
    fn from(group: &str) -> Self {
        Self::new().in_group(group)
    }
}

impl From<String> for AddOptions {
    fn from(group: String) -> Self {
        Self::new().in_group(group)
    }
}

impl From<()> for AddOptions {
    fn from(_: ()) -> Self {
        Self::new()
    }
}

/// Options for [`SafeDisposable::guard`](crate::SafeDisposable::guard).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardOptions {
    /// Label used in logs
    pub name: Option<String>,
    /// How long disposal waits for this guard before proceeding without it
    pub timeout: Option<Duration>,
    /// Allow taking the guard while disposal is in progress
    pub used_while_disposing: bool,
}

impl GuardOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn used_while_disposing(mut self) -> Self {
        self.used_while_disposing = true;
        self
    }
}
