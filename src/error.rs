//! Error types for disposal groups.

/// Boxed error returned by fallible disposers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Disposal errors
///
/// Represents the various error conditions that can occur while registering
/// groups, adding disposables, or tearing them down.
///
/// Registration-time errors are returned synchronously from `register_group`
/// and `add`; teardown errors are returned from `dispose().await`.
///
/// # Examples
///
/// ```rust
/// use disposal_groups::DisposalError;
///
/// let timeout = DisposalError::Timeout { name: "db".to_string(), timeout_ms: 250 };
/// assert_eq!(timeout.to_string(), "Disposal timed out: \"db\" after 250ms");
///
/// let unknown = DisposalError::UnknownGroup { group: "late".to_string() };
/// assert_eq!(unknown.to_string(), "Invalid group: \"late\" doesn't exist");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DisposalError {
    /// Referenced group does not exist
    #[error("Invalid group: \"{group}\" doesn't exist")]
    UnknownGroup { group: String },

    /// A `before`/`after` constraint names a group that does not exist
    #[error("Invalid constraint: \"{relation}: {group}\" - group not found")]
    UnknownConstraintTarget { relation: &'static str, group: String },

    /// Group name already registered
    #[error("Invalid group: \"{group}\" already exists")]
    DuplicateGroup { group: String },

    /// `register_group` called without any constraint
    #[error("Invalid constraints: group \"{group}\" requires at least one constraint")]
    EmptyConstraints { group: String },

    /// New constraints would swap the order of two already ordered groups
    #[error("Invalid constraints: {after} runs after {before}, which contradicts prior constraints")]
    ContradictoryConstraints { after: String, before: String },

    /// Same handle added twice to one group
    #[error("Disposable \"{name}\" already added to group \"{group}\"")]
    DuplicateDisposable { name: String, group: String },

    /// A disposable was added without a name while unnamed disposables are disabled
    #[error("Unnamed disposables are not allowed (group \"{group}\")")]
    UnnamedDisposable { group: String },

    /// A disposer exceeded its timeout
    #[error("Disposal timed out: \"{name}\" after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u128 },

    /// A disposer returned an error or panicked
    #[error("Disposal failed: \"{name}\"\nCause: {message}")]
    Failed {
        name: String,
        message: String,
        #[source]
        source: BoxError,
    },

    /// A guard or timer was requested after disposal started
    #[error("Instance was disposed: \"{name}\"")]
    InstanceDisposed { name: String },

    /// A configuration value could not be parsed
    #[error("Invalid configuration value for {key}: \"{value}\"")]
    InvalidConfig { key: &'static str, value: String },
}

impl DisposalError {
    /// Returns true for errors raised while tearing down, as opposed to registration errors.
    pub fn is_teardown(&self) -> bool {
        matches!(self, DisposalError::Timeout { .. } | DisposalError::Failed { .. })
    }
}

/// Result type for disposal operations
///
/// A convenience alias for `Result<T, DisposalError>` used throughout the crate.
pub type DisposalResult<T> = Result<T, DisposalError>;
