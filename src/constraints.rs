//! Group ordering constraints.
//!
//! Groups are kept in a single ordered sequence; index order is disposal order.
//! A new group is placed once, when it is registered, at the position its
//! `before`/`after` constraints allow. Existing groups are never reordered, so
//! every constraint accepted earlier keeps holding as later groups are inserted.

use crate::error::{DisposalError, DisposalResult};

/// A `before`/`after` relation between a new group and an existing one.
///
/// At least one side is always set; use [`between`](Self::between) to set both.
///
/// # Examples
///
/// ```
/// use disposal_groups::{GroupConstraint, Disposables};
///
/// let disposables = Disposables::new();
/// disposables.register_group("connections", GroupConstraint::before("default")).unwrap();
/// disposables.register_group("logs", GroupConstraint::after("default")).unwrap();
/// disposables
///     .register_group("flush", GroupConstraint::between("connections", "default"))
///     .unwrap();
///
/// assert_eq!(
///     disposables.group_names(),
///     vec!["connections", "flush", "default", "logs"]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GroupConstraint {
    before: Option<String>,
    after: Option<String>,
}

impl GroupConstraint {
    /// The new group is disposed before `group`.
    pub fn before(group: impl Into<String>) -> Self {
        Self {
            before: Some(group.into()),
            after: None,
        }
    }

    /// The new group is disposed after `group`.
    pub fn after(group: impl Into<String>) -> Self {
        Self {
            before: None,
            after: Some(group.into()),
        }
    }

    /// The new group is disposed after `after` and before `before`.
    pub fn between(after: impl Into<String>, before: impl Into<String>) -> Self {
        Self {
            before: Some(before.into()),
            after: Some(after.into()),
        }
    }

    pub fn before_group(&self) -> Option<&str> {
        self.before.as_deref()
    }

    pub fn after_group(&self) -> Option<&str> {
        self.after.as_deref()
    }
}

impl From<GroupConstraint> for Vec<GroupConstraint> {
    fn from(constraint: GroupConstraint) -> Self {
        vec![constraint]
    }
}

/// A constraint as accepted by `register_group`, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegisteredConstraint {
    /// The group the constraint was registered for
    pub group: String,
    pub before: Option<String>,
    pub after: Option<String>,
}

impl RegisteredConstraint {
    pub(crate) fn new(group: &str, constraint: &GroupConstraint) -> Self {
        Self {
            group: group.to_string(),
            before: constraint.before.clone(),
            after: constraint.after.clone(),
        }
    }
}

/// Bounds computed from a constraint set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertionIndex {
    /// Largest index among `after` targets
    pub last_after: Option<usize>,
    /// Smallest index among `before` targets
    pub first_before: Option<usize>,
}

impl InsertionIndex {
    /// Position at which the new group is spliced into a sequence of `len` groups.
    ///
    /// An `after` anchor wins when present, except an anchor at index 0, which
    /// falls through to the `before` anchor or to the end of the sequence.
    pub fn position(&self, len: usize) -> usize {
        match self.last_after {
            Some(after) if after > 0 => after + 1,
            _ => self.first_before.unwrap_or(len),
        }
    }
}

/// Validates a constraint set for `group` against the existing groups.
///
/// # Errors
///
/// - [`DisposalError::EmptyConstraints`] when `constraints` is empty
/// - [`DisposalError::DuplicateGroup`] when `group` already exists
pub fn normalize_constraints<N: AsRef<str>>(
    constraints: impl Into<Vec<GroupConstraint>>,
    group: &str,
    existing: &[N],
) -> DisposalResult<Vec<GroupConstraint>> {
    let constraints = constraints.into();
    if constraints.is_empty() {
        return Err(DisposalError::EmptyConstraints {
            group: group.to_string(),
        });
    }
    if existing.iter().any(|name| name.as_ref() == group) {
        return Err(DisposalError::DuplicateGroup {
            group: group.to_string(),
        });
    }
    Ok(constraints)
}

/// Resolves where a group with `constraints` fits among `existing` groups.
///
/// # Errors
///
/// - [`DisposalError::UnknownConstraintTarget`] when a constraint names a missing group
/// - [`DisposalError::ContradictoryConstraints`] when the latest `after` target
///   is not strictly before the earliest `before` target
pub fn resolve_insertion_index<N: AsRef<str>>(
    constraints: &[GroupConstraint],
    existing: &[N],
) -> DisposalResult<InsertionIndex> {
    let find = |relation: &'static str, group: &str| {
        existing
            .iter()
            .position(|name| name.as_ref() == group)
            .ok_or_else(|| DisposalError::UnknownConstraintTarget {
                relation,
                group: group.to_string(),
            })
    };

    let mut index = InsertionIndex::default();
    for constraint in constraints {
        if let Some(before) = constraint.before_group() {
            let i = find("before", before)?;
            index.first_before = Some(index.first_before.map_or(i, |b| b.min(i)));
        }
        if let Some(after) = constraint.after_group() {
            let i = find("after", after)?;
            index.last_after = Some(index.last_after.map_or(i, |a| a.max(i)));
        }
    }

    if let (Some(after), Some(before)) = (index.last_after, index.first_before) {
        if after >= before {
            return Err(DisposalError::ContradictoryConstraints {
                after: existing[after].as_ref().to_string(),
                before: existing[before].as_ref().to_string(),
            });
        }
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_before_only_inserts_at_target() {
        let existing = groups(&["first", "default", "last"]);
        let index = resolve_insertion_index(&[GroupConstraint::before("default")], &existing).unwrap();
        assert_eq!(index.first_before, Some(1));
        assert_eq!(index.last_after, None);
        assert_eq!(index.position(existing.len()), 1);
    }

    #[test]
    fn test_after_only_inserts_after_target() {
        let existing = groups(&["first", "default", "last"]);
        let index = resolve_insertion_index(&[GroupConstraint::after("default")], &existing).unwrap();
        assert_eq!(index.position(existing.len()), 2);
    }

    #[test]
    fn test_after_index_zero_appends() {
        let existing = groups(&["default", "last"]);
        let index = resolve_insertion_index(&[GroupConstraint::after("default")], &existing).unwrap();
        assert_eq!(index.last_after, Some(0));
        assert_eq!(index.position(existing.len()), 2);
    }

    #[test]
    fn test_multiple_constraints_take_tightest_bounds() {
        let existing = groups(&["a", "b", "c", "d", "e"]);
        let constraints = vec![
            GroupConstraint::after("a"),
            GroupConstraint::after("b"),
            GroupConstraint::before("e"),
            GroupConstraint::before("d"),
        ];
        let index = resolve_insertion_index(&constraints, &existing).unwrap();
        assert_eq!(index.last_after, Some(1));
        assert_eq!(index.first_before, Some(3));
        assert_eq!(index.position(existing.len()), 2);
    }

    #[test]
    fn test_contradiction_names_both_groups() {
        let existing = groups(&["before", "default", "after"]);
        let err = resolve_insertion_index(&[GroupConstraint::between("after", "before")], &existing)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid constraints: after runs after before, which contradicts prior constraints"
        );
    }

    #[test]
    fn test_same_group_on_both_sides_contradicts() {
        let existing = groups(&["default"]);
        let err = resolve_insertion_index(&[GroupConstraint::between("default", "default")], &existing)
            .unwrap_err();
        assert!(matches!(err, DisposalError::ContradictoryConstraints { .. }));
    }

    #[test]
    fn test_unknown_target() {
        let existing = groups(&["default"]);
        let err = resolve_insertion_index(&[GroupConstraint::after("missing")], &existing).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid constraint: \"after: missing\" - group not found"
        );

        let err = resolve_insertion_index(&[GroupConstraint::before("missing")], &existing).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid constraint: \"before: missing\" - group not found"
        );
    }

    #[test]
    fn test_normalize_rejects_empty_and_duplicate() {
        let existing = groups(&["default"]);

        let err = normalize_constraints(Vec::<GroupConstraint>::new(), "new", &existing).unwrap_err();
        assert!(matches!(err, DisposalError::EmptyConstraints { .. }));

        let err = normalize_constraints(GroupConstraint::before("default"), "default", &existing)
            .unwrap_err();
        assert!(err.to_string().contains("\"default\" already exists"));

        let normalized = normalize_constraints(GroupConstraint::before("default"), "new", &existing).unwrap();
        assert_eq!(normalized, vec![GroupConstraint::before("default")]);
    }
}
