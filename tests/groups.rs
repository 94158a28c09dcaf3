use disposal_groups::{Disposables, DisposalError, GroupConstraint, DEFAULT_GROUP};

#[test]
fn test_starts_with_default_group() {
    let disposables = Disposables::new();
    assert_eq!(disposables.group_names(), vec![DEFAULT_GROUP]);
    assert!(disposables.list().constraints.is_empty());
}

#[test]
fn test_contradiction_detection() {
    let disposables = Disposables::new();
    disposables.register_group("before", GroupConstraint::before("default")).unwrap();
    disposables.register_group("after", GroupConstraint::after("default")).unwrap();

    let err = disposables
        .register_group("invalid", GroupConstraint::between("after", "before"))
        .unwrap_err();
    assert!(err.to_string().contains("contradicts prior constraints"));
    assert!(matches!(err, DisposalError::ContradictoryConstraints { .. }));

    // Nothing was inserted or recorded
    assert_eq!(disposables.group_names(), vec!["before", "default", "after"]);
    assert_eq!(disposables.list().constraints.len(), 2);
}

#[test]
fn test_contradiction_across_constraint_list() {
    let disposables = Disposables::new();
    disposables.register_group("before", GroupConstraint::before("default")).unwrap();

    let err = disposables
        .register_group(
            "invalid",
            vec![GroupConstraint::after("default"), GroupConstraint::before("before")],
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid constraints: default runs after before, which contradicts prior constraints"
    );
}

#[test]
fn test_unique_group_names() {
    let disposables = Disposables::new();

    let err = disposables
        .register_group("default", GroupConstraint::before("default"))
        .unwrap_err();
    assert!(err.to_string().contains("\"default\" already exists"));

    disposables.register_group("cleanup", GroupConstraint::after("default")).unwrap();
    let err = disposables
        .register_group("cleanup", GroupConstraint::before("default"))
        .unwrap_err();
    assert!(matches!(err, DisposalError::DuplicateGroup { ref group } if group == "cleanup"));
}

#[test]
fn test_empty_constraints_rejected() {
    let disposables = Disposables::new();
    let err = disposables.register_group("lonely", Vec::<GroupConstraint>::new()).unwrap_err();
    assert!(matches!(err, DisposalError::EmptyConstraints { .. }));
    assert_eq!(disposables.group_names(), vec!["default"]);
}

#[test]
fn test_unknown_constraint_target() {
    let disposables = Disposables::new();
    let err = disposables
        .register_group("orphan", GroupConstraint::before("missing"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid constraint: \"before: missing\" - group not found"
    );
}

#[test]
fn test_later_insertions_keep_established_order() {
    let disposables = Disposables::new();
    disposables.register_group("a", GroupConstraint::before("default")).unwrap();
    disposables.register_group("z", GroupConstraint::after("default")).unwrap();
    disposables.register_group("b", GroupConstraint::between("a", "default")).unwrap();
    disposables.register_group("y", GroupConstraint::before("z")).unwrap();
    disposables.register_group("c", [GroupConstraint::after("b"), GroupConstraint::before("default")]).unwrap();

    let names = disposables.group_names();
    let index = |name: &str| names.iter().position(|n| n == name).unwrap();

    assert!(index("a") < index("default"));
    assert!(index("default") < index("z"));
    assert!(index("a") < index("b") && index("b") < index("default"));
    assert!(index("y") < index("z"));
    assert!(index("b") < index("c") && index("c") < index("default"));
}

#[test]
fn test_after_only_prefers_latest_dependency() {
    let disposables = Disposables::new();
    disposables.register_group("first", GroupConstraint::before("default")).unwrap();
    disposables.register_group("last", GroupConstraint::after("default")).unwrap();
    disposables.register_group("middle", GroupConstraint::after("default")).unwrap();

    assert_eq!(disposables.group_names(), vec!["first", "default", "middle", "last"]);
}

#[test]
fn test_constraints_are_recorded_in_order() {
    let disposables = Disposables::new();
    disposables.register_group("early", GroupConstraint::before("default")).unwrap();
    disposables
        .register_group("late", [GroupConstraint::after("default"), GroupConstraint::after("early")])
        .unwrap();

    let constraints = disposables.list().constraints;
    let summary: Vec<(String, Option<String>, Option<String>)> = constraints
        .into_iter()
        .map(|c| (c.group, c.before, c.after))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("early".to_string(), Some("default".to_string()), None),
            ("late".to_string(), None, Some("default".to_string())),
            ("late".to_string(), None, Some("early".to_string())),
        ]
    );
}
