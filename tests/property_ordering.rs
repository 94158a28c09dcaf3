/// Property-based tests for disposal ordering
///
/// These use proptest to generate random registrations and verify invariants
/// that should hold for every accepted configuration.

use disposal_groups::{AddOptions, Disposable, Disposables, GroupConstraint};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[derive(Debug, Clone)]
enum Relation {
    Before(usize),
    After(usize),
    Between(usize, usize),
}

fn relation() -> impl Strategy<Value = Relation> {
    prop_oneof![
        (0usize..16).prop_map(Relation::Before),
        (0usize..16).prop_map(Relation::After),
        (0usize..16, 0usize..16).prop_map(|(a, b)| Relation::Between(a, b)),
    ]
}

// Property: a group disposes its entries in exact reverse insertion order
proptest! {
    #[test]
    fn reverse_insertion_order(count in 1usize..20) {
        let order = Arc::new(Mutex::new(Vec::new()));
        let disposables = Disposables::new();
        for i in 0..count {
            let order = order.clone();
            disposables
                .add(Disposable::from_sync_fn(move || order.lock().unwrap().push(i)), AddOptions::named(i.to_string()))
                .unwrap();
        }

        runtime().block_on(disposables.dispose()).unwrap();

        let expected: Vec<usize> = (0..count).rev().collect();
        prop_assert_eq!(order.lock().unwrap().clone(), expected);
    }
}

// Property: every accepted constraint keeps holding as more groups are inserted
proptest! {
    #[test]
    fn accepted_constraints_always_hold(relations in prop::collection::vec(relation(), 1..12)) {
        let disposables = Disposables::new();
        let mut accepted: Vec<(String, GroupConstraint)> = Vec::new();

        for (i, relation) in relations.iter().enumerate() {
            let names = disposables.group_names();
            let pick = |n: usize| names[n % names.len()].clone();
            let constraint = match relation {
                Relation::Before(b) => GroupConstraint::before(pick(*b)),
                Relation::After(a) => GroupConstraint::after(pick(*a)),
                Relation::Between(a, b) => GroupConstraint::between(pick(*a), pick(*b)),
            };
            let name = format!("g{}", i);
            if disposables.register_group(name.clone(), constraint.clone()).is_ok() {
                accepted.push((name, constraint));
            }
        }

        let names = disposables.group_names();
        let index = |name: &str| names.iter().position(|n| n == name).unwrap();
        for (group, constraint) in &accepted {
            if let Some(before) = constraint.before_group() {
                prop_assert!(index(group) < index(before));
            }
            if let Some(after) = constraint.after_group() {
                prop_assert!(index(after) < index(group));
            }
        }
        prop_assert_eq!(disposables.list().constraints.len(), accepted.len());
    }
}

// Property: list() totals are exact sums of entry timeouts
proptest! {
    #[test]
    fn list_totals_are_sums(timeouts in prop::collection::vec((1u64..10_000, any::<bool>()), 0..20)) {
        let disposables = Disposables::new();
        disposables.register_group("other", GroupConstraint::after("default")).unwrap();

        for (i, (ms, other)) in timeouts.iter().enumerate() {
            let group = if *other { "other" } else { "default" };
            disposables
                .add(
                    Disposable::from_sync_fn(|| {}),
                    AddOptions::named(format!("d{}", i)).with_timeout(Duration::from_millis(*ms)).in_group(group),
                )
                .unwrap();
        }

        let snapshot = disposables.list();
        let total: u64 = timeouts.iter().map(|(ms, _)| ms).sum();
        let other: u64 = timeouts.iter().filter(|(_, o)| *o).map(|(ms, _)| ms).sum();
        prop_assert_eq!(snapshot.total_timeout, Duration::from_millis(total));
        prop_assert_eq!(snapshot.group("other").unwrap().total_timeout, Duration::from_millis(other));
        prop_assert_eq!(snapshot.group("default").unwrap().total_timeout, Duration::from_millis(total - other));
        prop_assert_eq!(snapshot.len(), timeouts.len());
    }
}
