#![no_main]

use disposal_groups::{Disposables, GroupConstraint};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let disposables = Disposables::new();
    let mut accepted: Vec<(String, GroupConstraint)> = Vec::new();

    // Each 3-byte chunk registers one group: kind, first target, second target
    for (i, chunk) in data.chunks_exact(3).take(64).enumerate() {
        let names = disposables.group_names();
        let pick = |b: u8| names[b as usize % names.len()].clone();
        let constraint = match chunk[0] % 3 {
            0 => GroupConstraint::before(pick(chunk[1])),
            1 => GroupConstraint::after(pick(chunk[1])),
            _ => GroupConstraint::between(pick(chunk[1]), pick(chunk[2])),
        };

        let name = format!("g{}", i);
        if disposables.register_group(name.clone(), constraint.clone()).is_ok() {
            accepted.push((name, constraint));
        }
    }

    // Every accepted constraint must still hold
    let names = disposables.group_names();
    let index = |name: &str| names.iter().position(|n| n == name).unwrap();
    for (group, constraint) in &accepted {
        if let Some(before) = constraint.before_group() {
            assert!(index(group) < index(before));
        }
        if let Some(after) = constraint.after_group() {
            assert!(index(after) < index(group));
        }
    }
});
