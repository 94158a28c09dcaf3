/// Unit tests for DisposalError and DisposalResult
/// These pin the exact messages callers match on

use disposal_groups::{BoxError, DisposalError, DisposalResult};
use std::error::Error;

#[test]
fn test_error_display_timeout() {
    let error = DisposalError::Timeout {
        name: "slow".to_string(),
        timeout_ms: 1,
    };
    assert_eq!(error.to_string(), "Disposal timed out: \"slow\" after 1ms");
    assert!(error.is_teardown());
}

#[test]
fn test_error_display_failed_with_cause() {
    let cause: BoxError = "socket already closed".into();
    let error = DisposalError::Failed {
        name: "socket".to_string(),
        message: cause.to_string(),
        source: cause,
    };
    let display_str = error.to_string();
    assert_eq!(display_str, "Disposal failed: \"socket\"\nCause: socket already closed");
    assert_eq!(error.source().unwrap().to_string(), "socket already closed");
    assert!(error.is_teardown());
}

#[test]
fn test_error_display_unknown_group() {
    let error = DisposalError::UnknownGroup {
        group: "late".to_string(),
    };
    assert_eq!(error.to_string(), "Invalid group: \"late\" doesn't exist");
    assert!(!error.is_teardown());
}

#[test]
fn test_error_display_unknown_constraint_target() {
    let error = DisposalError::UnknownConstraintTarget {
        relation: "after",
        group: "ghost".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Invalid constraint: \"after: ghost\" - group not found"
    );
}

#[test]
fn test_error_display_duplicate_group() {
    let error = DisposalError::DuplicateGroup {
        group: "default".to_string(),
    };
    assert_eq!(error.to_string(), "Invalid group: \"default\" already exists");
}

#[test]
fn test_error_display_empty_constraints() {
    let error = DisposalError::EmptyConstraints {
        group: "lonely".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Invalid constraints: group \"lonely\" requires at least one constraint"
    );
}

#[test]
fn test_error_display_contradiction() {
    let error = DisposalError::ContradictoryConstraints {
        after: "after".to_string(),
        before: "before".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Invalid constraints: after runs after before, which contradicts prior constraints"
    );
}

#[test]
fn test_error_display_duplicate_disposable() {
    let error = DisposalError::DuplicateDisposable {
        name: "cache".to_string(),
        group: "default".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Disposable \"cache\" already added to group \"default\""
    );
}

#[test]
fn test_error_display_unnamed_and_disposed() {
    let unnamed = DisposalError::UnnamedDisposable {
        group: "default".to_string(),
    };
    assert_eq!(
        unnamed.to_string(),
        "Unnamed disposables are not allowed (group \"default\")"
    );

    let disposed = DisposalError::InstanceDisposed {
        name: "service".to_string(),
    };
    assert_eq!(disposed.to_string(), "Instance was disposed: \"service\"");
}

#[test]
fn test_disposal_result_propagates_with_question_mark() {
    fn inner() -> DisposalResult<()> {
        Err(DisposalError::UnknownGroup {
            group: "x".to_string(),
        })
    }

    fn outer() -> Result<(), BoxError> {
        inner()?;
        Ok(())
    }

    let err = outer().unwrap_err();
    assert!(err.downcast_ref::<DisposalError>().is_some());
}
