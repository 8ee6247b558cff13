//! Dependency graph tests: validation, ordering, idempotent removal and
//! blocker-completed signals.

mod common;

use common::{fixtures, test_engine};
use stride::model::LogAction;
use stride::StrideError;

#[test]
fn self_dependency_always_fails() {
    let mut engine = test_engine();
    let task = engine.create_task(fixtures::task("Loner")).unwrap();

    let err = engine
        .add_dependency(task.task.id, task.task.id)
        .unwrap_err();
    assert!(matches!(err, StrideError::SelfDependency { .. }));

    assert!(engine.blockers(task.task.id).unwrap().is_empty());
}

#[test]
fn reverse_edge_fails_with_circular_error() {
    let mut engine = test_engine();
    let a = engine.create_task(fixtures::task("A")).unwrap();
    let b = engine.create_task(fixtures::task("B")).unwrap();

    // A blocked by B.
    assert!(engine.add_dependency(a.task.id, b.task.id).unwrap());

    // B blocked by A closes the 2-cycle and must fail.
    let err = engine.add_dependency(b.task.id, a.task.id).unwrap_err();
    assert!(matches!(err, StrideError::CircularDependency { .. }));

    // Validation happens before any state change.
    assert!(engine.blockers(b.task.id).unwrap().is_empty());
}

#[test]
fn remove_then_blockers_no_longer_contains_edge() {
    let mut engine = test_engine();
    let a = engine.create_task(fixtures::task("A")).unwrap();
    let b = engine.create_task(fixtures::task("B")).unwrap();

    engine.add_dependency(a.task.id, b.task.id).unwrap();
    assert!(engine.remove_dependency(a.task.id, b.task.id).unwrap());

    let blockers = engine.blockers(a.task.id).unwrap();
    assert!(blockers.iter().all(|t| t.id != b.task.id));

    // Removal is idempotent and quiet the second time.
    assert!(!engine.remove_dependency(a.task.id, b.task.id).unwrap());
}

#[test]
fn blockers_listed_in_insertion_order() {
    let mut engine = test_engine();
    let task = engine.create_task(fixtures::task("Blocked")).unwrap();
    let first = engine.create_task(fixtures::task("First")).unwrap();
    let second = engine.create_task(fixtures::task("Second")).unwrap();
    let third = engine.create_task(fixtures::task("Third")).unwrap();

    for blocker in [&first, &second, &third] {
        engine.add_dependency(task.task.id, blocker.task.id).unwrap();
    }

    let ids: Vec<i64> = engine
        .blockers(task.task.id)
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![first.task.id, second.task.id, third.task.id]);
}

#[test]
fn completing_sole_blocker_signals_unblocked() {
    let mut engine = test_engine();
    let a = engine.create_task(fixtures::task("A")).unwrap();
    let b = engine.create_task(fixtures::task("B")).unwrap();

    engine.add_dependency(a.task.id, b.task.id).unwrap();
    engine.toggle_completion(b.task.id, true).unwrap();

    let logs = engine.storage().logs_for_task(a.task.id, 20).unwrap();
    let signal = logs
        .iter()
        .find(|l| l.action == LogAction::BlockerCompleted)
        .expect("blocker_completed log on the dependent");
    let details = signal.details.as_deref().unwrap();
    assert!(details.contains("now unblocked"));
    assert!(details.contains(&b.task.title));
}

#[test]
fn remaining_blockers_suppress_unblocked_text() {
    let mut engine = test_engine();
    let task = engine.create_task(fixtures::task("Gated")).unwrap();
    let b1 = engine.create_task(fixtures::task("Gate one")).unwrap();
    let b2 = engine.create_task(fixtures::task("Gate two")).unwrap();

    engine.add_dependency(task.task.id, b1.task.id).unwrap();
    engine.add_dependency(task.task.id, b2.task.id).unwrap();

    engine.toggle_completion(b1.task.id, true).unwrap();

    let logs = engine.storage().logs_for_task(task.task.id, 20).unwrap();
    let signals: Vec<_> = logs
        .iter()
        .filter(|l| l.action == LogAction::BlockerCompleted)
        .collect();
    assert_eq!(signals.len(), 1);
    assert!(
        !signals[0].details.as_deref().unwrap().contains("now unblocked"),
        "one incomplete blocker remains"
    );

    // Completing the second blocker does announce unblocked.
    engine.toggle_completion(b2.task.id, true).unwrap();
    let logs = engine.storage().logs_for_task(task.task.id, 20).unwrap();
    assert!(logs
        .iter()
        .filter(|l| l.action == LogAction::BlockerCompleted)
        .any(|l| l.details.as_deref().unwrap().contains("now unblocked")));
}

#[test]
fn signal_is_informational_only() {
    let mut engine = test_engine();
    let a = engine.create_task(fixtures::task("Still open")).unwrap();
    let b = engine.create_task(fixtures::task("Blocker")).unwrap();

    engine.add_dependency(a.task.id, b.task.id).unwrap();
    engine.toggle_completion(b.task.id, true).unwrap();

    let view = engine.storage().get_task_view(a.task.id).unwrap().unwrap();
    assert!(
        !view.task.is_completed,
        "dependent is never auto-completed"
    );
}

#[test]
fn dependency_logs_carry_action_tags() {
    let mut engine = test_engine();
    let a = engine.create_task(fixtures::task("A")).unwrap();
    let b = engine.create_task(fixtures::task("B")).unwrap();

    engine.add_dependency(a.task.id, b.task.id).unwrap();
    engine.remove_dependency(a.task.id, b.task.id).unwrap();

    let logs = engine.storage().logs_for_task(a.task.id, 20).unwrap();
    assert!(logs.iter().any(|l| l.action == LogAction::DependencyAdded));
    assert!(logs.iter().any(|l| l.action == LogAction::DependencyRemoved));
}
