//! Recurrence expansion tests: completing a recurring task materializes
//! exactly one next occurrence through the normal creation path.

mod common;

use chrono::Utc;
use common::{fixtures, test_engine};
use stride::model::{LogAction, NewTask, TaskFilters};

#[test]
fn completing_non_recurring_task_creates_nothing() {
    let mut engine = test_engine();
    let created = engine.create_task(fixtures::task("One shot")).unwrap();

    let outcome = engine
        .toggle_completion(created.task.id, true)
        .unwrap()
        .unwrap();
    assert!(outcome.spawned.is_none());

    let all = engine
        .storage()
        .list_tasks(&TaskFilters {
            include_completed: true,
            ..TaskFilters::default()
        })
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn completing_recurring_task_spawns_one_next_occurrence() {
    let mut engine = test_engine();
    let before = Utc::now();
    let created = engine
        .create_task(fixtures::daily_recurring("Water plants"))
        .unwrap();

    let outcome = engine
        .toggle_completion(created.task.id, true)
        .unwrap()
        .unwrap();

    let spawned = outcome.spawned.expect("next occurrence created");
    assert_eq!(spawned.task.title, "Water plants");
    assert!(!spawned.task.is_completed);
    assert!(spawned.task.completed_at.is_none());
    assert!(spawned.task.is_recurring);
    assert_eq!(
        spawned.task.recurring_rule.as_deref(),
        Some("FREQ=DAILY")
    );
    let due = spawned.task.due_date.expect("due date set");
    assert!(due > before, "next due date is strictly in the future");

    // Exactly two tasks with this title: one done, one open.
    let all = engine
        .storage()
        .list_tasks(&TaskFilters {
            include_completed: true,
            ..TaskFilters::default()
        })
        .unwrap();
    let matching: Vec<_> = all
        .iter()
        .filter(|v| v.task.title == "Water plants")
        .collect();
    assert_eq!(matching.len(), 2);
    assert_eq!(matching.iter().filter(|v| v.task.is_completed).count(), 1);
    assert_eq!(matching.iter().filter(|v| !v.task.is_completed).count(), 1);
}

#[test]
fn spawned_occurrence_gets_its_own_created_log() {
    let mut engine = test_engine();
    let created = engine
        .create_task(fixtures::daily_recurring("Journal"))
        .unwrap();

    let outcome = engine
        .toggle_completion(created.task.id, true)
        .unwrap()
        .unwrap();
    let spawned = outcome.spawned.unwrap();

    let logs = engine.storage().logs_for_task(spawned.task.id, 10).unwrap();
    assert!(logs.iter().any(|l| l.action == LogAction::Created));
}

#[test]
fn occurrence_carries_fields_and_labels_forward() {
    let mut engine = test_engine();
    let label = engine
        .storage_mut()
        .create_label("routine", None, None)
        .unwrap();
    let list = engine
        .storage_mut()
        .create_list("Home", None, None, None)
        .unwrap();

    let created = engine
        .create_task(NewTask {
            list_id: Some(list.id),
            description: Some("15 minutes".to_string()),
            priority: stride::model::Priority::Medium,
            estimate_minutes: Some(15),
            label_ids: vec![label.id],
            ..fixtures::daily_recurring("Tidy kitchen")
        })
        .unwrap();

    let outcome = engine
        .toggle_completion(created.task.id, true)
        .unwrap()
        .unwrap();
    let spawned = outcome.spawned.unwrap();

    assert_eq!(spawned.task.list_id, Some(list.id));
    assert_eq!(spawned.task.description.as_deref(), Some("15 minutes"));
    assert_eq!(spawned.task.priority, stride::model::Priority::Medium);
    assert_eq!(spawned.task.estimate_minutes, Some(15));
    assert_eq!(spawned.labels.len(), 1);
    assert_eq!(spawned.labels[0].name, "routine");
    assert_ne!(spawned.task.id, created.task.id);
}

#[test]
fn invalid_rule_completes_without_expansion() {
    let mut engine = test_engine();
    let created = engine
        .create_task(NewTask {
            is_recurring: true,
            recurring_rule: Some("EVERY=FULLMOON".to_string()),
            ..NewTask::new("Howl")
        })
        .unwrap();

    let outcome = engine
        .toggle_completion(created.task.id, true)
        .unwrap()
        .unwrap();
    assert!(outcome.spawned.is_none(), "bad rule means no expansion");
    assert!(outcome.task.task.is_completed, "completion still lands");
}

#[test]
fn exhausted_until_completes_without_expansion() {
    let mut engine = test_engine();
    let created = engine
        .create_task(NewTask {
            is_recurring: true,
            // Long-past UNTIL bound: the rule is valid but exhausted.
            recurring_rule: Some("FREQ=DAILY;UNTIL=20200101".to_string()),
            ..NewTask::new("Old routine")
        })
        .unwrap();

    let outcome = engine
        .toggle_completion(created.task.id, true)
        .unwrap()
        .unwrap();
    assert!(outcome.spawned.is_none());
    assert!(outcome.task.task.is_completed);
}

#[test]
fn habit_completion_feeds_streak() {
    let mut engine = test_engine();
    let created = engine
        .create_task(NewTask {
            is_habit: true,
            ..fixtures::daily_recurring("Morning run")
        })
        .unwrap();

    engine.toggle_completion(created.task.id, true).unwrap();

    let stats = engine.stats().unwrap();
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.longest_streak, 1);
}
