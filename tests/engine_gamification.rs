//! Gamification tests: XP monotonicity, level derivation and idempotent
//! achievement unlocks.

mod common;

use common::{fixtures, test_engine};
use stride::model::{LogAction, Priority};

#[test]
fn xp_is_monotonically_non_decreasing() {
    let mut engine = test_engine();
    let mut last_xp = engine.stats().unwrap().xp;
    let mut last_level = engine.stats().unwrap().level;

    for i in 0..12 {
        let view = engine
            .create_task(fixtures::task_with_priority(
                &format!("Task {i}"),
                Priority::Medium,
            ))
            .unwrap();
        engine.toggle_completion(view.task.id, true).unwrap();

        let stats = engine.stats().unwrap();
        assert!(stats.xp > last_xp, "every completion earns XP");
        assert!(stats.level >= last_level, "level never regresses");
        last_xp = stats.xp;
        last_level = stats.level;
    }
}

#[test]
fn priority_bonus_applies_on_top_of_base() {
    let mut engine = test_engine();

    // Burn the first_steps unlock so later deltas are clean.
    let warmup = engine.create_task(fixtures::task("Warmup")).unwrap();
    engine.toggle_completion(warmup.task.id, true).unwrap();

    let before = engine.stats().unwrap().xp;
    let plain = engine.create_task(fixtures::task("Plain")).unwrap();
    engine.toggle_completion(plain.task.id, true).unwrap();
    assert_eq!(engine.stats().unwrap().xp - before, 10, "base only");

    let before = engine.stats().unwrap().xp;
    let medium = engine
        .create_task(fixtures::task_with_priority("Medium", Priority::Medium))
        .unwrap();
    engine.toggle_completion(medium.task.id, true).unwrap();
    assert_eq!(engine.stats().unwrap().xp - before, 15);

    let before = engine.stats().unwrap().xp;
    let high = engine
        .create_task(fixtures::task_with_priority("High", Priority::High))
        .unwrap();
    engine.toggle_completion(high.task.id, true).unwrap();
    assert_eq!(engine.stats().unwrap().xp - before, 20);
}

#[test]
fn achievements_unlock_at_most_once() {
    let mut engine = test_engine();

    // Complete one task: first_steps (threshold 1) unlocks exactly once.
    let first = engine.create_task(fixtures::task("First")).unwrap();
    engine.toggle_completion(first.task.id, true).unwrap();

    let unlocked = |engine: &stride::engine::TaskEngine| {
        engine
            .achievements()
            .unwrap()
            .into_iter()
            .filter(|a| a.unlocked_at.is_some())
            .map(|a| a.id)
            .collect::<Vec<_>>()
    };
    assert_eq!(unlocked(&engine), vec!["first_steps".to_string()]);

    // Re-evaluation through further completions never re-unlocks it.
    for i in 0..3 {
        let view = engine.create_task(fixtures::task(&format!("More {i}"))).unwrap();
        engine.toggle_completion(view.task.id, true).unwrap();
    }
    assert_eq!(
        unlocked(&engine)
            .iter()
            .filter(|id| id.as_str() == "first_steps")
            .count(),
        1
    );

    // Exactly one system log row for the unlock.
    let unlock_logs = engine
        .storage()
        .recent_logs(100)
        .unwrap()
        .into_iter()
        .filter(|l| l.action == LogAction::AchievementUnlocked)
        .filter(|l| {
            l.details
                .as_deref()
                .is_some_and(|d| d.contains("First Steps"))
        })
        .count();
    assert_eq!(unlock_logs, 1);
}

#[test]
fn achievement_reward_lands_in_same_completion() {
    let mut engine = test_engine();
    let view = engine.create_task(fixtures::task("Only")).unwrap();
    let outcome = engine
        .toggle_completion(view.task.id, true)
        .unwrap()
        .unwrap();

    // 10 base + 25 first_steps reward, visible in the returned award.
    let award = outcome.award.unwrap();
    assert_eq!(award.new_xp, 35);
    assert_eq!(engine.stats().unwrap().xp, 35);
}

#[test]
fn count_total_thresholds_unlock_in_order() {
    let mut engine = test_engine();

    for i in 0..10 {
        let view = engine
            .create_task(fixtures::task(&format!("Grind {i}")))
            .unwrap();
        engine.toggle_completion(view.task.id, true).unwrap();
    }

    let unlocked: Vec<String> = engine
        .achievements()
        .unwrap()
        .into_iter()
        .filter(|a| a.unlocked_at.is_some())
        .map(|a| a.id)
        .collect();

    assert!(unlocked.contains(&"first_steps".to_string()));
    assert!(unlocked.contains(&"getting_things_done".to_string()));
    assert!(
        unlocked.contains(&"productive_day".to_string()),
        "10 completions today also satisfies the daily-5 condition"
    );
    assert!(!unlocked.contains(&"centurion".to_string()));
}

#[test]
fn unlock_log_is_a_system_entry() {
    let mut engine = test_engine();
    let view = engine.create_task(fixtures::task("Trigger")).unwrap();
    engine.toggle_completion(view.task.id, true).unwrap();

    let unlock = engine
        .storage()
        .recent_logs(100)
        .unwrap()
        .into_iter()
        .find(|l| l.action == LogAction::AchievementUnlocked)
        .expect("unlock logged");
    assert_eq!(unlock.task_id, None, "achievement logs are task-less");
}

#[test]
fn stats_row_initializes_lazily() {
    let engine = test_engine();
    let stats = engine.stats().unwrap();
    assert_eq!(stats.xp, 0);
    assert_eq!(stats.level, 1);
    assert_eq!(stats.current_streak, 0);
}
