//! Stats command: XP, level, streaks, achievements and task totals.

use crate::engine::TaskEngine;
use crate::error::Result;
use crate::format::{format_stats, print_json};
use crate::model::{Priority, TaskFilters};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Totals {
    total: usize,
    completed: usize,
    completion_rate: u32,
    by_priority: [(String, usize); 4],
}

/// Execute `stride stats`.
///
/// # Errors
///
/// Returns an error if the queries fail.
pub fn execute(engine: &TaskEngine, json: bool) -> Result<()> {
    let stats = engine.stats()?;
    let achievements = engine.achievements()?;
    let totals = compute_totals(engine)?;

    if json {
        print_json(&serde_json::json!({
            "stats": stats,
            "achievements": achievements,
            "totals": totals,
        }));
        return Ok(());
    }

    println!("{}", format_stats(&stats));
    println!(
        "Tasks: {} total, {} completed ({}%)",
        totals.total, totals.completed, totals.completion_rate
    );
    for (priority, count) in &totals.by_priority {
        if *count > 0 {
            println!("  {priority}: {count}");
        }
    }

    println!("Achievements:");
    for achievement in &achievements {
        let mark = if achievement.unlocked_at.is_some() {
            "[x]"
        } else {
            "[ ]"
        };
        println!(
            "  {mark} {:<24} {} (+{} XP)",
            achievement.name, achievement.description, achievement.xp_reward
        );
    }

    Ok(())
}

fn compute_totals(engine: &TaskEngine) -> Result<Totals> {
    let filters = TaskFilters {
        include_completed: true,
        ..TaskFilters::default()
    };
    let views = engine.storage().list_tasks(&filters)?;

    let total = views.len();
    let completed = views.iter().filter(|v| v.task.is_completed).count();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let completion_rate = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    };

    let count_for = |priority: Priority| {
        views
            .iter()
            .filter(|v| v.task.priority == priority)
            .count()
    };
    let by_priority = [
        ("high".to_string(), count_for(Priority::High)),
        ("medium".to_string(), count_for(Priority::Medium)),
        ("low".to_string(), count_for(Priority::Low)),
        ("none".to_string(), count_for(Priority::None)),
    ];

    Ok(Totals {
        total,
        completed,
        completion_rate,
        by_priority,
    })
}
