//! Output formatting for `stride`.
//!
//! Human-readable text to stdout by default; `--json` switches every command
//! to machine-parseable JSON on stdout with diagnostics on stderr.

use crate::model::{Priority, TaskLog, TaskView, UserStats};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

/// Print a serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("error: failed to serialize output: {err}"),
    }
}

#[must_use]
pub const fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::None => "  ",
        Priority::Low => "!.",
        Priority::Medium => "! ",
        Priority::High => "!!",
    }
}

#[must_use]
pub fn format_date(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Truncate a title to `max` columns, appending an ellipsis when cut.
#[must_use]
pub fn truncate_title(title: &str, max: usize) -> String {
    if UnicodeWidthStr::width(title) <= max {
        return title.to_string();
    }

    let mut out = String::new();
    let mut width = 0;
    for ch in title.chars() {
        let ch_width = UnicodeWidthStr::width(ch.to_string().as_str());
        if width + ch_width > max.saturating_sub(1) {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out.push('…');
    out
}

/// One-line task rendering: `[x] #12 !! Title (due 2026-08-07)`.
#[must_use]
pub fn format_task_line(view: &TaskView) -> String {
    let check = if view.task.is_completed { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{check} #{:<4} {} {}",
        view.task.id,
        priority_badge(view.task.priority),
        truncate_title(&view.task.title, 60)
    );

    if let Some(due) = view.task.due_date {
        line.push_str(&format!(" (due {})", format_date(due)));
    }
    if !view.labels.is_empty() {
        let names: Vec<&str> = view.labels.iter().map(|l| l.name.as_str()).collect();
        line.push_str(&format!(" [{}]", names.join(", ")));
    }
    if view.blockers.iter().any(|b| !b.is_completed) {
        line.push_str(" (blocked)");
    }

    line
}

/// One-line activity log rendering.
#[must_use]
pub fn format_log_line(log: &TaskLog) -> String {
    let when = log
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M");
    let target = log
        .task_id
        .map_or_else(|| "system".to_string(), |id| format!("#{id}"));
    let details = log.details.as_deref().unwrap_or("");
    // Multi-line diffs collapse into one line for the list view.
    let details = details.replace('\n', "; ");
    format!("{when}  {target:<8} {:<20} {details}", log.action.as_str())
}

/// Multi-line stats rendering.
#[must_use]
pub fn format_stats(stats: &UserStats) -> String {
    format!(
        "Level {}  ({} XP, {} to next)\nStreak: {} day(s) (best {})",
        stats.level,
        stats.xp,
        crate::engine::gamification::xp_to_next_level(stats.xp),
        stats.current_streak,
        stats.longest_streak
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_width() {
        assert_eq!(truncate_title("short", 10), "short");
        let cut = truncate_title("a very long title that will not fit", 10);
        assert!(cut.ends_with('…'));
        assert!(UnicodeWidthStr::width(cut.as_str()) <= 10);
    }

    #[test]
    fn badges_are_stable() {
        assert_eq!(priority_badge(Priority::High), "!!");
        assert_eq!(priority_badge(Priority::None), "  ");
    }
}
