//! Field-level diffing for the activity log.
//!
//! One user mutation yields at most one `updated` log row: every tracked
//! field that actually changed contributes one human-readable line, the
//! lines are newline-joined, and an empty diff writes nothing.

use crate::model::{Task, TaskPatch};
use chrono::{DateTime, Utc};

/// Tracked fields: title, description, priority, due date, deadline,
/// recurrence flag, list, labels. Patch fields that are absent or equal to
/// the previous value produce no line.
#[must_use]
pub fn diff_lines(previous: &Task, previous_label_ids: &[i64], patch: &TaskPatch) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(title) = &patch.title {
        if *title != previous.title {
            lines.push(format!(
                "Title changed from \"{}\" to \"{title}\"",
                previous.title
            ));
        }
    }

    if let Some(description) = &patch.description {
        if *description != previous.description {
            lines.push(format!(
                "Description changed from {} to {}",
                fmt_opt_text(previous.description.as_deref()),
                fmt_opt_text(description.as_deref())
            ));
        }
    }

    if let Some(priority) = patch.priority {
        if priority != previous.priority {
            lines.push(format!(
                "Priority changed from {} to {priority}",
                previous.priority
            ));
        }
    }

    if let Some(due_date) = patch.due_date {
        if due_date != previous.due_date {
            lines.push(format!(
                "Due date changed from {} to {}",
                fmt_opt_date(previous.due_date),
                fmt_opt_date(due_date)
            ));
        }
    }

    if let Some(deadline) = patch.deadline {
        if deadline != previous.deadline {
            lines.push(format!(
                "Deadline changed from {} to {}",
                fmt_opt_date(previous.deadline),
                fmt_opt_date(deadline)
            ));
        }
    }

    if let Some(is_recurring) = patch.is_recurring {
        if is_recurring != previous.is_recurring {
            lines.push(if is_recurring {
                "Recurrence enabled".to_string()
            } else {
                "Recurrence disabled".to_string()
            });
        }
    }

    // Generic texts for list/label changes; richer old/new names would need
    // extra lookups in the mutation path (see DESIGN.md).
    if let Some(list_id) = patch.list_id {
        if list_id != previous.list_id {
            lines.push("List changed".to_string());
        }
    }

    if let Some(label_ids) = &patch.label_ids {
        let mut new_sorted = label_ids.clone();
        new_sorted.sort_unstable();
        new_sorted.dedup();
        let mut old_sorted = previous_label_ids.to_vec();
        old_sorted.sort_unstable();
        if new_sorted != old_sorted {
            lines.push("Labels updated".to_string());
        }
    }

    lines
}

fn fmt_opt_text(value: Option<&str>) -> String {
    value.map_or_else(|| "(none)".to_string(), |v| format!("\"{v}\""))
}

fn fmt_opt_date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "(none)".to_string(), |d| d.format("%Y-%m-%d").to_string())
}
