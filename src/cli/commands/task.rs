//! Task commands: add, ls, show, edit, done, undone, rm, subtask.

use crate::cli::commands::{resolve_label, resolve_list, resolve_or_create_label};
use crate::cli::{parse_when, quick, AddArgs, EditArgs, LsArgs};
use crate::engine::TaskEngine;
use crate::error::Result;
use crate::format::{format_log_line, format_task_line, print_json};
use crate::model::{NewTask, TaskFilters, TaskPatch};
use chrono::Utc;

/// Execute `stride add`.
///
/// # Errors
///
/// Returns an error if field resolution or creation fails.
pub fn add(engine: &mut TaskEngine, args: &AddArgs, json: bool) -> Result<()> {
    let now = Utc::now();
    let raw_title = args.title.join(" ");
    let mut new = NewTask::new(raw_title.clone());

    if args.quick {
        let parsed = quick::parse(&raw_title, now);
        new.title = parsed.title;
        new.priority = parsed.priority.unwrap_or_default();
        new.context = parsed.context;
        new.due_date = parsed.due_date;
        for name in &parsed.label_names {
            new.label_ids.push(resolve_or_create_label(engine, name)?);
        }
    }

    // Explicit flags win over quick-add tokens.
    if let Some(list) = &args.list {
        new.list_id = Some(resolve_list(engine, list)?);
    }
    for label in &args.labels {
        new.label_ids.push(resolve_or_create_label(engine, label)?);
    }
    if let Some(priority) = args.priority {
        new.priority = priority.into();
    }
    if let Some(due) = &args.due {
        new.due_date = Some(parse_when(due, now)?);
    }
    if let Some(deadline) = &args.deadline {
        new.deadline = Some(parse_when(deadline, now)?);
    }
    if args.estimate.is_some() {
        new.estimate_minutes = args.estimate;
    }
    if let Some(energy) = args.energy {
        new.energy_level = Some(energy.into());
    }
    if let Some(context) = args.context {
        new.context = Some(context.into());
    }
    if let Some(rule) = &args.recur {
        new.is_recurring = true;
        new.recurring_rule = Some(rule.clone());
    }
    new.is_habit = args.habit;
    if args.describe.is_some() {
        new.description.clone_from(&args.describe);
    }

    let view = engine.create_task(new)?;

    if json {
        print_json(&view);
    } else {
        println!("{}", format_task_line(&view));
    }
    Ok(())
}

/// Execute `stride ls`.
///
/// # Errors
///
/// Returns an error if filter resolution or the query fails.
pub fn ls(engine: &mut TaskEngine, args: &LsArgs, json: bool) -> Result<()> {
    let mut filters = TaskFilters {
        window: args.window.into(),
        include_completed: args.all,
        ..TaskFilters::default()
    };
    if let Some(list) = &args.list {
        filters.list_id = Some(resolve_list(engine, list)?);
    }
    if let Some(label) = &args.label {
        filters.label_id = Some(resolve_label(engine, label)?);
    }

    let views = engine.storage().list_tasks(&filters)?;

    if json {
        print_json(&views);
    } else if views.is_empty() {
        println!("no tasks");
    } else {
        for view in &views {
            println!("{}", format_task_line(view));
        }
    }
    Ok(())
}

/// Execute `stride show`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn show(engine: &TaskEngine, id: i64, json: bool) -> Result<()> {
    let Some(view) = engine.storage().get_task_view(id)? else {
        println!("task #{id} not found");
        return Ok(());
    };

    if json {
        print_json(&view);
        return Ok(());
    }

    println!("{}", format_task_line(&view));
    if let Some(description) = &view.task.description {
        println!("  {description}");
    }
    if let Some(deadline) = view.task.deadline {
        println!("  deadline: {}", crate::format::format_date(deadline));
    }
    if view.task.is_recurring {
        println!(
            "  repeats: {}{}",
            view.task.recurring_rule.as_deref().unwrap_or("(no rule)"),
            if view.task.is_habit { " (habit)" } else { "" }
        );
    }
    if let Some(estimate) = view.task.estimate_minutes {
        println!("  estimate: {estimate} min");
    }
    for blocker in &view.blockers {
        let state = if blocker.is_completed { "done" } else { "open" };
        println!("  blocked by #{} ({state}): {}", blocker.id, blocker.title);
    }
    for reminder in &view.reminders {
        println!(
            "  reminder #{} at {}",
            reminder.id,
            reminder.remind_at.format("%Y-%m-%d %H:%M")
        );
    }

    let subtasks = engine.storage().subtasks_of(id)?;
    for subtask in &subtasks {
        let check = if subtask.is_completed { "[x]" } else { "[ ]" };
        println!("  {check} #{} {}", subtask.id, subtask.title);
    }

    let logs = engine.storage().logs_for_task(id, 10)?;
    if !logs.is_empty() {
        println!("  recent activity:");
        for log in &logs {
            println!("    {}", format_log_line(log));
        }
    }

    Ok(())
}

/// Execute `stride edit`.
///
/// # Errors
///
/// Returns an error if field resolution or the update fails.
pub fn edit(engine: &mut TaskEngine, args: &EditArgs, json: bool) -> Result<()> {
    let now = Utc::now();
    let mut patch = TaskPatch {
        title: args.title.clone(),
        priority: args.priority.map(Into::into),
        ..TaskPatch::default()
    };

    if args.describe.is_some() {
        patch.description = Some(args.describe.clone());
    }
    if let Some(due) = &args.due {
        patch.due_date = Some(Some(parse_when(due, now)?));
    } else if args.no_due {
        patch.due_date = Some(None);
    }
    if let Some(deadline) = &args.deadline {
        patch.deadline = Some(Some(parse_when(deadline, now)?));
    } else if args.no_deadline {
        patch.deadline = Some(None);
    }
    if let Some(list) = &args.list {
        patch.list_id = Some(Some(resolve_list(engine, list)?));
    } else if args.no_list {
        patch.list_id = Some(None);
    }
    if !args.labels.is_empty() {
        let mut ids = Vec::with_capacity(args.labels.len());
        for label in &args.labels {
            ids.push(resolve_or_create_label(engine, label)?);
        }
        patch.label_ids = Some(ids);
    } else if args.clear_labels {
        patch.label_ids = Some(Vec::new());
    }
    if let Some(rule) = &args.recur {
        patch.is_recurring = Some(true);
        patch.recurring_rule = Some(Some(rule.clone()));
    } else if args.no_recur {
        patch.is_recurring = Some(false);
        patch.recurring_rule = Some(None);
        patch.is_habit = Some(false);
    }
    if args.estimate.is_some() {
        patch.estimate_minutes = Some(args.estimate);
    }
    if args.actual.is_some() {
        patch.actual_minutes = Some(args.actual);
    }
    if let Some(energy) = args.energy {
        patch.energy_level = Some(Some(energy.into()));
    }
    if let Some(context) = args.context {
        patch.context = Some(Some(context.into()));
    }
    if args.habit {
        patch.is_habit = Some(true);
    } else if args.no_habit {
        patch.is_habit = Some(false);
    }

    match engine.update_task(args.id, patch)? {
        Some(view) => {
            if json {
                print_json(&view);
            } else {
                println!("{}", format_task_line(&view));
            }
        }
        None => println!("task #{} not found", args.id),
    }
    Ok(())
}

/// Execute `stride done` / `stride undone`.
///
/// # Errors
///
/// Returns an error if the toggle fails.
pub fn toggle(engine: &mut TaskEngine, id: i64, completed: bool, json: bool) -> Result<()> {
    let Some(outcome) = engine.toggle_completion(id, completed)? else {
        println!("task #{id} not found");
        return Ok(());
    };

    if json {
        print_json(&outcome.task);
        return Ok(());
    }

    println!("{}", format_task_line(&outcome.task));
    if let Some(award) = outcome.award {
        println!("  +XP -> {} (level {})", award.new_xp, award.new_level);
        if award.leveled_up {
            println!("  level up!");
        }
    }
    if let Some(spawned) = outcome.spawned {
        println!("  next occurrence: {}", format_task_line(&spawned));
    }
    Ok(())
}

/// Execute `stride rm`.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn rm(engine: &mut TaskEngine, id: i64) -> Result<()> {
    if engine.delete_task(id)? {
        println!("deleted task #{id}");
    } else {
        println!("task #{id} not found");
    }
    Ok(())
}

/// Execute `stride subtask`.
///
/// # Errors
///
/// Returns an error if the parent is missing or creation fails.
pub fn subtask(engine: &mut TaskEngine, parent: i64, title: &str, json: bool) -> Result<()> {
    let view = engine.create_subtask(parent, title)?;
    if json {
        print_json(&view);
    } else {
        println!("{}", format_task_line(&view));
    }
    Ok(())
}
