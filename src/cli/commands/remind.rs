//! Reminder commands.

use crate::cli::{parse_when, RemindCommand};
use crate::engine::TaskEngine;
use crate::error::Result;
use crate::format::print_json;
use chrono::Utc;

/// Execute `stride remind ...`.
///
/// # Errors
///
/// Returns an error if date parsing or the storage operation fails.
pub fn execute(engine: &mut TaskEngine, command: &RemindCommand, json: bool) -> Result<()> {
    match command {
        RemindCommand::Add { task, when } => {
            let remind_at = parse_when(when, Utc::now())?;
            let reminder = engine.add_reminder(*task, remind_at)?;
            if json {
                print_json(&reminder);
            } else {
                println!(
                    "reminder #{} on task #{} at {}",
                    reminder.id,
                    reminder.task_id,
                    reminder.remind_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        RemindCommand::Rm { id } => {
            if engine.remove_reminder(*id)? {
                println!("removed reminder #{id}");
            } else {
                println!("reminder #{id} not found");
            }
        }
        RemindCommand::Ls { task } => {
            let reminders = engine.storage().reminders_for_task(*task)?;
            if json {
                print_json(&reminders);
            } else if reminders.is_empty() {
                println!("no reminders");
            } else {
                for reminder in &reminders {
                    let sent = if reminder.is_sent { " (sent)" } else { "" };
                    println!(
                        "#{:<4} {}{sent}",
                        reminder.id,
                        reminder.remind_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }
    }
    Ok(())
}
