//! Dependency commands.

use crate::cli::DepCommand;
use crate::engine::TaskEngine;
use crate::error::Result;
use crate::format::print_json;

/// Execute `stride dep ...`.
///
/// # Errors
///
/// Self- and circular-dependency validation errors surface here for the
/// caller to print; nothing is written in those cases.
pub fn execute(engine: &mut TaskEngine, command: &DepCommand, json: bool) -> Result<()> {
    match command {
        DepCommand::Add { task, blocker } => {
            if engine.add_dependency(*task, *blocker)? {
                println!("task #{task} is now blocked by #{blocker}");
            } else {
                println!("edge already exists");
            }
        }
        DepCommand::Rm { task, blocker } => {
            if engine.remove_dependency(*task, *blocker)? {
                println!("task #{task} is no longer blocked by #{blocker}");
            } else {
                println!("no such edge");
            }
        }
        DepCommand::Show { task } => {
            let blockers = engine.blockers(*task)?;
            let blocked = engine.blocked_tasks(*task)?;

            if json {
                print_json(&serde_json::json!({
                    "blockers": blockers,
                    "blocked": blocked,
                }));
                return Ok(());
            }

            if blockers.is_empty() {
                println!("#{task} has no blockers");
            } else {
                println!("#{task} is blocked by:");
                for blocker in &blockers {
                    let state = if blocker.is_completed { "done" } else { "open" };
                    println!("  #{} ({state}) {}", blocker.id, blocker.title);
                }
            }

            if !blocked.is_empty() {
                println!("#{task} blocks:");
                for dependent in &blocked {
                    println!("  #{} {}", dependent.id, dependent.title);
                }
            }
        }
    }
    Ok(())
}
