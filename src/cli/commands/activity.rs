//! Activity log command.

use crate::cli::ActivityArgs;
use crate::engine::TaskEngine;
use crate::error::Result;
use crate::format::{format_log_line, print_json};

/// Execute `stride activity`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn execute(engine: &TaskEngine, args: &ActivityArgs, json: bool) -> Result<()> {
    let logs = match args.task {
        Some(task_id) => engine.storage().logs_for_task(task_id, args.limit)?,
        None => engine.storage().recent_logs(args.limit)?,
    };

    if json {
        print_json(&logs);
    } else if logs.is_empty() {
        println!("no activity");
    } else {
        for log in &logs {
            println!("{}", format_log_line(log));
        }
    }
    Ok(())
}
