//! List management commands.

use crate::cli::ListsCommand;
use crate::engine::TaskEngine;
use crate::error::Result;
use crate::format::print_json;

/// Execute `stride lists ...`.
///
/// # Errors
///
/// Returns an error if the storage operation fails.
pub fn execute(engine: &mut TaskEngine, command: &ListsCommand, json: bool) -> Result<()> {
    match command {
        ListsCommand::Add { name, color, icon } => {
            let list = engine.storage_mut().create_list(
                name,
                color.as_deref(),
                icon.as_deref(),
                None,
            )?;
            if json {
                print_json(&list);
            } else {
                println!("created list #{} {} ({})", list.id, list.name, list.slug);
            }
        }
        ListsCommand::Ls => {
            let lists = engine.storage().get_lists()?;
            if json {
                print_json(&lists);
            } else if lists.is_empty() {
                println!("no lists");
            } else {
                for list in &lists {
                    println!("#{:<4} {:<24} {}", list.id, list.name, list.slug);
                }
            }
        }
        ListsCommand::Edit {
            id,
            name,
            color,
            icon,
        } => {
            let list = engine.storage_mut().update_list(
                *id,
                name.as_deref(),
                color.as_deref(),
                icon.as_deref(),
            )?;
            if json {
                print_json(&list);
            } else {
                println!("updated list #{} {}", list.id, list.name);
            }
        }
        ListsCommand::Rm { id } => {
            if engine.storage_mut().delete_list(*id)? {
                println!("deleted list #{id} (and its tasks)");
            } else {
                println!("list #{id} not found");
            }
        }
    }
    Ok(())
}
