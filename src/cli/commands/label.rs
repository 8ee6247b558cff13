//! Label management commands.

use crate::cli::LabelsCommand;
use crate::engine::TaskEngine;
use crate::error::Result;
use crate::format::print_json;

/// Execute `stride labels ...`.
///
/// # Errors
///
/// Returns an error if the storage operation fails.
pub fn execute(engine: &mut TaskEngine, command: &LabelsCommand, json: bool) -> Result<()> {
    match command {
        LabelsCommand::Add { name, color, icon } => {
            let label = engine
                .storage_mut()
                .create_label(name, color.as_deref(), icon.as_deref())?;
            if json {
                print_json(&label);
            } else {
                println!("created label #{} {}", label.id, label.name);
            }
        }
        LabelsCommand::Ls => {
            let labels = engine.storage().get_labels()?;
            if json {
                print_json(&labels);
            } else if labels.is_empty() {
                println!("no labels");
            } else {
                for label in &labels {
                    println!("#{:<4} {:<24} {}", label.id, label.name, label.color);
                }
            }
        }
        LabelsCommand::Edit {
            id,
            name,
            color,
            icon,
        } => {
            let label = engine.storage_mut().update_label(
                *id,
                name.as_deref(),
                color.as_deref(),
                icon.as_deref(),
            )?;
            if json {
                print_json(&label);
            } else {
                println!("updated label #{} {}", label.id, label.name);
            }
        }
        LabelsCommand::Rm { id } => {
            if engine.storage_mut().delete_label(*id)? {
                println!("deleted label #{id}");
            } else {
                println!("label #{id} not found");
            }
        }
    }
    Ok(())
}
