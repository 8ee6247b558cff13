//! Template commands.

use crate::cli::commands::resolve_list;
use crate::cli::TemplateCommand;
use crate::engine::{template, TaskEngine};
use crate::error::{Result, StrideError};
use crate::format::{format_task_line, print_json};
use chrono::Utc;
use std::fs;

/// Execute `stride template ...`.
///
/// # Errors
///
/// Returns an error if template content is invalid or the operation fails.
pub fn execute(engine: &mut TaskEngine, command: &TemplateCommand, json: bool) -> Result<()> {
    match command {
        TemplateCommand::Add {
            name,
            file,
            content,
        } => {
            let raw = match (file, content) {
                (Some(path), _) => fs::read_to_string(path)?,
                (None, Some(inline)) => inline.clone(),
                (None, None) => {
                    return Err(StrideError::InvalidTemplate {
                        reason: "provide --file or --content".to_string(),
                    });
                }
            };

            // Validate up front so obviously broken templates are rejected
            // at authoring time too, not only at instantiation.
            template::parse_content(&raw, Utc::now())?;

            let stored = engine.storage_mut().create_template(name, &raw)?;
            if json {
                print_json(&stored);
            } else {
                println!("created template #{} {}", stored.id, stored.name);
            }
        }
        TemplateCommand::Ls => {
            let templates = engine.storage().get_templates()?;
            if json {
                print_json(&templates);
            } else if templates.is_empty() {
                println!("no templates");
            } else {
                for stored in &templates {
                    println!("#{:<4} {}", stored.id, stored.name);
                }
            }
        }
        TemplateCommand::Rm { id } => {
            if engine.storage_mut().delete_template(*id)? {
                println!("deleted template #{id}");
            } else {
                println!("template #{id} not found");
            }
        }
        TemplateCommand::Apply { id, list } => {
            let list_id = list
                .as_deref()
                .map(|reference| resolve_list(engine, reference))
                .transpose()?;

            let created = engine.instantiate_template(*id, list_id)?;
            if json {
                print_json(&created);
            } else {
                for view in &created {
                    println!("{}", format_task_line(view));
                }
            }
        }
    }
    Ok(())
}
