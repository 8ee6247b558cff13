//! Command implementations.

pub mod activity;
pub mod dep;
pub mod label;
pub mod list;
pub mod remind;
pub mod stats;
pub mod task;
pub mod template;

use crate::engine::TaskEngine;
use crate::error::{Result, StrideError};

/// Resolve a list reference given as a numeric id or a slug.
pub fn resolve_list(engine: &TaskEngine, reference: &str) -> Result<i64> {
    if let Ok(id) = reference.parse::<i64>() {
        return engine
            .storage()
            .get_list(id)?
            .map(|list| list.id)
            .ok_or(StrideError::ListNotFound { id });
    }

    engine
        .storage()
        .get_list_by_slug(reference)?
        .map(|list| list.id)
        .ok_or_else(|| StrideError::InvalidValue {
            field: "list",
            value: reference.to_string(),
        })
}

/// Resolve a label reference given as a numeric id or a name, without
/// creating anything. Used by read paths (filters).
pub fn resolve_label(engine: &TaskEngine, reference: &str) -> Result<i64> {
    if let Ok(id) = reference.parse::<i64>() {
        return engine
            .storage()
            .get_label(id)?
            .map(|label| label.id)
            .ok_or(StrideError::LabelNotFound { id });
    }

    engine
        .storage()
        .get_labels()?
        .into_iter()
        .find(|label| label.name.eq_ignore_ascii_case(reference))
        .map(|label| label.id)
        .ok_or_else(|| StrideError::InvalidValue {
            field: "label",
            value: reference.to_string(),
        })
}

/// Resolve a label reference given as a numeric id or a name. Unknown names
/// create the label on the fly; unknown ids are an error.
pub fn resolve_or_create_label(engine: &mut TaskEngine, reference: &str) -> Result<i64> {
    if let Ok(id) = reference.parse::<i64>() {
        return engine
            .storage()
            .get_label(id)?
            .map(|label| label.id)
            .ok_or(StrideError::LabelNotFound { id });
    }

    let existing = engine
        .storage()
        .get_labels()?
        .into_iter()
        .find(|label| label.name.eq_ignore_ascii_case(reference));

    match existing {
        Some(label) => Ok(label.id),
        None => {
            let label = engine.storage_mut().create_label(reference, None, None)?;
            Ok(label.id)
        }
    }
}
