//! Error types for `stride`.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, StrideError>;

/// All errors surfaced by the stride core.
///
/// Validation failures get their own variants so the presentation layer can
/// show a specific message instead of a generic database error.
#[derive(Debug, Error)]
pub enum StrideError {
    #[error("task not found: #{id}")]
    TaskNotFound { id: i64 },

    #[error("list not found: #{id}")]
    ListNotFound { id: i64 },

    #[error("label not found: #{id}")]
    LabelNotFound { id: i64 },

    #[error("template not found: #{id}")]
    TemplateNotFound { id: i64 },

    #[error("reminder not found: #{id}")]
    ReminderNotFound { id: i64 },

    /// A task cannot block itself.
    #[error("invalid dependency: task #{id} cannot depend on itself")]
    SelfDependency { id: i64 },

    /// The reverse edge already exists. This is a one-hop check only; longer
    /// transitive cycles are not detected (see DESIGN.md).
    #[error("circular dependency: task #{blocker_id} is already blocked by task #{task_id}")]
    CircularDependency { task_id: i64, blocker_id: i64 },

    #[error("invalid template content: {reason}")]
    InvalidTemplate { reason: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("no .stride directory found (run `stride init` first)")]
    NotInitialized,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl StrideError {
    /// Whether this error is a user-input validation failure (as opposed to
    /// an infrastructure failure).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::SelfDependency { .. }
                | Self::CircularDependency { .. }
                | Self::InvalidTemplate { .. }
                | Self::InvalidValue { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_classification() {
        assert!(StrideError::SelfDependency { id: 1 }.is_validation());
        assert!(
            StrideError::CircularDependency {
                task_id: 1,
                blocker_id: 2
            }
            .is_validation()
        );
        assert!(!StrideError::TaskNotFound { id: 1 }.is_validation());
    }

    #[test]
    fn messages_name_the_ids() {
        let err = StrideError::CircularDependency {
            task_id: 3,
            blocker_id: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("#3"));
        assert!(msg.contains("#7"));
    }
}
