//! Activity log storage (insertion, retrieval).
//!
//! The `task_logs` table is append-only: rows are never updated or deleted
//! except by cascade when their task is deleted.

use crate::error::Result;
use crate::model::TaskLog;
use crate::storage::sqlite::{parse_datetime, PendingLog, SqliteStorage};
use chrono::Utc;
use rusqlite::Connection;

/// Insert one queued log row. Called by the mutation protocol just before
/// commit; the caller isolates failures.
pub(crate) fn insert_log_row(conn: &Connection, log: &PendingLog) -> Result<()> {
    conn.execute(
        "INSERT INTO task_logs (task_id, action, details, created_at) VALUES (?, ?, ?, ?)",
        rusqlite::params![
            log.task_id,
            log.action.as_str(),
            log.details,
            Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

fn log_from_row(row: &rusqlite::Row) -> rusqlite::Result<TaskLog> {
    Ok(TaskLog {
        id: row.get(0)?,
        task_id: row.get(1)?,
        action: row
            .get::<_, String>(2)?
            .parse()
            .unwrap_or(crate::model::LogAction::Updated),
        details: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

impl SqliteStorage {
    /// Log entries for one task, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn logs_for_task(&self, task_id: i64, limit: usize) -> Result<Vec<TaskLog>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, task_id, action, details, created_at
             FROM task_logs
             WHERE task_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )?;
        let logs = stmt
            .query_map(rusqlite::params![task_id, limit as i64], log_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// Recent log entries across all tasks (including system entries with no
    /// task), newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn recent_logs(&self, limit: usize) -> Result<Vec<TaskLog>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, task_id, action, details, created_at
             FROM task_logs
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )?;
        let logs = stmt
            .query_map([limit as i64], log_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }
}
