//! Dependency graph maintenance: blocker/blocked edges over tasks.
//!
//! Edges are directed blocker -> blocked. Self-references are rejected, as is
//! the direct reverse edge (a one-hop check; longer transitive cycles are not
//! detected — a carried-forward limitation, see DESIGN.md). Blocker
//! completion emits informational log signals to dependents; nothing is
//! auto-completed or hard-gated.

use crate::error::{Result, StrideError};
use crate::model::LogAction;
use crate::storage::MutationContext;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// Insert the edge "`task_id` is blocked by `blocker_id`".
///
/// Returns `false` when the edge already exists (no error, no log row).
pub(crate) fn add_dependency(
    conn: &Connection,
    ctx: &mut MutationContext,
    task_id: i64,
    blocker_id: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    if task_id == blocker_id {
        return Err(StrideError::SelfDependency { id: task_id });
    }

    for id in [task_id, blocker_id] {
        let exists: i64 = conn.query_row("SELECT count(*) FROM tasks WHERE id = ?", [id], |row| {
            row.get(0)
        })?;
        if exists == 0 {
            return Err(StrideError::TaskNotFound { id });
        }
    }

    // One-hop reverse check only.
    let reverse: i64 = conn.query_row(
        "SELECT count(*) FROM task_dependencies WHERE task_id = ? AND blocker_id = ?",
        rusqlite::params![blocker_id, task_id],
        |row| row.get(0),
    )?;
    if reverse > 0 {
        return Err(StrideError::CircularDependency {
            task_id,
            blocker_id,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT count(*) FROM task_dependencies WHERE task_id = ? AND blocker_id = ?",
        rusqlite::params![task_id, blocker_id],
        |row| row.get(0),
    )?;
    if exists > 0 {
        return Ok(false);
    }

    conn.execute(
        "INSERT INTO task_dependencies (task_id, blocker_id, created_at) VALUES (?, ?, ?)",
        rusqlite::params![task_id, blocker_id, now.to_rfc3339()],
    )?;

    ctx.log(
        Some(task_id),
        LogAction::DependencyAdded,
        Some(format!("Blocked by task #{blocker_id}")),
    );

    Ok(true)
}

/// Delete the edge if present. Idempotent: a missing edge is not an error and
/// writes no log row.
pub(crate) fn remove_dependency(
    conn: &Connection,
    ctx: &mut MutationContext,
    task_id: i64,
    blocker_id: i64,
) -> Result<bool> {
    let rows = conn.execute(
        "DELETE FROM task_dependencies WHERE task_id = ? AND blocker_id = ?",
        rusqlite::params![task_id, blocker_id],
    )?;

    if rows > 0 {
        ctx.log(
            Some(task_id),
            LogAction::DependencyRemoved,
            Some(format!("No longer blocked by task #{blocker_id}")),
        );
    }

    Ok(rows > 0)
}

/// Emit `blocker_completed` signals to every task the completed task was
/// blocking. Must run after the completion state has been persisted so the
/// remaining-blockers query sees the completed blocker as done.
pub(crate) fn signal_blocker_completed(
    conn: &Connection,
    ctx: &mut MutationContext,
    blocker_id: i64,
    blocker_title: &str,
) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT task_id FROM task_dependencies WHERE blocker_id = ?
         ORDER BY created_at, rowid",
    )?;
    let dependents: Vec<i64> = stmt
        .query_map([blocker_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for dependent in dependents {
        let remaining: i64 = conn.query_row(
            "SELECT count(*) FROM task_dependencies d
             JOIN tasks t ON t.id = d.blocker_id
             WHERE d.task_id = ? AND t.is_completed = 0",
            [dependent],
            |row| row.get(0),
        )?;

        let mut message = format!("Blocker completed: \"{blocker_title}\"");
        if remaining == 0 {
            message.push_str(". Task is now unblocked!");
        }

        ctx.log(Some(dependent), LogAction::BlockerCompleted, Some(message));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    fn seed_tasks(storage: &mut SqliteStorage, count: usize) {
        storage
            .mutate("seed", |tx, _ctx| {
                for i in 0..count {
                    tx.execute(
                        "INSERT INTO tasks (title) VALUES (?)",
                        [format!("task {i}")],
                    )?;
                }
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn self_dependency_rejected() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        seed_tasks(&mut storage, 1);

        let err = storage
            .mutate("dep", |tx, ctx| add_dependency(tx, ctx, 1, 1, Utc::now()))
            .unwrap_err();
        assert!(matches!(err, StrideError::SelfDependency { id: 1 }));
    }

    #[test]
    fn reverse_edge_rejected_one_hop() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        seed_tasks(&mut storage, 3);

        storage
            .mutate("dep", |tx, ctx| add_dependency(tx, ctx, 1, 2, Utc::now()))
            .unwrap();

        let err = storage
            .mutate("dep", |tx, ctx| add_dependency(tx, ctx, 2, 1, Utc::now()))
            .unwrap_err();
        assert!(matches!(err, StrideError::CircularDependency { .. }));

        // Transitive cycle is NOT detected: 2 blocked-by 3, 3 blocked-by 1
        // closes a triangle with 1 blocked-by 2 and is accepted.
        storage
            .mutate("dep", |tx, ctx| add_dependency(tx, ctx, 2, 3, Utc::now()))
            .unwrap();
        let added = storage
            .mutate("dep", |tx, ctx| add_dependency(tx, ctx, 3, 1, Utc::now()))
            .unwrap();
        assert!(added);
    }

    #[test]
    fn duplicate_edge_returns_false() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        seed_tasks(&mut storage, 2);

        let first = storage
            .mutate("dep", |tx, ctx| add_dependency(tx, ctx, 1, 2, Utc::now()))
            .unwrap();
        assert!(first);
        let second = storage
            .mutate("dep", |tx, ctx| add_dependency(tx, ctx, 1, 2, Utc::now()))
            .unwrap();
        assert!(!second);
    }

    #[test]
    fn missing_task_rejected() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        seed_tasks(&mut storage, 1);

        let err = storage
            .mutate("dep", |tx, ctx| add_dependency(tx, ctx, 1, 99, Utc::now()))
            .unwrap_err();
        assert!(matches!(err, StrideError::TaskNotFound { id: 99 }));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        seed_tasks(&mut storage, 2);

        storage
            .mutate("dep", |tx, ctx| add_dependency(tx, ctx, 1, 2, Utc::now()))
            .unwrap();

        let removed = storage
            .mutate("dep", |tx, ctx| remove_dependency(tx, ctx, 1, 2))
            .unwrap();
        assert!(removed);

        let removed = storage
            .mutate("dep", |tx, ctx| remove_dependency(tx, ctx, 1, 2))
            .unwrap();
        assert!(!removed, "second removal is a no-op");

        assert!(storage.blockers_of(1).unwrap().is_empty());
    }
}
