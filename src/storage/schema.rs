//! Database schema definitions.

use rusqlite::{Connection, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the stride database.
pub const SCHEMA_SQL: &str = r#"
    -- Lists. Deleting a list cascades to its tasks.
    CREATE TABLE IF NOT EXISTS lists (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        color TEXT NOT NULL DEFAULT '#000000',
        icon TEXT,
        slug TEXT NOT NULL UNIQUE,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Tasks
    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        list_id INTEGER REFERENCES lists(id) ON DELETE CASCADE,
        title TEXT NOT NULL CHECK(length(title) <= 500),
        description TEXT,
        priority TEXT NOT NULL DEFAULT 'none'
            CHECK(priority IN ('none', 'low', 'medium', 'high')),
        due_date DATETIME,
        deadline DATETIME,
        is_completed INTEGER NOT NULL DEFAULT 0,
        completed_at DATETIME,
        is_recurring INTEGER NOT NULL DEFAULT 0,
        recurring_rule TEXT,
        parent_id INTEGER REFERENCES tasks(id) ON DELETE CASCADE,
        estimate_minutes INTEGER,
        actual_minutes INTEGER,
        energy_level TEXT CHECK(energy_level IN ('high', 'medium', 'low')),
        context TEXT CHECK(context IN
            ('computer', 'phone', 'errands', 'meeting', 'home', 'anywhere')),
        is_habit INTEGER NOT NULL DEFAULT 0,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        -- Completed tasks MUST carry a completion timestamp, and only they may
        CHECK (
            (is_completed = 1 AND completed_at IS NOT NULL) OR
            (is_completed = 0 AND completed_at IS NULL)
        ),
        -- Habits are always recurring
        CHECK (is_habit = 0 OR is_recurring = 1)
    );

    CREATE INDEX IF NOT EXISTS idx_tasks_list ON tasks(list_id) WHERE list_id IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_tasks_parent ON tasks(parent_id) WHERE parent_id IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_tasks_completed ON tasks(is_completed);
    CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date) WHERE due_date IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_tasks_completed_at ON tasks(completed_at) WHERE completed_at IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_tasks_habit ON tasks(is_habit) WHERE is_habit = 1;
    CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);

    -- Labels
    CREATE TABLE IF NOT EXISTS labels (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        color TEXT NOT NULL DEFAULT '#000000',
        icon TEXT
    );

    -- Task <-> Label association, no attributes of its own
    CREATE TABLE IF NOT EXISTS task_labels (
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
        PRIMARY KEY (task_id, label_id)
    );
    CREATE INDEX IF NOT EXISTS idx_task_labels_label ON task_labels(label_id);

    -- Reminders
    CREATE TABLE IF NOT EXISTS reminders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        remind_at DATETIME NOT NULL,
        is_sent INTEGER NOT NULL DEFAULT 0,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_reminders_task ON reminders(task_id);
    CREATE INDEX IF NOT EXISTS idx_reminders_remind_at ON reminders(remind_at) WHERE is_sent = 0;

    -- Activity log (append-only). task_id is NULL for system entries.
    CREATE TABLE IF NOT EXISTS task_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        task_id INTEGER REFERENCES tasks(id) ON DELETE CASCADE,
        action TEXT NOT NULL,
        details TEXT,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_task_logs_task ON task_logs(task_id);
    CREATE INDEX IF NOT EXISTS idx_task_logs_action ON task_logs(action);
    CREATE INDEX IF NOT EXISTS idx_task_logs_created_at ON task_logs(created_at);

    -- Dependencies: task_id is blocked by blocker_id
    CREATE TABLE IF NOT EXISTS task_dependencies (
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        blocker_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (task_id, blocker_id)
    );
    CREATE INDEX IF NOT EXISTS idx_dependencies_blocker ON task_dependencies(blocker_id);

    -- Templates: serialized task-trees, validated at instantiation time
    CREATE TABLE IF NOT EXISTS templates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Habit completion events, one row per completion
    CREATE TABLE IF NOT EXISTS habit_completions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        completed_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_habit_completions_task ON habit_completions(task_id);
    CREATE INDEX IF NOT EXISTS idx_habit_completions_at ON habit_completions(completed_at);

    -- Singleton gamification record (row id fixed to 1)
    CREATE TABLE IF NOT EXISTS user_stats (
        id INTEGER PRIMARY KEY CHECK(id = 1),
        xp INTEGER NOT NULL DEFAULT 0,
        level INTEGER NOT NULL DEFAULT 1,
        current_streak INTEGER NOT NULL DEFAULT 0,
        longest_streak INTEGER NOT NULL DEFAULT 0,
        last_login DATETIME
    );

    -- Achievement catalog
    CREATE TABLE IF NOT EXISTS achievements (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        icon TEXT NOT NULL DEFAULT '',
        condition_type TEXT NOT NULL
            CHECK(condition_type IN ('count_total', 'count_daily', 'streak')),
        condition_value INTEGER NOT NULL,
        xp_reward INTEGER NOT NULL
    );

    -- Unlocks. The primary key makes each achievement unlockable at most once.
    CREATE TABLE IF NOT EXISTS user_achievements (
        achievement_id TEXT PRIMARY KEY REFERENCES achievements(id) ON DELETE CASCADE,
        unlocked_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Catalog seed. INSERT OR IGNORE keeps re-applies idempotent.
    INSERT OR IGNORE INTO achievements
        (id, name, description, icon, condition_type, condition_value, xp_reward)
    VALUES
        ('first_steps', 'First Steps', 'Complete your first task', 'footprints', 'count_total', 1, 25),
        ('getting_things_done', 'Getting Things Done', 'Complete 10 tasks', 'check-circle', 'count_total', 10, 50),
        ('centurion', 'Centurion', 'Complete 100 tasks', 'trophy', 'count_total', 100, 200),
        ('productive_day', 'Productive Day', 'Complete 5 tasks in one day', 'sun', 'count_daily', 5, 30),
        ('unstoppable', 'Unstoppable', 'Complete 10 tasks in one day', 'zap', 'count_daily', 10, 75),
        ('week_streak', 'Week Streak', 'Keep a 7-day habit streak', 'flame', 'streak', 7, 100),
        ('habit_master', 'Habit Master', 'Keep a 30-day habit streak', 'crown', 'streak', 30, 500);
"#;

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script. It is idempotent
/// because all statements use `IF NOT EXISTS` / `INSERT OR IGNORE`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    // Foreign keys must be on before any cascade-bearing writes.
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute_batch(SCHEMA_SQL)?;

    // WAL for concurrent reads; NORMAL synchronous is safe with WAL.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_apply_schema() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).expect("Failed to apply schema");

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for table in [
            "lists",
            "tasks",
            "labels",
            "task_labels",
            "reminders",
            "task_logs",
            "task_dependencies",
            "templates",
            "habit_completions",
            "user_stats",
            "achievements",
            "user_achievements",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }

        let foreign_keys: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn test_apply_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        apply_schema(&conn).unwrap();

        let catalog: i64 = conn
            .query_row("SELECT count(*) FROM achievements", [], |row| row.get(0))
            .unwrap();
        assert_eq!(catalog, 7, "catalog seed should not duplicate");
    }

    #[test]
    fn test_completion_invariant_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        // Incomplete task without completed_at - fine
        conn.execute("INSERT INTO tasks (title) VALUES ('open task')", [])
            .expect("Should allow incomplete task");

        // Completed without timestamp - rejected
        let result = conn.execute(
            "INSERT INTO tasks (title, is_completed) VALUES ('bad', 1)",
            [],
        );
        assert!(
            result.is_err(),
            "Should reject completed task without completed_at"
        );

        // Completed with timestamp - fine
        conn.execute(
            "INSERT INTO tasks (title, is_completed, completed_at)
             VALUES ('done', 1, CURRENT_TIMESTAMP)",
            [],
        )
        .expect("Should allow completed task with completed_at");

        // Timestamp on an incomplete task - rejected
        let result = conn.execute(
            "INSERT INTO tasks (title, is_completed, completed_at)
             VALUES ('bad2', 0, CURRENT_TIMESTAMP)",
            [],
        );
        assert!(
            result.is_err(),
            "Should reject completion timestamp on incomplete task"
        );
    }

    #[test]
    fn test_habit_requires_recurring() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO tasks (title, is_habit, is_recurring) VALUES ('h', 1, 0)",
            [],
        );
        assert!(result.is_err(), "Habit without recurrence should fail");

        conn.execute(
            "INSERT INTO tasks (title, is_habit, is_recurring, recurring_rule)
             VALUES ('h', 1, 1, 'FREQ=DAILY')",
            [],
        )
        .expect("Recurring habit should be allowed");
    }

    #[test]
    fn test_list_delete_cascades_to_tasks() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO lists (name, slug) VALUES ('Work', 'work')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO tasks (title, list_id) VALUES ('in work', 1)",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM lists WHERE id = 1", []).unwrap();

        let count: i64 = conn
            .query_row("SELECT count(*) FROM tasks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0, "tasks should be deleted with their list");
    }

    #[test]
    fn test_task_delete_cascades_to_children() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        conn.execute("INSERT INTO tasks (title) VALUES ('parent')", [])
            .unwrap();
        conn.execute(
            "INSERT INTO tasks (title, parent_id) VALUES ('child', 1)",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO labels (name) VALUES ('tag')", [])
            .unwrap();
        conn.execute(
            "INSERT INTO task_labels (task_id, label_id) VALUES (1, 1)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO task_logs (task_id, action) VALUES (1, 'created')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO task_dependencies (task_id, blocker_id) VALUES (2, 1)",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM tasks WHERE id = 1", []).unwrap();

        for (table, expected) in [
            ("tasks", 0i64),
            ("task_labels", 0),
            ("task_logs", 0),
            ("task_dependencies", 0),
        ] {
            let count: i64 = conn
                .query_row(&format!("SELECT count(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .unwrap();
            assert_eq!(count, expected, "{table} should be empty after cascade");
        }
    }

    #[test]
    fn test_achievement_unlock_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let first = conn
            .execute(
                "INSERT OR IGNORE INTO user_achievements (achievement_id) VALUES ('first_steps')",
                [],
            )
            .unwrap();
        assert_eq!(first, 1);

        let second = conn
            .execute(
                "INSERT OR IGNORE INTO user_achievements (achievement_id) VALUES ('first_steps')",
                [],
            )
            .unwrap();
        assert_eq!(second, 0, "second unlock must be a no-op");
    }
}
