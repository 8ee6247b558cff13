//! `SQLite` storage implementation.

use crate::error::{Result, StrideError};
use crate::model::{
    DateWindow, EnergyLevel, Label, List, LogAction, NewTask, Reminder, Task, TaskContext,
    TaskFilters, TaskRef, TaskView, Template, UserStats,
};
use crate::storage::logs;
use crate::storage::schema::apply_schema;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::fmt::Write as _;
use std::path::Path;
use tracing::warn;

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// An activity log row queued during a mutation, written at commit time.
#[derive(Debug, Clone)]
pub struct PendingLog {
    pub task_id: Option<i64>,
    pub action: LogAction,
    pub details: Option<String>,
}

/// Context for a mutation operation, collecting activity log rows.
///
/// Log rows are inserted just before commit, each one individually guarded:
/// a failed log insert is traced and dropped, never allowed to roll back the
/// primary mutation it describes.
pub struct MutationContext {
    pub op_name: String,
    pending_logs: Vec<PendingLog>,
}

impl MutationContext {
    #[must_use]
    pub fn new(op_name: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            pending_logs: Vec::new(),
        }
    }

    /// Queue one activity log row. `task_id` of `None` makes a system-level
    /// entry (achievement unlocks).
    pub fn log(&mut self, task_id: Option<i64>, action: LogAction, details: Option<String>) {
        self.pending_logs.push(PendingLog {
            task_id,
            action,
            details,
        });
    }
}

const TASK_COLUMNS: &str = "id, list_id, title, description, priority, due_date, deadline, \
     is_completed, completed_at, is_recurring, recurring_rule, parent_id, \
     estimate_minutes, actual_minutes, energy_level, context, is_habit, \
     created_at, updated_at";

impl SqliteStorage {
    /// Open a connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    pub(crate) const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation as one IMMEDIATE transaction.
    ///
    /// The closure performs the state changes and queues activity log rows on
    /// the [`MutationContext`]. Logs are written before commit with per-row
    /// error isolation; the closure's error rolls everything back.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a database error from commit.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let mut ctx = MutationContext::new(op);

        let result = f(&tx, &mut ctx)?;

        for log in &ctx.pending_logs {
            if let Err(err) = logs::insert_log_row(&tx, log) {
                warn!(
                    op = %ctx.op_name,
                    error = %err,
                    "activity log write failed; keeping primary mutation"
                );
            }
        }

        tx.commit()?;
        Ok(result)
    }

    // ------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------

    /// Create a list. The slug is derived from the name unless given.
    ///
    /// # Errors
    ///
    /// Returns an error on slug collision or database failure.
    pub fn create_list(
        &mut self,
        name: &str,
        color: Option<&str>,
        icon: Option<&str>,
        slug: Option<&str>,
    ) -> Result<List> {
        let slug = slug.map_or_else(|| slugify(name), ToString::to_string);
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO lists (name, color, icon, slug, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            rusqlite::params![name, color.unwrap_or("#000000"), icon, slug, now, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_list(id)?.ok_or(StrideError::ListNotFound { id })
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_lists(&self) -> Result<Vec<List>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, color, icon, slug, created_at, updated_at
             FROM lists ORDER BY created_at, id",
        )?;
        let lists = stmt
            .query_map([], list_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lists)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_list(&self, id: i64) -> Result<Option<List>> {
        let list = self
            .conn
            .query_row(
                "SELECT id, name, color, icon, slug, created_at, updated_at
                 FROM lists WHERE id = ?",
                [id],
                list_from_row,
            )
            .optional()?;
        Ok(list)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_list_by_slug(&self, slug: &str) -> Result<Option<List>> {
        let list = self
            .conn
            .query_row(
                "SELECT id, name, color, icon, slug, created_at, updated_at
                 FROM lists WHERE slug = ?",
                [slug],
                list_from_row,
            )
            .optional()?;
        Ok(list)
    }

    /// Update list fields that are `Some`.
    ///
    /// # Errors
    ///
    /// Returns [`StrideError::ListNotFound`] if the list does not exist.
    pub fn update_list(
        &mut self,
        id: i64,
        name: Option<&str>,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> Result<List> {
        let existing = self.get_list(id)?.ok_or(StrideError::ListNotFound { id })?;
        self.conn.execute(
            "UPDATE lists SET name = ?, color = ?, icon = ?, updated_at = ? WHERE id = ?",
            rusqlite::params![
                name.unwrap_or(&existing.name),
                color.unwrap_or(&existing.color),
                icon.or(existing.icon.as_deref()),
                Utc::now().to_rfc3339(),
                id
            ],
        )?;
        self.get_list(id)?.ok_or(StrideError::ListNotFound { id })
    }

    /// Delete a list; tasks in it go with it (cascade).
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn delete_list(&mut self, id: i64) -> Result<bool> {
        let rows = self.conn.execute("DELETE FROM lists WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ------------------------------------------------------------------
    // Labels
    // ------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn create_label(
        &mut self,
        name: &str,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> Result<Label> {
        self.conn.execute(
            "INSERT INTO labels (name, color, icon) VALUES (?, ?, ?)",
            rusqlite::params![name, color.unwrap_or("#000000"), icon],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_label(id)?.ok_or(StrideError::LabelNotFound { id })
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_labels(&self) -> Result<Vec<Label>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color, icon FROM labels ORDER BY id")?;
        let labels = stmt
            .query_map([], label_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(labels)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_label(&self, id: i64) -> Result<Option<Label>> {
        let label = self
            .conn
            .query_row(
                "SELECT id, name, color, icon FROM labels WHERE id = ?",
                [id],
                label_from_row,
            )
            .optional()?;
        Ok(label)
    }

    /// # Errors
    ///
    /// Returns [`StrideError::LabelNotFound`] if the label does not exist.
    pub fn update_label(
        &mut self,
        id: i64,
        name: Option<&str>,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> Result<Label> {
        let existing = self
            .get_label(id)?
            .ok_or(StrideError::LabelNotFound { id })?;
        self.conn.execute(
            "UPDATE labels SET name = ?, color = ?, icon = ? WHERE id = ?",
            rusqlite::params![
                name.unwrap_or(&existing.name),
                color.unwrap_or(&existing.color),
                icon.or(existing.icon.as_deref()),
                id
            ],
        )?;
        self.get_label(id)?.ok_or(StrideError::LabelNotFound { id })
    }

    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn delete_label(&mut self, id: i64) -> Result<bool> {
        let rows = self.conn.execute("DELETE FROM labels WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ------------------------------------------------------------------
    // Tasks (reads; writes go through the engine)
    // ------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        get_task_conn(&self.conn, id)
    }

    /// Get a task with labels, reminders and blockers materialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_task_view(&self, id: i64) -> Result<Option<TaskView>> {
        let Some(task) = self.get_task(id)? else {
            return Ok(None);
        };
        Ok(Some(self.view_for(task)?))
    }

    /// List tasks with optional filters, newest first, children collections
    /// fully materialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_tasks(&self, filters: &TaskFilters) -> Result<Vec<TaskView>> {
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(list_id) = filters.list_id {
            sql.push_str(" AND list_id = ?");
            params.push(Box::new(list_id));
        }

        if let Some(label_id) = filters.label_id {
            sql.push_str(" AND id IN (SELECT task_id FROM task_labels WHERE label_id = ?)");
            params.push(Box::new(label_id));
        }

        let today_start = local_day_start(Utc::now());
        match filters.window {
            DateWindow::Today => {
                let today_end = today_start + chrono::Duration::days(1);
                sql.push_str(" AND due_date >= ? AND due_date < ?");
                params.push(Box::new(today_start.to_rfc3339()));
                params.push(Box::new(today_end.to_rfc3339()));
            }
            DateWindow::Upcoming => {
                sql.push_str(" AND due_date >= ?");
                params.push(Box::new(today_start.to_rfc3339()));
            }
            DateWindow::Next7Days => {
                let week_end = today_start + chrono::Duration::days(7);
                sql.push_str(" AND due_date >= ? AND due_date < ?");
                params.push(Box::new(today_start.to_rfc3339()));
                params.push(Box::new(week_end.to_rfc3339()));
            }
            DateWindow::All => {}
        }

        if !filters.include_completed {
            sql.push_str(" AND is_completed = 0");
        }

        let _ = write!(sql, " ORDER BY created_at DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let tasks = stmt
            .query_map(params_refs.as_slice(), task_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tasks.into_iter().map(|t| self.view_for(t)).collect()
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn subtasks_of(&self, parent_id: i64) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE parent_id = ? ORDER BY created_at, id"
        ))?;
        let tasks = stmt
            .query_map([parent_id], task_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn labels_for_task(&self, task_id: i64) -> Result<Vec<Label>> {
        labels_for_task_conn(&self.conn, task_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn reminders_for_task(&self, task_id: i64) -> Result<Vec<Reminder>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, remind_at, is_sent, created_at
             FROM reminders WHERE task_id = ? ORDER BY remind_at, id",
        )?;
        let reminders = stmt
            .query_map([task_id], reminder_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(reminders)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_reminder(&self, id: i64) -> Result<Option<Reminder>> {
        let reminder = self
            .conn
            .query_row(
                "SELECT id, task_id, remind_at, is_sent, created_at FROM reminders WHERE id = ?",
                [id],
                reminder_from_row,
            )
            .optional()?;
        Ok(reminder)
    }

    /// Tasks blocking `task_id`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn blockers_of(&self, task_id: i64) -> Result<Vec<TaskRef>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.title, t.is_completed
             FROM task_dependencies d
             JOIN tasks t ON t.id = d.blocker_id
             WHERE d.task_id = ?
             ORDER BY d.created_at, d.rowid",
        )?;
        let refs = stmt
            .query_map([task_id], task_ref_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(refs)
    }

    /// Tasks blocked by `blocker_id`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn blocked_by(&self, blocker_id: i64) -> Result<Vec<TaskRef>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.title, t.is_completed
             FROM task_dependencies d
             JOIN tasks t ON t.id = d.task_id
             WHERE d.blocker_id = ?
             ORDER BY d.created_at, d.rowid",
        )?;
        let refs = stmt
            .query_map([blocker_id], task_ref_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(refs)
    }

    // ------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn create_template(&mut self, name: &str, content: &str) -> Result<Template> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO templates (name, content, created_at, updated_at) VALUES (?, ?, ?, ?)",
            rusqlite::params![name, content, now, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_template(id)?
            .ok_or(StrideError::TemplateNotFound { id })
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_templates(&self) -> Result<Vec<Template>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, content, created_at, updated_at FROM templates ORDER BY name, id",
        )?;
        let templates = stmt
            .query_map([], template_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(templates)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_template(&self, id: i64) -> Result<Option<Template>> {
        let template = self
            .conn
            .query_row(
                "SELECT id, name, content, created_at, updated_at FROM templates WHERE id = ?",
                [id],
                template_from_row,
            )
            .optional()?;
        Ok(template)
    }

    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn delete_template(&mut self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM templates WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ------------------------------------------------------------------
    // Gamification reads
    // ------------------------------------------------------------------

    /// Fetch the singleton stats row, creating it on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_or_init_stats(&self) -> Result<UserStats> {
        self.conn
            .execute("INSERT OR IGNORE INTO user_stats (id) VALUES (1)", [])?;
        stats_conn(&self.conn)
    }

    /// The achievement catalog, with unlock timestamps where earned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_achievements(&self) -> Result<Vec<crate::model::Achievement>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.name, a.description, a.icon, a.condition_type,
                    a.condition_value, a.xp_reward, u.unlocked_at
             FROM achievements a
             LEFT JOIN user_achievements u ON u.achievement_id = a.id
             ORDER BY a.condition_type, a.condition_value",
        )?;
        let achievements = stmt
            .query_map([], |row| {
                Ok(crate::model::Achievement {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    icon: row.get(3)?,
                    condition_type: parse_condition_type(&row.get::<_, String>(4)?),
                    condition_value: row.get(5)?,
                    xp_reward: row.get(6)?,
                    unlocked_at: row
                        .get::<_, Option<String>>(7)?
                        .as_deref()
                        .map(parse_datetime),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(achievements)
    }

    fn view_for(&self, task: Task) -> Result<TaskView> {
        let labels = self.labels_for_task(task.id)?;
        let reminders = self.reminders_for_task(task.id)?;
        let blockers = self.blockers_of(task.id)?;
        Ok(TaskView {
            task,
            labels,
            reminders,
            blockers,
        })
    }
}

// ----------------------------------------------------------------------
// Connection-level helpers shared with the engine (work inside and
// outside transactions; `Transaction` derefs to `Connection`).
// ----------------------------------------------------------------------

pub(crate) fn get_task_conn(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"),
            [id],
            task_from_row,
        )
        .optional()?;
    Ok(task)
}

pub(crate) fn labels_for_task_conn(conn: &Connection, task_id: i64) -> Result<Vec<Label>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.name, l.color, l.icon
         FROM task_labels tl
         JOIN labels l ON l.id = tl.label_id
         WHERE tl.task_id = ?
         ORDER BY l.id",
    )?;
    let labels = stmt
        .query_map([task_id], label_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(labels)
}

pub(crate) fn label_ids_for_task_conn(conn: &Connection, task_id: i64) -> Result<Vec<i64>> {
    let mut stmt =
        conn.prepare("SELECT label_id FROM task_labels WHERE task_id = ? ORDER BY label_id")?;
    let ids = stmt
        .query_map([task_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Insert a task row plus its label associations. No log rows; callers
/// decide which log entry the creation gets.
pub(crate) fn insert_task_conn(
    conn: &Connection,
    new: &NewTask,
    now: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO tasks (
            list_id, title, description, priority, due_date, deadline,
            is_completed, is_recurring, recurring_rule, parent_id,
            estimate_minutes, energy_level, context, is_habit,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            new.list_id,
            new.title,
            new.description,
            new.priority.as_str(),
            new.due_date.map(|t| t.to_rfc3339()),
            new.deadline.map(|t| t.to_rfc3339()),
            new.is_recurring,
            new.recurring_rule,
            new.parent_id,
            new.estimate_minutes,
            new.energy_level.map(EnergyLevel::as_str),
            new.context.map(TaskContext::as_str),
            new.is_habit,
            now.to_rfc3339(),
            now.to_rfc3339(),
        ],
    )?;
    let id = conn.last_insert_rowid();

    for label_id in &new.label_ids {
        conn.execute(
            "INSERT OR IGNORE INTO task_labels (task_id, label_id) VALUES (?, ?)",
            rusqlite::params![id, label_id],
        )?;
    }

    Ok(id)
}

pub(crate) fn stats_conn(conn: &Connection) -> Result<UserStats> {
    let stats = conn.query_row(
        "SELECT xp, level, current_streak, longest_streak, last_login
         FROM user_stats WHERE id = 1",
        [],
        |row| {
            Ok(UserStats {
                xp: row.get(0)?,
                level: row.get(1)?,
                current_streak: row.get(2)?,
                longest_streak: row.get(3)?,
                last_login: row
                    .get::<_, Option<String>>(4)?
                    .as_deref()
                    .map(parse_datetime),
            })
        },
    )?;
    Ok(stats)
}

// ----------------------------------------------------------------------
// Row mapping
// ----------------------------------------------------------------------

fn task_from_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        list_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        priority: row
            .get::<_, Option<String>>(4)?
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
        due_date: row
            .get::<_, Option<String>>(5)?
            .as_deref()
            .map(parse_datetime),
        deadline: row
            .get::<_, Option<String>>(6)?
            .as_deref()
            .map(parse_datetime),
        is_completed: row.get::<_, i64>(7)? != 0,
        completed_at: row
            .get::<_, Option<String>>(8)?
            .as_deref()
            .map(parse_datetime),
        is_recurring: row.get::<_, i64>(9)? != 0,
        recurring_rule: row.get(10)?,
        parent_id: row.get(11)?,
        estimate_minutes: row.get(12)?,
        actual_minutes: row.get(13)?,
        energy_level: row
            .get::<_, Option<String>>(14)?
            .as_deref()
            .and_then(|s| s.parse().ok()),
        context: row
            .get::<_, Option<String>>(15)?
            .as_deref()
            .and_then(|s| s.parse().ok()),
        is_habit: row.get::<_, i64>(16)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(17)?),
        updated_at: parse_datetime(&row.get::<_, String>(18)?),
    })
}

fn list_from_row(row: &rusqlite::Row) -> rusqlite::Result<List> {
    Ok(List {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
        slug: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn label_from_row(row: &rusqlite::Row) -> rusqlite::Result<Label> {
    Ok(Label {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
    })
}

fn reminder_from_row(row: &rusqlite::Row) -> rusqlite::Result<Reminder> {
    Ok(Reminder {
        id: row.get(0)?,
        task_id: row.get(1)?,
        remind_at: parse_datetime(&row.get::<_, String>(2)?),
        is_sent: row.get::<_, i64>(3)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn template_from_row(row: &rusqlite::Row) -> rusqlite::Result<Template> {
    Ok(Template {
        id: row.get(0)?,
        name: row.get(1)?,
        content: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?),
        updated_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn task_ref_from_row(row: &rusqlite::Row) -> rusqlite::Result<TaskRef> {
    Ok(TaskRef {
        id: row.get(0)?,
        title: row.get(1)?,
        is_completed: row.get::<_, i64>(2)? != 0,
    })
}

fn parse_condition_type(s: &str) -> crate::model::ConditionType {
    s.parse().unwrap_or(crate::model::ConditionType::CountTotal)
}

pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }

    // CURRENT_TIMESTAMP defaults come back in this format.
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Utc.from_utc_datetime(&naive);
    }

    Utc::now()
}

/// Start of the local calendar day containing `now`, in UTC.
pub(crate) fn local_day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let local_day = now.with_timezone(&Local).date_naive();
    Local
        .from_local_datetime(&local_day.and_hms_opt(0, 0, 0).expect("valid midnight"))
        .earliest()
        .map_or_else(
            || {
                // DST gap at midnight; fall back to the UTC day start.
                Utc.from_utc_datetime(
                    &now.date_naive().and_hms_opt(0, 0, 0).expect("valid midnight"),
                )
            },
            |dt| dt.with_timezone(&Utc),
        )
}

/// End (exclusive) of the local calendar day containing `now`, in UTC.
pub(crate) fn local_day_end(now: DateTime<Utc>) -> DateTime<Utc> {
    local_day_start(now) + chrono::Duration::days(1)
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
