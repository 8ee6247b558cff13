//! Task lifecycle orchestration.
//!
//! [`TaskEngine`] is the write boundary of the crate: every user action runs
//! as one transaction composing the submodules below. Reads go through the
//! storage layer directly.
//!
//! # Submodules
//!
//! - [`activity`] - Field-level diffing for the activity log
//! - [`deps`] - Dependency graph maintenance and blocker signals
//! - [`gamification`] - XP, levels, achievement evaluation
//! - [`habits`] - Habit completion records and streaks
//! - [`recurrence`] - Recurrence rules and next-occurrence computation
//! - [`smart_tags`] - Metadata suggestion seam
//! - [`template`] - Template tree parsing and placeholder substitution

pub mod activity;
pub mod deps;
pub mod gamification;
pub mod habits;
pub mod recurrence;
pub mod smart_tags;
pub mod template;

pub use smart_tags::{KeywordSuggester, MetadataSuggester, NoSuggestions, Suggestion};

use crate::error::{Result, StrideError};
use crate::model::{
    LogAction, NewTask, Reminder, TaskPatch, TaskRef, TaskView, XpAward,
};
use crate::storage::{sqlite, SqliteStorage};
use chrono::{DateTime, Utc};
use template::TemplateNode;
use tracing::{debug, info, warn};

/// Result of a completion toggle.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub task: TaskView,
    /// XP award; present only on the completing edge.
    pub award: Option<XpAward>,
    /// The next occurrence created for a recurring task, if any.
    pub spawned: Option<TaskView>,
}

/// The task lifecycle orchestrator.
pub struct TaskEngine {
    storage: SqliteStorage,
    suggester: Box<dyn MetadataSuggester>,
}

impl TaskEngine {
    /// Build an engine with no metadata suggester.
    #[must_use]
    pub fn new(storage: SqliteStorage) -> Self {
        Self::with_suggester(storage, Box::new(NoSuggestions))
    }

    #[must_use]
    pub fn with_suggester(storage: SqliteStorage, suggester: Box<dyn MetadataSuggester>) -> Self {
        Self { storage, suggester }
    }

    /// Read-only storage access for queries.
    #[must_use]
    pub const fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Mutable storage access for list/label/template CRUD, which does not
    /// go through the lifecycle flows.
    pub fn storage_mut(&mut self) -> &mut SqliteStorage {
        &mut self.storage
    }

    // ------------------------------------------------------------------
    // Create / update / delete
    // ------------------------------------------------------------------

    /// Create a task. When the payload names neither list nor labels, the
    /// metadata suggester is consulted and its hints applied as defaults;
    /// explicit values always win and a suggester failure means no hints.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_task(&mut self, mut new: NewTask) -> Result<TaskView> {
        validate_habit_flag(&new)?;
        self.apply_suggestions(&mut new)?;

        let now = Utc::now();
        let id = self.storage.mutate("create_task", |tx, ctx| {
            let id = sqlite::insert_task_conn(tx, &new, now)?;
            ctx.log(Some(id), LogAction::Created, Some("Task created".to_string()));
            Ok(id)
        })?;

        info!(task = id, title = %new.title, "task created");
        self.view(id)
    }

    /// Create a subtask under `parent_id`: an ordinary task with a parent
    /// reference and no list. The log entry goes on the parent.
    ///
    /// # Errors
    ///
    /// Returns [`StrideError::TaskNotFound`] if the parent does not exist.
    pub fn create_subtask(&mut self, parent_id: i64, title: &str) -> Result<TaskView> {
        self.create_subtask_payload(parent_id, NewTask::new(title))
    }

    fn create_subtask_payload(&mut self, parent_id: i64, mut new: NewTask) -> Result<TaskView> {
        validate_habit_flag(&new)?;
        let parent = self
            .storage
            .get_task(parent_id)?
            .ok_or(StrideError::TaskNotFound { id: parent_id })?;

        new.parent_id = Some(parent.id);
        new.list_id = None;

        let now = Utc::now();
        let title = new.title.clone();
        let id = self.storage.mutate("create_subtask", |tx, ctx| {
            let id = sqlite::insert_task_conn(tx, &new, now)?;
            ctx.log(
                Some(parent.id),
                LogAction::SubtaskCreated,
                Some(format!("Subtask created: {title}")),
            );
            Ok(id)
        })?;

        self.view(id)
    }

    /// Apply a partial update. A missing task is a silent no-op (`None`), not
    /// an error: a vanished target from a double-click race is expected.
    ///
    /// # Errors
    ///
    /// Returns an error if the update itself fails.
    pub fn update_task(&mut self, id: i64, patch: TaskPatch) -> Result<Option<TaskView>> {
        let Some(previous) = self.storage.get_task(id)? else {
            debug!(task = id, "update on missing task ignored");
            return Ok(None);
        };

        if patch.is_empty() {
            return self.storage.get_task_view(id);
        }

        // Habit flag cannot outlive the recurrence flag.
        let is_habit = patch.is_habit.unwrap_or(previous.is_habit);
        let is_recurring = patch.is_recurring.unwrap_or(previous.is_recurring);
        if is_habit && !is_recurring {
            return Err(StrideError::InvalidValue {
                field: "is_habit",
                value: "a habit must be recurring".to_string(),
            });
        }

        let previous_label_ids = sqlite::label_ids_for_task_conn(self.storage.conn(), id)?;
        let now = Utc::now();

        self.storage.mutate("update_task", |tx, ctx| {
            apply_patch(tx, id, &patch, now)?;

            // Label replacement is wholesale, not a diff.
            if let Some(label_ids) = &patch.label_ids {
                tx.execute("DELETE FROM task_labels WHERE task_id = ?", [id])?;
                for label_id in label_ids {
                    tx.execute(
                        "INSERT OR IGNORE INTO task_labels (task_id, label_id) VALUES (?, ?)",
                        rusqlite::params![id, label_id],
                    )?;
                }
            }

            let lines = activity::diff_lines(&previous, &previous_label_ids, &patch);
            if !lines.is_empty() {
                ctx.log(Some(id), LogAction::Updated, Some(lines.join("\n")));
            }

            Ok(())
        })?;

        self.storage.get_task_view(id)
    }

    /// Delete a task. Cascades take its subtasks, logs, reminders, label
    /// associations and dependency edges; the historical log entries are
    /// gone with it, by design.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_task(&mut self, id: i64) -> Result<bool> {
        let deleted = self.storage.mutate("delete_task", |tx, _ctx| {
            let rows = tx.execute("DELETE FROM tasks WHERE id = ?", [id])?;
            Ok(rows > 0)
        })?;
        if deleted {
            info!(task = id, "task deleted");
        }
        Ok(deleted)
    }

    // ------------------------------------------------------------------
    // Completion
    // ------------------------------------------------------------------

    /// Toggle completion state. The completing edge runs the full composite
    /// flow in one transaction: recurrence expansion, state persist,
    /// completion log, habit streak update, blocker signals, XP award and
    /// achievement evaluation. The uncompleting edge only clears state and
    /// logs; no side effects fire.
    ///
    /// A missing task and a toggle to the current state are both silent
    /// no-ops.
    ///
    /// # Errors
    ///
    /// Returns an error if any step of the composite flow fails; the whole
    /// transaction rolls back in that case.
    pub fn toggle_completion(
        &mut self,
        id: i64,
        completed: bool,
    ) -> Result<Option<CompletionOutcome>> {
        let Some(task) = self.storage.get_task(id)? else {
            debug!(task = id, "toggle on missing task ignored");
            return Ok(None);
        };

        if task.is_completed == completed {
            let view = self.view(id)?;
            return Ok(Some(CompletionOutcome {
                task: view,
                award: None,
                spawned: None,
            }));
        }

        let now = Utc::now();
        let (award, spawned_id) = self.storage.mutate("toggle_completion", |tx, ctx| {
            if !completed {
                tx.execute(
                    "UPDATE tasks SET is_completed = 0, completed_at = NULL, updated_at = ?
                     WHERE id = ?",
                    rusqlite::params![now.to_rfc3339(), id],
                )?;
                ctx.log(
                    Some(id),
                    LogAction::Uncompleted,
                    Some(format!("Reopened: {}", task.title)),
                );
                return Ok((None, None));
            }

            // Recurrence expansion comes first; it shares the transaction
            // with the completion, so both land or neither does.
            let mut spawned = None;
            if task.is_recurring {
                if let Some(rule) = task
                    .recurring_rule
                    .as_deref()
                    .filter(|r| !r.trim().is_empty())
                {
                    if let Some(next_due) = recurrence::next_occurrence(rule, task.due_date, now) {
                        let clone = NewTask {
                            list_id: task.list_id,
                            title: task.title.clone(),
                            description: task.description.clone(),
                            priority: task.priority,
                            due_date: Some(next_due),
                            deadline: None,
                            is_recurring: true,
                            recurring_rule: task.recurring_rule.clone(),
                            parent_id: None,
                            estimate_minutes: task.estimate_minutes,
                            energy_level: task.energy_level,
                            context: task.context,
                            is_habit: task.is_habit,
                            label_ids: sqlite::label_ids_for_task_conn(tx, id)?,
                        };
                        let new_id = sqlite::insert_task_conn(tx, &clone, now)?;
                        ctx.log(
                            Some(new_id),
                            LogAction::Created,
                            Some("Task created".to_string()),
                        );
                        spawned = Some(new_id);
                    }
                }
            }

            tx.execute(
                "UPDATE tasks SET is_completed = 1, completed_at = ?, updated_at = ?
                 WHERE id = ?",
                rusqlite::params![now.to_rfc3339(), now.to_rfc3339(), id],
            )?;
            ctx.log(
                Some(id),
                LogAction::Completed,
                Some(format!("Completed: {}", task.title)),
            );

            if task.is_habit {
                habits::record_completion(tx, id, now)?;
            }

            // Runs after the completion persist so the remaining-blockers
            // query already counts this task as done.
            deps::signal_blocker_completed(tx, ctx, id, &task.title)?;

            let amount = gamification::COMPLETION_BASE_XP + task.priority.xp_bonus();
            let award = gamification::add_xp(tx, ctx, amount, now)?;

            Ok((Some(award), spawned))
        })?;

        let view = self.view(id)?;
        let spawned = spawned_id.map(|sid| self.view(sid)).transpose()?;

        if let Some(award) = &award {
            info!(
                task = id,
                xp = award.new_xp,
                level = award.new_level,
                "task completed"
            );
        }

        Ok(Some(CompletionOutcome {
            task: view,
            award,
            spawned,
        }))
    }

    // ------------------------------------------------------------------
    // Dependencies
    // ------------------------------------------------------------------

    /// Add "`task_id` is blocked by `blocker_id`". Returns `false` when the
    /// edge already exists.
    ///
    /// # Errors
    ///
    /// Returns [`StrideError::SelfDependency`] or
    /// [`StrideError::CircularDependency`] before any state change, or
    /// [`StrideError::TaskNotFound`] when either endpoint is missing.
    pub fn add_dependency(&mut self, task_id: i64, blocker_id: i64) -> Result<bool> {
        let now = Utc::now();
        self.storage.mutate("add_dependency", |tx, ctx| {
            deps::add_dependency(tx, ctx, task_id, blocker_id, now)
        })
    }

    /// Remove the edge if present; idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn remove_dependency(&mut self, task_id: i64, blocker_id: i64) -> Result<bool> {
        self.storage.mutate("remove_dependency", |tx, ctx| {
            deps::remove_dependency(tx, ctx, task_id, blocker_id)
        })
    }

    /// Tasks blocking `task_id`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn blockers(&self, task_id: i64) -> Result<Vec<TaskRef>> {
        self.storage.blockers_of(task_id)
    }

    /// Tasks blocked by `blocker_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn blocked_tasks(&self, blocker_id: i64) -> Result<Vec<TaskRef>> {
        self.storage.blocked_by(blocker_id)
    }

    // ------------------------------------------------------------------
    // Reminders
    // ------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`StrideError::TaskNotFound`] if the task does not exist.
    pub fn add_reminder(&mut self, task_id: i64, remind_at: DateTime<Utc>) -> Result<Reminder> {
        let task = self
            .storage
            .get_task(task_id)?
            .ok_or(StrideError::TaskNotFound { id: task_id })?;

        let now = Utc::now();
        let id = self.storage.mutate("add_reminder", |tx, ctx| {
            tx.execute(
                "INSERT INTO reminders (task_id, remind_at, is_sent, created_at)
                 VALUES (?, ?, 0, ?)",
                rusqlite::params![task.id, remind_at.to_rfc3339(), now.to_rfc3339()],
            )?;
            let id = tx.last_insert_rowid();
            ctx.log(
                Some(task.id),
                LogAction::ReminderAdded,
                Some(format!(
                    "Reminder set for {}",
                    remind_at.format("%Y-%m-%d %H:%M")
                )),
            );
            Ok(id)
        })?;

        self.storage
            .get_reminder(id)?
            .ok_or(StrideError::ReminderNotFound { id })
    }

    /// Remove a reminder; a missing reminder returns `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn remove_reminder(&mut self, reminder_id: i64) -> Result<bool> {
        let Some(reminder) = self.storage.get_reminder(reminder_id)? else {
            return Ok(false);
        };

        self.storage.mutate("remove_reminder", |tx, ctx| {
            let rows = tx.execute("DELETE FROM reminders WHERE id = ?", [reminder_id])?;
            if rows > 0 {
                ctx.log(
                    Some(reminder.task_id),
                    LogAction::ReminderRemoved,
                    Some("Reminder removed".to_string()),
                );
            }
            Ok(rows > 0)
        })
    }

    // ------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------

    /// Instantiate a stored template: substitute date placeholders, validate
    /// the tree, then create every task and nested subtask through the
    /// normal creation paths. The `list_id` override applies to top-level
    /// tasks only, never to subtasks.
    ///
    /// Returns the created top-level task views.
    ///
    /// # Errors
    ///
    /// Returns [`StrideError::TemplateNotFound`] or
    /// [`StrideError::InvalidTemplate`].
    pub fn instantiate_template(
        &mut self,
        template_id: i64,
        list_id: Option<i64>,
    ) -> Result<Vec<TaskView>> {
        let stored = self
            .storage
            .get_template(template_id)?
            .ok_or(StrideError::TemplateNotFound { id: template_id })?;

        let now = Utc::now();
        let nodes = template::parse_content(&stored.content, now)?;

        let mut created = Vec::with_capacity(nodes.len());
        for node in &nodes {
            created.push(self.create_node(node, list_id, None)?);
        }

        info!(
            template = template_id,
            tasks = created.len(),
            "template instantiated"
        );
        Ok(created)
    }

    fn create_node(
        &mut self,
        node: &TemplateNode,
        list_id: Option<i64>,
        parent_id: Option<i64>,
    ) -> Result<TaskView> {
        let new = NewTask {
            list_id: if parent_id.is_some() { None } else { list_id },
            title: node.title.clone(),
            description: node.description.clone(),
            priority: node.priority.unwrap_or_default(),
            due_date: node.due.as_deref().and_then(template::parse_due),
            label_ids: node.label_ids.clone(),
            ..NewTask::default()
        };

        let view = match parent_id {
            Some(parent) => self.create_subtask_payload(parent, new)?,
            None => self.create_task(new)?,
        };

        for child in &node.children {
            self.create_node(child, None, Some(view.task.id))?;
        }

        Ok(view)
    }

    // ------------------------------------------------------------------
    // Gamification reads
    // ------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn stats(&self) -> Result<crate::model::UserStats> {
        self.storage.get_or_init_stats()
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn achievements(&self) -> Result<Vec<crate::model::Achievement>> {
        self.storage.get_achievements()
    }

    // ------------------------------------------------------------------

    fn apply_suggestions(&mut self, new: &mut NewTask) -> Result<()> {
        let explicit = new.list_id.is_some() || !new.label_ids.is_empty();
        if explicit || new.parent_id.is_some() || new.title.trim().is_empty() {
            return Ok(());
        }

        let lists = self.storage.get_lists()?;
        let labels = self.storage.get_labels()?;
        let suggestion = self
            .suggester
            .suggest(&new.title, &lists, &labels)
            .unwrap_or_else(|err| {
                warn!(error = %err, "metadata suggester failed; continuing without hints");
                Suggestion::default()
            });

        new.list_id = suggestion.list_id;
        new.label_ids = suggestion.label_ids;
        Ok(())
    }

    fn view(&self, id: i64) -> Result<TaskView> {
        self.storage
            .get_task_view(id)?
            .ok_or(StrideError::TaskNotFound { id })
    }
}

fn validate_habit_flag(new: &NewTask) -> Result<()> {
    if new.is_habit && !new.is_recurring {
        return Err(StrideError::InvalidValue {
            field: "is_habit",
            value: "a habit must be recurring".to_string(),
        });
    }
    Ok(())
}

/// Build and run the UPDATE statement for the patched scalar columns.
fn apply_patch(
    conn: &rusqlite::Connection,
    id: i64,
    patch: &TaskPatch,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut set_clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    let mut set = |field: &str, value: Box<dyn rusqlite::ToSql>| {
        set_clauses.push(format!("{field} = ?"));
        params.push(value);
    };

    if let Some(title) = &patch.title {
        set("title", Box::new(title.clone()));
    }
    if let Some(description) = &patch.description {
        set("description", Box::new(description.clone()));
    }
    if let Some(priority) = patch.priority {
        set("priority", Box::new(priority.as_str().to_string()));
    }
    if let Some(due_date) = patch.due_date {
        set("due_date", Box::new(due_date.map(|d| d.to_rfc3339())));
    }
    if let Some(deadline) = patch.deadline {
        set("deadline", Box::new(deadline.map(|d| d.to_rfc3339())));
    }
    if let Some(list_id) = patch.list_id {
        set("list_id", Box::new(list_id));
    }
    if let Some(is_recurring) = patch.is_recurring {
        set("is_recurring", Box::new(is_recurring));
        // Dropping recurrence clears the rule unless the patch sets one.
        if !is_recurring && patch.recurring_rule.is_none() {
            set("recurring_rule", Box::new(None::<String>));
        }
    }
    if let Some(rule) = &patch.recurring_rule {
        set("recurring_rule", Box::new(rule.clone()));
    }
    if let Some(estimate) = patch.estimate_minutes {
        set("estimate_minutes", Box::new(estimate));
    }
    if let Some(actual) = patch.actual_minutes {
        set("actual_minutes", Box::new(actual));
    }
    if let Some(energy) = patch.energy_level {
        set(
            "energy_level",
            Box::new(energy.map(|e| e.as_str().to_string())),
        );
    }
    if let Some(context) = patch.context {
        set("context", Box::new(context.map(|c| c.as_str().to_string())));
    }
    if let Some(is_habit) = patch.is_habit {
        set("is_habit", Box::new(is_habit));
    }

    if set_clauses.is_empty() && patch.label_ids.is_none() {
        return Ok(());
    }

    set_clauses.push("updated_at = ?".to_string());
    params.push(Box::new(now.to_rfc3339()));

    let sql = format!("UPDATE tasks SET {} WHERE id = ?", set_clauses.join(", "));
    params.push(Box::new(id));

    let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
    conn.execute(&sql, params_refs.as_slice())?;

    Ok(())
}
