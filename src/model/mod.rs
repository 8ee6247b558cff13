//! Domain types for `stride`.
//!
//! Everything the storage layer persists and the engine operates on:
//! tasks and their enums, lists, labels, reminders, activity log rows,
//! dependencies, templates and the gamification records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task priority. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Extra XP awarded on completion, on top of the base award.
    #[must_use]
    pub const fn xp_bonus(self) -> i64 {
        match self {
            Self::None | Self::Low => 0,
            Self::Medium => 5,
            Self::High => 10,
        }
    }
}

impl FromStr for Priority {
    type Err = crate::StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(crate::StrideError::InvalidValue {
                field: "priority",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Energy needed for a task. Optional metadata used for planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    High,
    Medium,
    Low,
}

impl EnergyLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for EnergyLevel {
    type Err = crate::StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(crate::StrideError::InvalidValue {
                field: "energy_level",
                value: other.to_string(),
            }),
        }
    }
}

/// GTD-style execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskContext {
    Computer,
    Phone,
    Errands,
    Meeting,
    Home,
    Anywhere,
}

impl TaskContext {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Computer => "computer",
            Self::Phone => "phone",
            Self::Errands => "errands",
            Self::Meeting => "meeting",
            Self::Home => "home",
            Self::Anywhere => "anywhere",
        }
    }
}

impl FromStr for TaskContext {
    type Err = crate::StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "computer" => Ok(Self::Computer),
            "phone" => Ok(Self::Phone),
            "errands" => Ok(Self::Errands),
            "meeting" => Ok(Self::Meeting),
            "home" => Ok(Self::Home),
            "anywhere" => Ok(Self::Anywhere),
            other => Err(crate::StrideError::InvalidValue {
                field: "context",
                value: other.to_string(),
            }),
        }
    }
}

/// Action tag for an activity log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    Created,
    Updated,
    Completed,
    Uncompleted,
    SubtaskCreated,
    DependencyAdded,
    DependencyRemoved,
    BlockerCompleted,
    ReminderAdded,
    ReminderRemoved,
    AchievementUnlocked,
}

impl LogAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Completed => "completed",
            Self::Uncompleted => "uncompleted",
            Self::SubtaskCreated => "subtask_created",
            Self::DependencyAdded => "dependency_added",
            Self::DependencyRemoved => "dependency_removed",
            Self::BlockerCompleted => "blocker_completed",
            Self::ReminderAdded => "reminder_added",
            Self::ReminderRemoved => "reminder_removed",
            Self::AchievementUnlocked => "achievement_unlocked",
        }
    }
}

impl FromStr for LogAction {
    type Err = crate::StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "completed" => Ok(Self::Completed),
            "uncompleted" => Ok(Self::Uncompleted),
            "subtask_created" => Ok(Self::SubtaskCreated),
            "dependency_added" => Ok(Self::DependencyAdded),
            "dependency_removed" => Ok(Self::DependencyRemoved),
            "blocker_completed" => Ok(Self::BlockerCompleted),
            "reminder_added" => Ok(Self::ReminderAdded),
            "reminder_removed" => Ok(Self::ReminderRemoved),
            "achievement_unlocked" => Ok(Self::AchievementUnlocked),
            other => Err(crate::StrideError::InvalidValue {
                field: "action",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task row.
///
/// Invariants (enforced by schema CHECKs and the engine):
/// - `completed_at` is non-null iff `is_completed` is true
/// - `is_habit` implies `is_recurring`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub list_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    /// Hard cutoff, distinct from the (softer) due date.
    pub deadline: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_recurring: bool,
    pub recurring_rule: Option<String>,
    pub parent_id: Option<i64>,
    pub estimate_minutes: Option<i64>,
    pub actual_minutes: Option<i64>,
    pub energy_level: Option<EnergyLevel>,
    pub context: Option<TaskContext>,
    pub is_habit: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task. Structured fields only; free-text parsing
/// happens upstream in the CLI layer.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub list_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub is_recurring: bool,
    pub recurring_rule: Option<String>,
    pub parent_id: Option<i64>,
    pub estimate_minutes: Option<i64>,
    pub energy_level: Option<EnergyLevel>,
    pub context: Option<TaskContext>,
    pub is_habit: bool,
    pub label_ids: Vec<i64>,
}

impl NewTask {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update for a task. `None` means "leave unchanged"; the inner
/// `Option` on nullable fields distinguishes "set to value" from "clear".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub list_id: Option<Option<i64>>,
    pub is_recurring: Option<bool>,
    pub recurring_rule: Option<Option<String>>,
    pub estimate_minutes: Option<Option<i64>>,
    pub actual_minutes: Option<Option<i64>>,
    pub energy_level: Option<Option<EnergyLevel>>,
    pub context: Option<Option<TaskContext>>,
    pub is_habit: Option<bool>,
    pub label_ids: Option<Vec<i64>>,
}

impl TaskPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.deadline.is_none()
            && self.list_id.is_none()
            && self.is_recurring.is_none()
            && self.recurring_rule.is_none()
            && self.estimate_minutes.is_none()
            && self.actual_minutes.is_none()
            && self.energy_level.is_none()
            && self.context.is_none()
            && self.is_habit.is_none()
            && self.label_ids.is_none()
    }
}

/// A task list. Deleting a list cascades to its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A label, many-to-many with tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
}

/// A reminder attached to a task. Delivery is out of scope; the record and
/// its add/remove logging are not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub task_id: i64,
    pub remind_at: DateTime<Utc>,
    pub is_sent: bool,
    pub created_at: DateTime<Utc>,
}

/// An append-only activity log row. `task_id` is null for system-level
/// entries (achievement unlocks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLog {
    pub id: i64,
    pub task_id: Option<i64>,
    pub action: LogAction,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stored task-tree template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    pub name: String,
    /// Serialized [`crate::engine::template::TemplateNode`] array; validated
    /// at instantiation time, not at storage time.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The singleton gamification record. Always row id 1; lazily created on
/// first access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub xp: i64,
    pub level: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_login: Option<DateTime<Utc>>,
}

/// Achievement condition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    /// Total completed tasks, all time.
    CountTotal,
    /// Tasks completed today (local day bounds).
    CountDaily,
    /// Current streak length in days.
    Streak,
}

impl FromStr for ConditionType {
    type Err = crate::StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count_total" => Ok(Self::CountTotal),
            "count_daily" => Ok(Self::CountDaily),
            "streak" => Ok(Self::Streak),
            other => Err(crate::StrideError::InvalidValue {
                field: "condition_type",
                value: other.to_string(),
            }),
        }
    }
}

impl ConditionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CountTotal => "count_total",
            Self::CountDaily => "count_daily",
            Self::Streak => "streak",
        }
    }
}

/// One entry of the achievement catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub condition_type: ConditionType,
    pub condition_value: i64,
    pub xp_reward: i64,
    /// Set when the achievement has been unlocked.
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Result of an XP-earning event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAward {
    pub new_xp: i64,
    pub new_level: i64,
    pub leveled_up: bool,
}

/// Minimal task reference used when listing blockers/dependents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
}

/// A task with its owned child collections fully materialized, so consumers
/// never need a second call to complete the object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub labels: Vec<Label>,
    pub reminders: Vec<Reminder>,
    pub blockers: Vec<TaskRef>,
}

/// Date-window filter tag for task listing. Exactly one applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateWindow {
    Today,
    Upcoming,
    Next7Days,
    #[default]
    All,
}

impl FromStr for DateWindow {
    type Err = crate::StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "upcoming" => Ok(Self::Upcoming),
            "next-7-days" => Ok(Self::Next7Days),
            "all" => Ok(Self::All),
            other => Err(crate::StrideError::InvalidValue {
                field: "window",
                value: other.to_string(),
            }),
        }
    }
}

/// Filter options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    pub list_id: Option<i64>,
    pub label_id: Option<i64>,
    pub window: DateWindow,
    pub include_completed: bool,
}
