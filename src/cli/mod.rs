//! Command-line interface using clap.

pub mod commands;
pub mod quick;

use crate::error::{Result, StrideError};
use crate::model::{DateWindow, EnergyLevel, Priority, TaskContext};
use crate::storage::sqlite::local_day_start;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stride",
    version,
    about = "Personal task planner: lists, labels, recurring tasks, dependencies, XP"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit JSON on stdout instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv, ...)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write a JSON log file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a stride workspace in the current directory
    Init,
    /// Add a task
    Add(AddArgs),
    /// List tasks
    Ls(LsArgs),
    /// Show one task with details
    Show {
        id: i64,
    },
    /// Edit task fields
    Edit(EditArgs),
    /// Mark a task completed
    Done {
        id: i64,
    },
    /// Reopen a completed task
    Undone {
        id: i64,
    },
    /// Delete a task (subtasks, logs and reminders go with it)
    Rm {
        id: i64,
    },
    /// Add a subtask under a parent task
    Subtask {
        parent: i64,
        title: String,
    },
    /// Manage task lists
    #[command(subcommand)]
    Lists(ListsCommand),
    /// Manage labels
    #[command(subcommand)]
    Labels(LabelsCommand),
    /// Manage dependencies between tasks
    #[command(subcommand)]
    Dep(DepCommand),
    /// Manage reminders
    #[command(subcommand)]
    Remind(RemindCommand),
    /// Manage and instantiate task templates
    #[command(subcommand)]
    Template(TemplateCommand),
    /// Show XP, level, streaks, achievements and totals
    Stats,
    /// Show the activity log
    Activity(ActivityArgs),
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title. With --quick, inline tokens (!high, @errands, #label,
    /// today/tomorrow/next week) are parsed out of the text.
    #[arg(required = true)]
    pub title: Vec<String>,

    /// Target list (id or slug)
    #[arg(long)]
    pub list: Option<String>,

    /// Label name or id; repeatable
    #[arg(long = "label")]
    pub labels: Vec<String>,

    #[arg(long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// Due date (today, tomorrow, YYYY-MM-DD, RFC3339)
    #[arg(long)]
    pub due: Option<String>,

    /// Hard deadline, distinct from the due date
    #[arg(long)]
    pub deadline: Option<String>,

    /// Estimated minutes
    #[arg(long)]
    pub estimate: Option<i64>,

    #[arg(long, value_enum)]
    pub energy: Option<EnergyArg>,

    #[arg(long, value_enum)]
    pub context: Option<ContextArg>,

    /// Recurrence rule, e.g. FREQ=DAILY or FREQ=WEEKLY;INTERVAL=2
    #[arg(long, value_name = "RULE")]
    pub recur: Option<String>,

    /// Track this recurring task as a habit (streaks)
    #[arg(long, requires = "recur")]
    pub habit: bool,

    /// Description text
    #[arg(long)]
    pub describe: Option<String>,

    /// Parse quick-add tokens out of the title text
    #[arg(long)]
    pub quick: bool,
}

#[derive(Args)]
pub struct LsArgs {
    /// Filter by list (id or slug)
    #[arg(long)]
    pub list: Option<String>,

    /// Filter by label (name or id)
    #[arg(long)]
    pub label: Option<String>,

    /// Date window filter
    #[arg(long, value_enum, default_value_t = WindowArg::All)]
    pub window: WindowArg,

    /// Include completed tasks
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub describe: Option<String>,

    #[arg(long, value_enum)]
    pub priority: Option<PriorityArg>,

    #[arg(long, conflicts_with = "no_due")]
    pub due: Option<String>,

    /// Clear the due date
    #[arg(long)]
    pub no_due: bool,

    #[arg(long, conflicts_with = "no_deadline")]
    pub deadline: Option<String>,

    /// Clear the deadline
    #[arg(long)]
    pub no_deadline: bool,

    /// Move to a list (id or slug)
    #[arg(long, conflicts_with = "no_list")]
    pub list: Option<String>,

    /// Move to the inbox (no list)
    #[arg(long)]
    pub no_list: bool,

    /// Replace labels wholesale; repeatable
    #[arg(long = "label", conflicts_with = "clear_labels")]
    pub labels: Vec<String>,

    /// Remove all labels
    #[arg(long)]
    pub clear_labels: bool,

    /// Set a recurrence rule
    #[arg(long, value_name = "RULE", conflicts_with = "no_recur")]
    pub recur: Option<String>,

    /// Stop recurring
    #[arg(long)]
    pub no_recur: bool,

    #[arg(long)]
    pub estimate: Option<i64>,

    #[arg(long)]
    pub actual: Option<i64>,

    #[arg(long, value_enum)]
    pub energy: Option<EnergyArg>,

    #[arg(long, value_enum)]
    pub context: Option<ContextArg>,

    /// Mark as a habit (requires recurrence)
    #[arg(long, conflicts_with = "no_habit")]
    pub habit: bool,

    #[arg(long)]
    pub no_habit: bool,
}

#[derive(Subcommand)]
pub enum ListsCommand {
    /// Create a list
    Add {
        name: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Show all lists
    Ls,
    /// Edit a list
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a list and the tasks in it
    Rm {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum LabelsCommand {
    /// Create a label
    Add {
        name: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Show all labels
    Ls,
    /// Edit a label
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a label
    Rm {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum DepCommand {
    /// Mark TASK as blocked by BLOCKER
    Add {
        task: i64,
        blocker: i64,
    },
    /// Remove the blocked-by edge
    Rm {
        task: i64,
        blocker: i64,
    },
    /// Show blockers and blocked tasks for TASK
    Show {
        task: i64,
    },
}

#[derive(Subcommand)]
pub enum RemindCommand {
    /// Add a reminder to a task
    Add {
        task: i64,
        /// When to remind (today, tomorrow, YYYY-MM-DD, "YYYY-MM-DD HH:MM")
        when: String,
    },
    /// Remove a reminder by id
    Rm {
        id: i64,
    },
    /// Show reminders for a task
    Ls {
        task: i64,
    },
}

#[derive(Subcommand)]
pub enum TemplateCommand {
    /// Store a template from a JSON file or inline content
    Add {
        name: String,
        #[arg(long, conflicts_with = "content")]
        file: Option<PathBuf>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Show stored templates
    Ls,
    /// Delete a template
    Rm {
        id: i64,
    },
    /// Instantiate a template
    Apply {
        id: i64,
        /// Target list for top-level tasks (id or slug)
        #[arg(long)]
        list: Option<String>,
    },
}

#[derive(Args)]
pub struct ActivityArgs {
    /// Only entries for this task
    #[arg(long)]
    pub task: Option<i64>,

    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    None,
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::None => Self::None,
            PriorityArg::Low => Self::Low,
            PriorityArg::Medium => Self::Medium,
            PriorityArg::High => Self::High,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EnergyArg {
    High,
    Medium,
    Low,
}

impl From<EnergyArg> for EnergyLevel {
    fn from(value: EnergyArg) -> Self {
        match value {
            EnergyArg::High => Self::High,
            EnergyArg::Medium => Self::Medium,
            EnergyArg::Low => Self::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ContextArg {
    Computer,
    Phone,
    Errands,
    Meeting,
    Home,
    Anywhere,
}

impl From<ContextArg> for TaskContext {
    fn from(value: ContextArg) -> Self {
        match value {
            ContextArg::Computer => Self::Computer,
            ContextArg::Phone => Self::Phone,
            ContextArg::Errands => Self::Errands,
            ContextArg::Meeting => Self::Meeting,
            ContextArg::Home => Self::Home,
            ContextArg::Anywhere => Self::Anywhere,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WindowArg {
    Today,
    Upcoming,
    #[value(name = "next-7-days")]
    Next7Days,
    All,
}

impl From<WindowArg> for DateWindow {
    fn from(value: WindowArg) -> Self {
        match value {
            WindowArg::Today => Self::Today,
            WindowArg::Upcoming => Self::Upcoming,
            WindowArg::Next7Days => Self::Next7Days,
            WindowArg::All => Self::All,
        }
    }
}

impl std::fmt::Display for WindowArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Today => "today",
            Self::Upcoming => "upcoming",
            Self::Next7Days => "next-7-days",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

/// Parse a user-supplied point in time: `today`, `tomorrow`, `YYYY-MM-DD`,
/// `YYYY-MM-DD HH:MM` or RFC3339.
///
/// # Errors
///
/// Returns [`StrideError::InvalidValue`] for unrecognized input.
pub fn parse_when(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    let today = local_day_start(now);

    match trimmed.to_ascii_lowercase().as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "next-week" | "next week" => return Ok(today + Duration::days(7)),
        _ => {}
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("valid midnight")));
    }

    Err(StrideError::InvalidValue {
        field: "date",
        value: trimmed.to_string(),
    })
}
