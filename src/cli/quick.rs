//! Quick-add parsing: free text to a structured task payload.
//!
//! This is presentation-layer sugar sitting upstream of the engine, which
//! only ever accepts structured fields. Syntax:
//!
//! - `!high` / `!medium` / `!low` sets priority
//! - `@computer`, `@errands`, ... sets context
//! - `#name` collects label names (resolved to ids by the caller)
//! - `today`, `tomorrow`, `next week`, `in N days` sets the due date
//!
//! Example: `Buy milk tomorrow !high @errands #shopping`

use crate::model::{Priority, TaskContext};
use crate::storage::sqlite::local_day_start;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Parsed quick-add fields. Label names are unresolved; the caller matches
/// them against existing labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickAdd {
    pub title: String,
    pub priority: Option<Priority>,
    pub context: Option<TaskContext>,
    pub due_date: Option<DateTime<Utc>>,
    pub label_names: Vec<String>,
}

static PRIORITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)!\b(high|medium|low)\b").expect("valid regex"));
static CONTEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)@(computer|phone|errands|meeting|home|anywhere)\b").expect("valid regex")
});
static LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#([\w-]+)").expect("valid regex"));
static IN_DAYS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bin (\d+) days?\b").expect("valid regex"));
static TODAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\btoday\b").expect("valid regex"));
static TOMORROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btomorrow\b").expect("valid regex"));
static NEXT_WEEK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bnext week\b").expect("valid regex"));

/// Parse a quick-add line relative to `now`. Unrecognized text stays in the
/// title; recognized tokens are stripped from it.
#[must_use]
pub fn parse(input: &str, now: DateTime<Utc>) -> QuickAdd {
    let mut text = input.to_string();
    let mut parsed = QuickAdd::default();

    if let Some(caps) = PRIORITY_RE.captures(&text) {
        parsed.priority = caps[1].to_ascii_lowercase().parse().ok();
        let span = caps.get(0).expect("whole match").range();
        text.replace_range(span, "");
    }

    if let Some(caps) = CONTEXT_RE.captures(&text) {
        parsed.context = caps[1].to_ascii_lowercase().parse().ok();
        let span = caps.get(0).expect("whole match").range();
        text.replace_range(span, "");
    }

    while let Some(caps) = LABEL_RE.captures(&text) {
        parsed.label_names.push(caps[1].to_string());
        let span = caps.get(0).expect("whole match").range();
        text.replace_range(span, "");
    }

    let today = local_day_start(now);
    if let Some(caps) = IN_DAYS_RE.captures(&text) {
        if let Ok(days) = caps[1].parse::<i64>() {
            parsed.due_date = Some(today + Duration::days(days));
        }
        let span = caps.get(0).expect("whole match").range();
        text.replace_range(span, "");
    } else if let Some(m) = TODAY_RE.find(&text) {
        parsed.due_date = Some(today);
        text.replace_range(m.range(), "");
    } else if let Some(m) = TOMORROW_RE.find(&text) {
        parsed.due_date = Some(today + Duration::days(1));
        text.replace_range(m.range(), "");
    } else if let Some(m) = NEXT_WEEK_RE.find(&text) {
        parsed.due_date = Some(today + Duration::days(7));
        text.replace_range(m.range(), "");
    }

    parsed.title = text.split_whitespace().collect::<Vec<_>>().join(" ");
    parsed
}
