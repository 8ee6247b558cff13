//! Habit completion records and streak computation.
//!
//! A habit is a recurring task flagged for streak tracking. Completing one
//! appends a `habit_completions` row; the current/longest streak counters on
//! the singleton stats row are recomputed from the completion dates in the
//! same transaction, before achievement evaluation reads them.

use crate::error::Result;
use crate::storage::sqlite::parse_datetime;
use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::Connection;

/// Record a habit completion and refresh the streak counters.
pub(crate) fn record_completion(
    conn: &Connection,
    task_id: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO habit_completions (task_id, completed_at) VALUES (?, ?)",
        rusqlite::params![task_id, now.to_rfc3339()],
    )?;

    let days = completion_days(conn)?;
    let today = now.with_timezone(&Local).date_naive();
    let (current, longest) = streaks(&days, today);

    conn.execute("INSERT OR IGNORE INTO user_stats (id) VALUES (1)", [])?;
    conn.execute(
        "UPDATE user_stats SET current_streak = ?,
            longest_streak = max(longest_streak, ?)
         WHERE id = 1",
        rusqlite::params![current, longest],
    )?;

    Ok(())
}

/// Distinct local calendar days with at least one habit completion,
/// ascending.
fn completion_days(conn: &Connection) -> Result<Vec<NaiveDate>> {
    let mut stmt =
        conn.prepare("SELECT completed_at FROM habit_completions ORDER BY completed_at")?;
    let mut days: Vec<NaiveDate> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .iter()
        .map(|s| parse_datetime(s).with_timezone(&Local).date_naive())
        .collect();
    days.dedup();
    Ok(days)
}

/// Compute (current, longest) streaks over sorted distinct days. The current
/// streak only counts if its last day is today or yesterday.
#[must_use]
pub fn streaks(days: &[NaiveDate], today: NaiveDate) -> (i64, i64) {
    if days.is_empty() {
        return (0, 0);
    }

    let mut longest = 1i64;
    let mut run = 1i64;
    let mut current = 0i64;

    for window in days.windows(2) {
        let gap = (window[1] - window[0]).num_days();
        if gap == 1 {
            run += 1;
        } else if gap > 1 {
            run = 1;
        }
        longest = longest.max(run);
    }

    let last = *days.last().expect("non-empty");
    if (today - last).num_days() <= 1 {
        current = run;
    }

    (current, longest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(streaks(&[], d(2026, 8, 6)), (0, 0));
    }

    #[test]
    fn consecutive_days_build_a_streak() {
        let days = [d(2026, 8, 4), d(2026, 8, 5), d(2026, 8, 6)];
        assert_eq!(streaks(&days, d(2026, 8, 6)), (3, 3));
    }

    #[test]
    fn gap_resets_current_but_keeps_longest() {
        let days = [
            d(2026, 7, 1),
            d(2026, 7, 2),
            d(2026, 7, 3),
            d(2026, 7, 4),
            d(2026, 8, 5),
            d(2026, 8, 6),
        ];
        assert_eq!(streaks(&days, d(2026, 8, 6)), (2, 4));
    }

    #[test]
    fn stale_last_completion_means_no_current_streak() {
        let days = [d(2026, 8, 1), d(2026, 8, 2)];
        assert_eq!(streaks(&days, d(2026, 8, 6)), (0, 2));
    }

    #[test]
    fn yesterday_still_counts_as_current() {
        let days = [d(2026, 8, 4), d(2026, 8, 5)];
        assert_eq!(streaks(&days, d(2026, 8, 6)), (2, 2));
    }

    #[test]
    fn record_completion_updates_stats() {
        let mut storage = crate::storage::SqliteStorage::open_memory().unwrap();
        storage
            .mutate("seed", |tx, _ctx| {
                tx.execute(
                    "INSERT INTO tasks (title, is_recurring, is_habit, recurring_rule)
                     VALUES ('run', 1, 1, 'FREQ=DAILY')",
                    [],
                )?;
                record_completion(tx, 1, Utc::now())
            })
            .unwrap();

        let stats = storage.get_or_init_stats().unwrap();
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
    }
}
