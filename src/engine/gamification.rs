//! XP, levels and achievement evaluation.
//!
//! A single user profile accumulates experience points; the level is derived
//! from XP by a fixed curve. Every XP-earning event re-evaluates the
//! achievement catalog. An achievement reward grants XP too, so evaluation
//! iterates to a fixed point instead of recursing; the `user_achievements`
//! primary key guarantees each achievement is applied at most once, which
//! bounds the loop by the catalog size.

use crate::error::Result;
use crate::model::{ConditionType, LogAction, XpAward};
use crate::storage::sqlite::{local_day_end, local_day_start, stats_conn};
use crate::storage::MutationContext;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::debug;

/// Hard bound on evaluation passes. Natural termination comes from the
/// at-most-once unlock guard; the cap only protects against catalog bugs.
const MAX_EVAL_PASSES: u32 = 8;

/// Base XP for completing any task; priority adds its own bonus.
pub const COMPLETION_BASE_XP: i64 = 10;

/// Level for a given XP total. Level `L` requires cumulative XP of
/// `50 * L * (L - 1)`: level 1 at 0, 2 at 100, 3 at 300, 4 at 600, ...
/// Monotonic and deterministic by construction.
#[must_use]
pub fn level_for_xp(xp: i64) -> i64 {
    let mut level = 1;
    while xp >= 50 * (level + 1) * level {
        level += 1;
    }
    level
}

/// XP still needed to reach the next level.
#[must_use]
pub fn xp_to_next_level(xp: i64) -> i64 {
    let level = level_for_xp(xp);
    50 * (level + 1) * level - xp
}

fn ensure_stats_row(conn: &Connection) -> Result<()> {
    conn.execute("INSERT OR IGNORE INTO user_stats (id) VALUES (1)", [])?;
    Ok(())
}

fn write_xp(conn: &Connection, new_xp: i64) -> Result<()> {
    conn.execute(
        "UPDATE user_stats SET xp = ?, level = ? WHERE id = 1",
        rusqlite::params![new_xp, level_for_xp(new_xp)],
    )?;
    Ok(())
}

/// Award `amount` XP (must be positive; the orchestrator validates) and run
/// achievement evaluation. Returns the final totals after any achievement
/// rewards earned in the same pass.
pub(crate) fn add_xp(
    conn: &Connection,
    ctx: &mut MutationContext,
    amount: i64,
    now: DateTime<Utc>,
) -> Result<XpAward> {
    debug_assert!(amount > 0, "XP earn events must be positive");

    ensure_stats_row(conn)?;
    let before = stats_conn(conn)?;
    write_xp(conn, before.xp + amount)?;

    check_achievements(conn, ctx, now)?;

    let after = stats_conn(conn)?;
    Ok(XpAward {
        new_xp: after.xp,
        new_level: after.level,
        leveled_up: after.level > before.level,
    })
}

/// Evaluate every locked achievement against fresh aggregates, unlocking and
/// rewarding the ones whose condition is met. Repeats until a pass unlocks
/// nothing (a reward can push a later condition over its threshold only via
/// streak/count changes, but the fixed point is cheap to compute either way).
pub(crate) fn check_achievements(
    conn: &Connection,
    ctx: &mut MutationContext,
    now: DateTime<Utc>,
) -> Result<()> {
    ensure_stats_row(conn)?;

    for _pass in 0..MAX_EVAL_PASSES {
        let total = completed_total(conn)?;
        let today = completed_today(conn, now)?;
        let streak = stats_conn(conn)?.current_streak;

        let mut unlocked_any = false;
        for (id, name, condition_type, condition_value, xp_reward) in locked_achievements(conn)? {
            let met = match condition_type {
                ConditionType::CountTotal => total >= condition_value,
                ConditionType::CountDaily => today >= condition_value,
                ConditionType::Streak => streak >= condition_value,
            };
            if !met {
                continue;
            }

            // The insert is the idempotency guard: zero rows changed means a
            // concurrent or earlier evaluation already unlocked it.
            let changed = conn.execute(
                "INSERT OR IGNORE INTO user_achievements (achievement_id, unlocked_at)
                 VALUES (?, ?)",
                rusqlite::params![id, now.to_rfc3339()],
            )?;
            if changed == 0 {
                continue;
            }

            debug!(achievement = %id, reward = xp_reward, "achievement unlocked");
            let stats = stats_conn(conn)?;
            write_xp(conn, stats.xp + xp_reward)?;
            ctx.log(
                None,
                LogAction::AchievementUnlocked,
                Some(format!("Achievement unlocked: {name} (+{xp_reward} XP)")),
            );
            unlocked_any = true;
        }

        if !unlocked_any {
            break;
        }
    }

    Ok(())
}

fn completed_total(conn: &Connection) -> Result<i64> {
    let count = conn.query_row(
        "SELECT count(*) FROM tasks WHERE is_completed = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn completed_today(conn: &Connection, now: DateTime<Utc>) -> Result<i64> {
    let start = local_day_start(now).to_rfc3339();
    let end = local_day_end(now).to_rfc3339();
    let count = conn.query_row(
        "SELECT count(*) FROM tasks
         WHERE is_completed = 1 AND completed_at >= ? AND completed_at < ?",
        rusqlite::params![start, end],
        |row| row.get(0),
    )?;
    Ok(count)
}

type LockedAchievement = (String, String, ConditionType, i64, i64);

fn locked_achievements(conn: &Connection) -> Result<Vec<LockedAchievement>> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.name, a.condition_type, a.condition_value, a.xp_reward
         FROM achievements a
         WHERE a.id NOT IN (SELECT achievement_id FROM user_achievements)
         ORDER BY a.condition_value",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .map(|(id, name, ct, value, reward)| {
            let condition_type = ct.parse().unwrap_or(ConditionType::CountTotal);
            (id, name, condition_type, value, reward)
        })
        .collect())
}
