//! Recurrence rule parsing and next-occurrence computation.
//!
//! Rules are iCalendar-style strings (`FREQ=DAILY;INTERVAL=2`). Only the
//! subset the planner needs is supported: `FREQ` (required), `INTERVAL`
//! (default 1) and `UNTIL`. Unknown keys are ignored; anything unparseable
//! means "no next occurrence" so an invalid rule can never break the
//! completion flow.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::str::FromStr;
use tracing::debug;

/// Safety bound on catch-up stepping from a far-past anchor.
const MAX_STEPS: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A parsed recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    pub interval: u32,
    pub until: Option<DateTime<Utc>>,
}

impl FromStr for RecurrenceRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim().trim_start_matches("RRULE:");
        if body.is_empty() {
            return Err("empty rule".to_string());
        }

        let mut freq = None;
        let mut interval = 1u32;
        let mut until = None;

        for part in body.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let Some((key, value)) = part.split_once('=') else {
                return Err(format!("malformed component: {part}"));
            };
            match key.to_ascii_uppercase().as_str() {
                "FREQ" => {
                    freq = Some(match value.to_ascii_uppercase().as_str() {
                        "DAILY" => Frequency::Daily,
                        "WEEKLY" => Frequency::Weekly,
                        "MONTHLY" => Frequency::Monthly,
                        "YEARLY" => Frequency::Yearly,
                        other => return Err(format!("unsupported FREQ: {other}")),
                    });
                }
                "INTERVAL" => {
                    interval = value
                        .parse::<u32>()
                        .map_err(|_| format!("bad INTERVAL: {value}"))?;
                    if interval == 0 {
                        return Err("INTERVAL must be >= 1".to_string());
                    }
                }
                "UNTIL" => {
                    until = Some(parse_until(value)?);
                }
                // BYDAY, COUNT, ... are accepted but ignored.
                _ => {}
            }
        }

        let freq = freq.ok_or_else(|| "missing FREQ".to_string())?;
        Ok(Self {
            freq,
            interval,
            until,
        })
    }
}

fn parse_until(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%SZ") {
        return Ok(Utc.from_utc_datetime(&dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y%m%d") {
        // Date-only UNTIL is inclusive of that whole day.
        let end = date.and_hms_opt(23, 59, 59).expect("valid time");
        return Ok(Utc.from_utc_datetime(&end));
    }
    Err(format!("bad UNTIL: {value}"))
}

fn advance(t: DateTime<Utc>, freq: Frequency, interval: u32) -> Option<DateTime<Utc>> {
    match freq {
        Frequency::Daily => t.checked_add_signed(Duration::days(i64::from(interval))),
        Frequency::Weekly => t.checked_add_signed(Duration::days(7 * i64::from(interval))),
        Frequency::Monthly => t.checked_add_months(Months::new(interval)),
        Frequency::Yearly => t.checked_add_months(Months::new(interval * 12)),
    }
}

/// Compute the next occurrence of `rule` strictly after the anchor and no
/// earlier than `now` (`now` itself counts if a step lands on it exactly).
///
/// The anchor is the task's due date when present, otherwise `now`. Returns
/// `None` when the rule is invalid or the `UNTIL` bound is exhausted.
#[must_use]
pub fn next_occurrence(
    rule: &str,
    anchor: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let parsed = match rule.parse::<RecurrenceRule>() {
        Ok(parsed) => parsed,
        Err(reason) => {
            debug!(rule, reason, "unparseable recurrence rule; no expansion");
            return None;
        }
    };

    let start = anchor.unwrap_or(now);
    let mut candidate = advance(start, parsed.freq, parsed.interval)?;

    let mut steps = 0;
    while candidate < now {
        candidate = advance(candidate, parsed.freq, parsed.interval)?;
        steps += 1;
        if steps > MAX_STEPS {
            debug!(rule, "recurrence catch-up exceeded step bound");
            return None;
        }
    }

    if parsed.until.is_some_and(|until| candidate > until) {
        return None;
    }

    Some(candidate)
}
