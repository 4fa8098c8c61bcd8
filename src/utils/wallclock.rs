//! Wall-clock time string parsing

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveTime};

/// Seconds in one day, used when rolling a clock time forward to tomorrow.
pub const SECS_PER_DAY: i64 = 86_400;

/// Resolve a 24-hour `HH:MM` string to the unix timestamp of that wall-clock
/// time today, local time.
///
/// The result may lie in the past; callers that need "the next occurrence of
/// that clock time" roll it forward by [`SECS_PER_DAY`] themselves.
pub fn clock_time_today(s: &str, now: DateTime<Local>) -> Result<i64> {
    let time = NaiveTime::parse_from_str(s, "%H:%M")
        .with_context(|| format!("invalid clock time {:?}, expected HH:MM", s))?;

    let local = now
        .date_naive()
        .and_time(time)
        .and_local_timezone(Local)
        .earliest()
        .with_context(|| format!("clock time {:?} does not exist today in the local timezone", s))?;

    Ok(local.timestamp())
}
