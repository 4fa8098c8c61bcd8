//! Talk schedule resolution
//!
//! Reconciles the three optional configuration inputs (duration, start time,
//! end time) into a single `(intended start, duration)` pair at startup.

use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::warn;

use crate::utils::wallclock::{clock_time_today, SECS_PER_DAY};

/// Resolved talk schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Unix timestamp the talk is meant to begin at, if one was configured
    pub intended_start: Option<i64>,
    /// Configured talk length in seconds; zero means unbounded
    pub duration: u64,
}

impl Schedule {
    /// Resolve up to three configuration inputs into a consistent schedule.
    ///
    /// Start and end strings are interpreted as the next occurrence of that
    /// clock time. When both are given, the span between them becomes the
    /// duration, rolling the end past midnight for overnight talks. An end
    /// time plus a duration derives the start. Giving all three is a
    /// configuration conflict: the explicit duration is ignored with a
    /// warning.
    pub fn resolve(
        duration_secs: u64,
        start_time_str: Option<&str>,
        end_time_str: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<Self> {
        let mut duration = duration_secs as i64;
        if start_time_str.is_some() && end_time_str.is_some() && duration > 0 {
            warn!("start time, end time, and duration are all set; ignoring duration");
            duration = 0;
        }

        let start = start_time_str
            .map(|s| next_occurrence(s, now))
            .transpose()?;
        let end = end_time_str.map(|s| next_occurrence(s, now)).transpose()?;

        let (intended_start, duration) = match (start, end) {
            (Some(start), Some(mut end)) => {
                // Overnight talk: the end clock time belongs to the next day
                if start >= end {
                    end += SECS_PER_DAY;
                }
                (Some(start), end - start)
            }
            (None, Some(end)) if duration > 0 => (Some(end - duration), duration),
            (start, _) => (start, duration),
        };

        Ok(Self {
            intended_start,
            duration: duration.max(0) as u64,
        })
    }
}

/// Next occurrence of the given `HH:MM` clock time: today, or tomorrow if
/// that time has already passed.
fn next_occurrence(s: &str, now: DateTime<Local>) -> Result<i64> {
    let mut ts = clock_time_today(s, now)?;
    if ts < now.timestamp() {
        ts += SECS_PER_DAY;
    }
    Ok(ts)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    fn today_at(hour: u32, min: u32) -> i64 {
        Local
            .with_ymd_and_hms(2026, 6, 15, hour, min, 0)
            .unwrap()
            .timestamp()
    }

    #[test]
    fn test_duration_only_has_no_scheduled_start() {
        let schedule = Schedule::resolve(3600, None, None, noon()).unwrap();
        assert_eq!(schedule.intended_start, None);
        assert_eq!(schedule.duration, 3600);
    }

    #[test]
    fn test_start_and_end_span_becomes_duration() {
        let schedule = Schedule::resolve(0, Some("14:00"), Some("15:30"), noon()).unwrap();
        assert_eq!(schedule.intended_start, Some(today_at(14, 0)));
        assert_eq!(schedule.duration, 90 * 60);
    }

    #[test]
    fn test_end_before_start_rolls_over_midnight() {
        let schedule = Schedule::resolve(0, Some("14:00"), Some("13:00"), noon()).unwrap();
        assert_eq!(schedule.intended_start, Some(today_at(14, 0)));
        assert_eq!(schedule.duration, 23 * 3600);
    }

    #[test]
    fn test_past_start_time_rolls_forward_a_day() {
        let schedule = Schedule::resolve(0, Some("09:00"), None, noon()).unwrap();
        assert_eq!(schedule.intended_start, Some(today_at(9, 0) + SECS_PER_DAY));
        assert_eq!(schedule.duration, 0);
    }

    #[test]
    fn test_end_plus_duration_derives_start() {
        let schedule = Schedule::resolve(1800, None, Some("15:00"), noon()).unwrap();
        assert_eq!(schedule.intended_start, Some(today_at(14, 30)));
        assert_eq!(schedule.duration, 1800);
    }

    #[test]
    fn test_over_specified_duration_is_ignored() {
        let schedule = Schedule::resolve(600, Some("14:00"), Some("15:00"), noon()).unwrap();
        assert_eq!(schedule.intended_start, Some(today_at(14, 0)));
        assert_eq!(schedule.duration, 3600);
    }

    #[test]
    fn test_end_alone_without_duration_yields_no_schedule() {
        let schedule = Schedule::resolve(0, None, Some("15:00"), noon()).unwrap();
        assert_eq!(schedule.intended_start, None);
        assert_eq!(schedule.duration, 0);
    }

    #[test]
    fn test_malformed_time_string_is_an_error() {
        assert!(Schedule::resolve(0, Some("half past two"), None, noon()).is_err());
    }
}
