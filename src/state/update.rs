//! Timer change notifications

use serde::{Deserialize, Serialize};

use super::timer::TimerState;

/// Snapshot published on every tick and state-changing command.
///
/// This is the sole observable output of the timer; hosts watch it to
/// refresh whatever display they drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerUpdate {
    /// Elapsed talk time, clamped to zero while counting down to the start
    pub elapsed_seconds: u64,
    /// Operational state at the moment of emission
    pub state: TimerState,
    /// Display label in `[-]HH:MM:SS` form
    pub label: String,
}

impl TimerUpdate {
    pub fn new(elapsed_seconds: u64, state: TimerState, label: String) -> Self {
        Self {
            elapsed_seconds,
            state,
            label,
        }
    }
}

impl Default for TimerUpdate {
    fn default() -> Self {
        Self::new(0, TimerState::Stopped, format_label(0))
    }
}

/// Format a signed second count as `[-]HH:MM:SS`.
///
/// Minutes and seconds are always two digits; hours are zero-padded to two
/// digits but grow wider as needed.
pub fn format_label(time_in_secs: i64) -> String {
    let sign = if time_in_secs < 0 { "-" } else { "" };
    let total = time_in_secs.unsigned_abs();

    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        total / 3600,
        total / 60 % 60,
        total % 60
    )
}
