//! Talk timer state machine
//!
//! Tracks elapsed or remaining talk time, supports a scheduled ("pretalk")
//! start, and publishes a formatted time label plus the operational state on
//! every tick and state-changing command.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

use super::schedule::Schedule;
use super::update::{format_label, TimerUpdate};

/// Display semantics; set by the host, never changed by internal logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Show the current wall-clock time
    Clock,
    /// Show time elapsed since the talk started
    CountUp,
    /// Show time remaining until the configured duration runs out
    CountDown,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clock" => Ok(Mode::Clock),
            "count-up" => Ok(Mode::CountUp),
            "count-down" => Ok(Mode::CountDown),
            _ => Err(format!(
                "unknown mode {:?}, expected clock, count-up, or count-down",
                s
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Clock => "clock",
            Mode::CountUp => "count-up",
            Mode::CountDown => "count-down",
        };
        write!(f, "{}", name)
    }
}

/// Operational state; transitions only happen through the command methods
/// and the automatic start on tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerState {
    /// No talk underway and no pending schedule
    Stopped,
    /// Waiting for a scheduled start; elapsed time counts up towards zero
    PreTalk,
    Running,
    Paused,
}

/// The talk timer. One instance per talk.
#[derive(Debug)]
pub struct Timer {
    /// Display mode, settable by the host at any time; takes effect on the
    /// next recompute
    pub mode: Mode,
    state: TimerState,
    /// When the talk is meant to begin, if a schedule was configured
    intended_start: Option<i64>,
    /// Configured talk length in seconds; zero means unbounded
    duration: u64,
    /// When Running actually began; adjusted on resume to preserve elapsed time
    start_time: i64,
    /// Current time, sampled once per tick or command
    now: i64,
    /// Seconds elapsed since the talk started; negative while in PreTalk
    running_time: i64,
    update_tx: watch::Sender<TimerUpdate>,
    /// Keep one receiver alive so emission never fails without subscribers
    _update_rx: watch::Receiver<TimerUpdate>,
}

impl Timer {
    /// Build a timer from the configured duration, start time, and end time.
    ///
    /// A resolved schedule puts the timer in [`TimerState::PreTalk`]; a
    /// positive resolved duration forces [`Mode::CountDown`] regardless of
    /// `default_mode`.
    pub fn new(
        duration: u64,
        start_time_str: Option<&str>,
        end_time_str: Option<&str>,
        default_mode: Mode,
    ) -> Result<Self> {
        Self::new_at(Local::now(), duration, start_time_str, end_time_str, default_mode)
    }

    fn new_at(
        now: DateTime<Local>,
        duration: u64,
        start_time_str: Option<&str>,
        end_time_str: Option<&str>,
        default_mode: Mode,
    ) -> Result<Self> {
        let schedule = Schedule::resolve(duration, start_time_str, end_time_str, now)?;

        let mode = if schedule.duration > 0 {
            Mode::CountDown
        } else {
            default_mode
        };
        let (state, start_time) = match schedule.intended_start {
            Some(at) => (TimerState::PreTalk, at),
            None => (TimerState::Stopped, 0),
        };

        let (update_tx, update_rx) = watch::channel(TimerUpdate::default());
        let mut timer = Self {
            mode,
            state,
            intended_start: schedule.intended_start,
            duration: schedule.duration,
            start_time,
            now: now.timestamp(),
            running_time: 0,
            update_tx,
            _update_rx: update_rx,
        };
        timer.recompute_and_emit();

        Ok(timer)
    }

    /// Begin the talk. Only meaningful from Stopped or PreTalk; a no-op in
    /// every other state.
    pub fn start(&mut self) {
        self.start_at(unix_now());
    }

    fn start_at(&mut self, now: i64) {
        self.now = now;
        if self.apply_start() {
            self.recompute_and_emit();
        }
    }

    /// Begin the talk, or resume it if paused. From Running this is a no-op.
    pub fn run(&mut self) {
        self.run_at(unix_now());
    }

    fn run_at(&mut self, now: i64) {
        self.now = now;
        match self.state {
            TimerState::Stopped | TimerState::PreTalk => {
                self.apply_start();
                self.recompute_and_emit();
            }
            TimerState::Running => {}
            TimerState::Paused => {
                // Shift the start so elapsed time is preserved across the pause
                self.start_time = now - self.running_time;
                self.state = TimerState::Running;
                self.recompute_and_emit();
            }
        }
    }

    /// Pause a running talk or resume a paused one. Returns whether the
    /// timer ends up paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.toggle_pause_at(unix_now())
    }

    fn toggle_pause_at(&mut self, now: i64) -> bool {
        self.now = now;
        match self.state {
            TimerState::Paused => self.run_at(now),
            TimerState::Running => {
                self.state = TimerState::Paused;
                self.recompute_and_emit();
            }
            _ => {}
        }
        self.is_paused()
    }

    /// Return to the pretalk countdown if the scheduled start is still
    /// ahead, or to Stopped if no schedule exists. Resetting during PreTalk,
    /// or once a scheduled start has already passed, is a no-op.
    pub fn reset(&mut self) {
        self.reset_at(unix_now());
    }

    fn reset_at(&mut self, now: i64) {
        self.now = now;
        if self.state == TimerState::PreTalk {
            return;
        }
        match self.intended_start {
            Some(at) if now < at => {
                self.state = TimerState::PreTalk;
                self.start_time = at;
                self.recompute_and_emit();
            }
            Some(_) => {}
            None => {
                self.state = TimerState::Stopped;
                self.recompute_and_emit();
            }
        }
    }

    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Once-per-second update, host-driven.
    ///
    /// Refreshes `now`, fires the automatic start once a scheduled start has
    /// been passed, and republishes the display while it is changing. In
    /// Stopped or Paused outside Clock mode the last published value stays
    /// valid, so nothing is emitted.
    pub fn tick(&mut self) {
        self.tick_at(unix_now());
    }

    fn tick_at(&mut self, now: i64) {
        self.now = now;
        if self.intended_start.is_some_and(|at| now >= at) {
            self.apply_start();
        }
        if self.mode == Mode::Clock
            || matches!(self.state, TimerState::PreTalk | TimerState::Running)
        {
            self.recompute_and_emit();
        }
    }

    /// Latest published snapshot.
    pub fn latest(&self) -> TimerUpdate {
        self.update_tx.borrow().clone()
    }

    /// Watch the stream of published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<TimerUpdate> {
        self.update_tx.subscribe()
    }

    /// Stopped/PreTalk -> Running transition shared by `start`, `run`, and
    /// the automatic start on tick. Returns whether a transition happened.
    fn apply_start(&mut self) -> bool {
        match self.state {
            TimerState::Stopped | TimerState::PreTalk => {
                self.start_time = self.now;
                self.state = TimerState::Running;
                true
            }
            _ => false,
        }
    }

    fn recompute_and_emit(&mut self) {
        self.running_time = match self.state {
            TimerState::PreTalk => self.now - self.intended_start.unwrap_or(self.now),
            TimerState::Running => self.now - self.start_time,
            TimerState::Stopped => 0,
            // Frozen; not recomputed until resume
            TimerState::Paused => self.running_time,
        };

        let time_in_secs = match self.mode {
            Mode::Clock => self.wall_clock_secs(),
            Mode::CountUp => self.running_time,
            Mode::CountDown => match self.state {
                // Negative countdown to the scheduled start
                TimerState::PreTalk => self.running_time,
                _ => self.duration as i64 - self.running_time,
            },
        };

        let update = TimerUpdate::new(
            self.running_time.max(0) as u64,
            self.state,
            format_label(time_in_secs),
        );
        if let Err(e) = self.update_tx.send(update) {
            warn!("Failed to send timer update: {}", e);
        }
    }

    /// Seconds since local midnight for `now`, used by Clock mode.
    fn wall_clock_secs(&self) -> i64 {
        Local
            .timestamp_opt(self.now, 0)
            .single()
            .map(|t| i64::from(t.hour() * 3600 + t.minute() * 60 + t.second()))
            .unwrap_or(0)
    }
}

fn unix_now() -> i64 {
    Local::now().timestamp()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    fn countdown_timer(duration: u64) -> Timer {
        Timer::new_at(noon(), duration, None, None, Mode::CountUp).unwrap()
    }

    #[test]
    fn test_duration_alone_forces_countdown_from_stopped() {
        let timer = countdown_timer(3600);
        assert_eq!(timer.mode, Mode::CountDown);
        assert_eq!(timer.state, TimerState::Stopped);
        // Full duration is on display before the first start
        assert_eq!(timer.latest().label, "01:00:00");
    }

    #[test]
    fn test_future_start_begins_in_pretalk() {
        let timer = Timer::new_at(noon(), 0, Some("14:00"), None, Mode::CountUp).unwrap();
        assert_eq!(timer.state, TimerState::PreTalk);
        let update = timer.latest();
        assert_eq!(update.state, TimerState::PreTalk);
        assert_eq!(update.label, "-02:00:00");
        assert_eq!(update.elapsed_seconds, 0);
    }

    #[test]
    fn test_past_start_rolls_forward_to_tomorrow() {
        let timer = Timer::new_at(noon(), 0, Some("09:00"), None, Mode::CountUp).unwrap();
        let expected = Local.with_ymd_and_hms(2026, 6, 16, 9, 0, 0).unwrap();
        assert_eq!(timer.intended_start, Some(expected.timestamp()));
        assert_eq!(timer.state, TimerState::PreTalk);
    }

    #[test]
    fn test_tick_is_silent_while_stopped() {
        let mut timer = Timer::new_at(noon(), 0, None, None, Mode::CountUp).unwrap();
        let mut rx = timer.subscribe();
        rx.borrow_and_update();

        timer.tick_at(noon().timestamp() + 5);

        assert_eq!(timer.running_time, 0);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_tick_is_silent_while_paused() {
        let t0 = noon().timestamp();
        let mut timer = countdown_timer(600);
        timer.start_at(t0);
        timer.tick_at(t0 + 30);
        timer.toggle_pause_at(t0 + 31);

        let mut rx = timer.subscribe();
        rx.borrow_and_update();
        timer.tick_at(t0 + 120);

        assert_eq!(timer.running_time, 30);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_clock_mode_ticks_even_while_stopped() {
        let mut timer = Timer::new_at(noon(), 0, None, None, Mode::Clock).unwrap();
        let mut rx = timer.subscribe();
        rx.borrow_and_update();

        timer.tick_at(noon().timestamp() + 5);

        assert!(rx.has_changed().unwrap());
        assert_eq!(timer.latest().label, "12:00:05");
    }

    #[test]
    fn test_pause_freezes_and_resume_preserves_elapsed_time() {
        let t0 = noon().timestamp();
        let mut timer = countdown_timer(600);
        timer.start_at(t0);
        timer.tick_at(t0 + 30);

        assert!(timer.toggle_pause_at(t0 + 31));
        let frozen = timer.running_time;
        timer.tick_at(t0 + 90);

        assert!(!timer.toggle_pause_at(t0 + 100));
        assert_eq!(timer.state, TimerState::Running);
        assert_eq!(timer.running_time, frozen);
        // Continuity: elapsed time measured from the shifted start matches
        assert_eq!((t0 + 100) - timer.start_time, timer.running_time);
    }

    #[test]
    fn test_toggle_pause_is_a_noop_before_the_talk() {
        let mut timer = Timer::new_at(noon(), 0, None, None, Mode::CountUp).unwrap();
        let mut rx = timer.subscribe();
        rx.borrow_and_update();

        assert!(!timer.toggle_pause_at(noon().timestamp() + 1));

        assert_eq!(timer.state, TimerState::Stopped);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_countdown_runs_negative_past_the_duration() {
        let t0 = noon().timestamp();
        let mut timer = countdown_timer(600);
        timer.start_at(t0);
        timer.tick_at(t0 + 650);

        let update = timer.latest();
        assert_eq!(update.state, TimerState::Running);
        assert_eq!(update.label, "-00:00:50");
        assert_eq!(update.elapsed_seconds, 650);
    }

    #[test]
    fn test_countdown_during_pretalk_shows_time_to_start() {
        let mut timer =
            Timer::new_at(noon(), 0, Some("12:10"), Some("12:40"), Mode::CountUp).unwrap();
        assert_eq!(timer.mode, Mode::CountDown);

        timer.tick_at(noon().timestamp() + 5 * 60);

        let update = timer.latest();
        assert_eq!(update.state, TimerState::PreTalk);
        assert_eq!(update.label, "-00:05:00");
        assert_eq!(update.elapsed_seconds, 0);
    }

    #[test]
    fn test_tick_auto_starts_once_the_schedule_arrives() {
        let mut timer = Timer::new_at(noon(), 0, Some("12:10"), None, Mode::CountUp).unwrap();
        let at = timer.intended_start.unwrap();

        timer.tick_at(at - 1);
        assert_eq!(timer.state, TimerState::PreTalk);

        timer.tick_at(at + 5);
        assert_eq!(timer.state, TimerState::Running);
        assert_eq!(timer.running_time, 0);
    }

    #[test]
    fn test_reset_is_a_noop_once_the_schedule_has_passed() {
        let mut timer = Timer::new_at(noon(), 0, Some("12:10"), None, Mode::CountUp).unwrap();
        let at = timer.intended_start.unwrap();
        timer.tick_at(at + 30);
        timer.tick_at(at + 60);
        assert_eq!(timer.state, TimerState::Running);

        let mut rx = timer.subscribe();
        rx.borrow_and_update();
        let elapsed = timer.running_time;
        timer.reset_at(at + 90);

        assert_eq!(timer.state, TimerState::Running);
        assert_eq!(timer.running_time, elapsed);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_reset_rearms_the_pretalk_countdown() {
        let mut timer = Timer::new_at(noon(), 0, Some("14:00"), None, Mode::CountUp).unwrap();
        let at = timer.intended_start.unwrap();

        // Start early by hand, then change your mind
        timer.start_at(noon().timestamp() + 30 * 60);
        assert_eq!(timer.state, TimerState::Running);
        timer.reset_at(noon().timestamp() + 40 * 60);

        assert_eq!(timer.state, TimerState::PreTalk);
        assert_eq!(timer.start_time, at);
        assert_eq!(timer.latest().label, "-01:20:00");
    }

    #[test]
    fn test_reset_without_a_schedule_returns_to_stopped() {
        let t0 = noon().timestamp();
        let mut timer = countdown_timer(3600);
        timer.start_at(t0);
        timer.tick_at(t0 + 120);

        timer.reset_at(t0 + 130);

        assert_eq!(timer.state, TimerState::Stopped);
        assert_eq!(timer.running_time, 0);
        assert_eq!(timer.latest().label, "01:00:00");
    }

    #[test]
    fn test_start_is_idempotent_while_running() {
        let t0 = noon().timestamp();
        let mut timer = countdown_timer(600);
        timer.start_at(t0);

        let mut rx = timer.subscribe();
        rx.borrow_and_update();
        timer.start_at(t0 + 30);

        assert_eq!(timer.start_time, t0);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_run_behaves_like_start_from_stopped() {
        let t0 = noon().timestamp();
        let mut timer = countdown_timer(600);
        timer.run_at(t0);

        assert!(timer.is_running());
        assert!(!timer.is_paused());
        assert_eq!(timer.start_time, t0);
    }
}
