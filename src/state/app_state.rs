//! Main application state management

use std::{
    sync::Mutex,
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::{Mode, Timer, TimerUpdate};

/// Shared application state: the talk timer plus server metadata.
///
/// Commands and ticks both mutate the timer under the same lock, so all
/// timer logic runs one operation at a time.
#[derive(Debug)]
pub struct AppState {
    /// The talk timer
    pub timer: Mutex<Timer>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last command tracking
    pub last_command: Mutex<Option<String>>,
    pub last_command_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Create a new AppState around an already-constructed timer
    pub fn new(timer: Timer, port: u16, host: String) -> Self {
        Self {
            timer: Mutex::new(timer),
            start_time: Instant::now(),
            port,
            host,
            last_command: Mutex::new(None),
            last_command_time: Mutex::new(None),
        }
    }

    /// Run a timer command under the lock and record it for the status endpoint
    pub fn command<F, R>(&self, name: &str, op: F) -> Result<R, String>
    where
        F: FnOnce(&mut Timer) -> R,
    {
        let mut timer = self.timer.lock()
            .map_err(|e| format!("Failed to lock timer: {}", e))?;

        let result = op(&mut timer);
        drop(timer); // Release the lock early

        // Update last command tracking
        if let Ok(mut last_command) = self.last_command.lock() {
            *last_command = Some(name.to_string());
        }
        if let Ok(mut last_time) = self.last_command_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(result)
    }

    /// Latest published timer snapshot
    pub fn latest_update(&self) -> Result<TimerUpdate, String> {
        self.timer.lock()
            .map(|timer| timer.latest())
            .map_err(|e| format!("Failed to lock timer: {}", e))
    }

    /// Current display mode
    pub fn mode(&self) -> Result<Mode, String> {
        self.timer.lock()
            .map(|timer| timer.mode)
            .map_err(|e| format!("Failed to lock timer: {}", e))
    }

    /// Watch the stream of timer snapshots
    pub fn subscribe(&self) -> Result<watch::Receiver<TimerUpdate>, String> {
        self.timer.lock()
            .map(|timer| timer.subscribe())
            .map_err(|e| format!("Failed to lock timer: {}", e))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last command information
    pub fn get_last_command(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_command = self.last_command.lock().ok().and_then(|c| c.clone());
        let last_command_time = self.last_command_time.lock().ok().and_then(|t| *t);
        (last_command, last_command_time)
    }
}
