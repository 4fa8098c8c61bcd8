//! State management module
//!
//! This module contains the talk timer state machine and its supporting
//! structures.

pub mod app_state;
pub mod schedule;
pub mod timer;
pub mod update;

// Re-export main types
pub use app_state::AppState;
pub use schedule::Schedule;
pub use timer::{Mode, Timer, TimerState};
pub use update::TimerUpdate;
