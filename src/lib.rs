//! Lectern - A state-managed HTTP service for presentation talk timing
//!
//! This library provides a talk timer state machine with a scheduled
//! ("pretalk") start, count-up, count-down, and wall-clock display modes,
//! and a once-per-second tick that publishes the formatted time label.

pub mod config;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, Mode, Timer, TimerState, TimerUpdate};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
