//! Periodic tick background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{error, info};

use crate::state::AppState;

/// Background task that drives the timer once per second.
///
/// The loop never breaks, so the schedule continues for the life of the
/// process; a failed lock is logged and the next tick proceeds normally.
pub async fn tick_task(state: Arc<AppState>) {
    info!("Starting tick task");

    let mut interval = interval(Duration::from_secs(1));

    loop {
        interval.tick().await;

        match state.timer.lock() {
            Ok(mut timer) => timer.tick(),
            Err(e) => {
                error!("Failed to lock timer for tick: {}", e);
            }
        }
    }
}
