//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::state::{AppState, Mode};
use super::responses::{ApiResponse, StatusResponse, HealthResponse};

/// Handle POST /start - Begin the talk
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.command("start", |timer| {
        timer.start();
        timer.latest()
    }) {
        Ok(update) => {
            info!("Start endpoint called - timer state is now {:?}", update.state);
            Ok(Json(ApiResponse::ok("Timer started".to_string(), update)))
        }
        Err(e) => {
            error!("Failed to start timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /run - Begin the talk, or resume it if paused
pub async fn run_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.command("run", |timer| {
        timer.run();
        timer.latest()
    }) {
        Ok(update) => {
            info!("Run endpoint called - timer state is now {:?}", update.state);
            Ok(Json(ApiResponse::ok("Timer running".to_string(), update)))
        }
        Err(e) => {
            error!("Failed to run timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /toggle-pause - Pause a running talk or resume a paused one
pub async fn toggle_pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.command("toggle-pause", |timer| {
        let paused = timer.toggle_pause();
        (paused, timer.latest())
    }) {
        Ok((true, update)) => {
            info!("Toggle-pause endpoint called - timer paused");
            Ok(Json(ApiResponse::paused("Timer paused".to_string(), update)))
        }
        Ok((false, update)) => {
            info!("Toggle-pause endpoint called - timer not paused");
            Ok(Json(ApiResponse::running("Timer not paused".to_string(), update)))
        }
        Err(e) => {
            error!("Failed to toggle pause: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /reset - Re-arm the pretalk countdown or stop the timer
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.command("reset", |timer| {
        timer.reset();
        timer.latest()
    }) {
        Ok(update) => {
            info!("Reset endpoint called - timer state is now {:?}", update.state);
            Ok(Json(ApiResponse::ok("Timer reset".to_string(), update)))
        }
        Err(e) => {
            error!("Failed to reset timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /mode/:mode - Switch the display mode
///
/// The new mode takes effect on the next recompute, so the returned snapshot
/// still carries the previous label.
pub async fn mode_handler(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let mode: Mode = match mode.parse() {
        Ok(m) => m,
        Err(e) => {
            error!("Rejected mode change: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    match state.command("mode", |timer| {
        timer.mode = mode;
        timer.latest()
    }) {
        Ok(update) => {
            info!("Mode endpoint called - display mode set to {}", mode);
            Ok(Json(ApiResponse::ok(format!("Mode set to {}", mode), update)))
        }
        Err(e) => {
            error!("Failed to set mode: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return the current timer snapshot and server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let update = match state.latest_update() {
        Ok(u) => u,
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mode = match state.mode() {
        Ok(m) => m,
        Err(e) => {
            error!("Failed to get timer mode: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_command, last_command_time) = state.get_last_command();

    Ok(Json(StatusResponse {
        timer: update,
        mode,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_command,
        last_command_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
