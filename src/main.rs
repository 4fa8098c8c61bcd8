//! Lectern - A state-managed HTTP service for presentation talk timing
//!
//! This is the main entry point for the lectern application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use lectern::{
    config::Config,
    state::{AppState, Timer},
    api::create_router,
    tasks::tick_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level, on stderr so warnings
    // land on the error stream
    tracing_subscriber::fmt()
        .with_env_filter(format!("lectern={},tower_http=info", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting lectern v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, duration={}s, start={}, end={}, mode={}",
        config.host,
        config.port,
        config.duration,
        config.start_time.as_deref().unwrap_or("-"),
        config.end_time.as_deref().unwrap_or("-"),
        config.mode
    );

    // Resolve the talk schedule; malformed time strings abort startup
    let timer = Timer::new(
        config.duration,
        config.start_time.as_deref(),
        config.end_time.as_deref(),
        config.mode,
    )?;

    // Create application state
    let state = Arc::new(AppState::new(timer, config.port, config.host.clone()));

    // Start the once-per-second tick task
    let tick_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_task(tick_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start        - Begin the talk");
    info!("  POST /run          - Begin the talk, or resume if paused");
    info!("  POST /toggle-pause - Pause or resume the talk");
    info!("  POST /reset        - Re-arm the pretalk countdown or stop");
    info!("  POST /mode/:mode   - Switch display mode");
    info!("  GET  /status       - Current timer snapshot and metadata");
    info!("  GET  /health       - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
