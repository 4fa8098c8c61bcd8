//! Configuration and CLI argument handling

use clap::Parser;

use crate::state::Mode;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "A state-managed HTTP service for presentation talk timing")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Talk duration in seconds; a positive value forces count-down mode
    #[arg(short, long, default_value = "0")]
    pub duration: u64,

    /// Scheduled talk start as HH:MM, 24-hour local time
    #[arg(short, long)]
    pub start_time: Option<String>,

    /// Scheduled talk end as HH:MM, 24-hour local time
    #[arg(short, long)]
    pub end_time: Option<String>,

    /// Display mode: clock, count-up, or count-down
    #[arg(short, long, default_value = "count-up")]
    pub mode: Mode,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
