//! Utilities module for logging, error handling and formatting helpers

pub mod error;
pub mod logging;

pub use error::{BlightError, Result};
pub use logging::{init_logging, LogConfig, LogLevel};

/// Format a probability as a percentage with two decimals
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Format a duration in milliseconds, switching to seconds past one second
pub fn format_millis(ms: f64) -> String {
    if ms < 1000.0 {
        format!("{:.1} ms", ms)
    } else {
        format!("{:.2} s", ms / 1000.0)
    }
}
