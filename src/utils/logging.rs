//! Logging Module
//!
//! `tracing` subscriber setup shared by the CLI and the HTTP server.
//!
//! The pipeline emits one `info` event per decision and `debug` events for
//! gate rejections and healthy overrides. The server wraps each upload in a
//! `predict` span carrying the request id; with span timings enabled its
//! close event reports how long the request took.

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::FmtSubscriber;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Show the module path of each event
    pub include_target: bool,
    pub include_thread_ids: bool,
    pub ansi_colors: bool,
    /// Log span close events with their busy/idle time
    pub span_timings: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            include_target: false,
            include_thread_ids: false,
            ansi_colors: true,
            span_timings: false,
        }
    }
}

impl LogConfig {
    /// Debug events, module paths, thread ids and span timings
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
            include_target: true,
            include_thread_ids: true,
            ansi_colors: true,
            span_timings: true,
        }
    }

    /// Info level without colors, for servers writing to a log collector
    pub fn production() -> Self {
        Self {
            ansi_colors: false,
            ..Self::default()
        }
    }

    /// Pick the verbose or default config from a `--verbose` flag
    pub fn from_verbose_flag(verbose: bool) -> Self {
        if verbose {
            Self::verbose()
        } else {
            Self::default()
        }
    }

    /// Resolve command-line logging flags
    ///
    /// An explicit `--log-level` overrides the level picked by `--verbose`.
    /// Without colors the production layout is used.
    pub fn from_flags(verbose: bool, level: Option<&str>, ansi_colors: bool) -> Self {
        let mut config = match (verbose, ansi_colors) {
            (_, true) => Self::from_verbose_flag(verbose),
            (true, false) => Self {
                ansi_colors: false,
                ..Self::verbose()
            },
            (false, false) => Self::production(),
        };
        if let Some(level) = level {
            config.level = LogLevel::parse(level);
        }
        config
    }
}

/// Minimum severity written by the subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name, falling back to `Info` for anything unknown
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the global subscriber
///
/// Fails if a global subscriber has already been installed.
pub fn init_logging(config: &LogConfig) -> Result<(), String> {
    let span_events = if config.span_timings {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(config.level))
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .with_thread_ids(config.include_thread_ids)
        .with_span_events(span_events)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}
