//! Logging infrastructure for the diagram model
//!
//! Structured logging uses the `tracing` crate. The model emits `trace`
//! events for individual table and link mutations, `debug` events with
//! collection sizes, and `info` events when a batch (grid construction,
//! resumed refresh) completes.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dbdesigner::core::logging::init_logging;
//!
//! // Initialize with default settings
//! init_logging(None, None).unwrap();
//! ```
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for production
//! - `pretty`: Multi-line format with colors, good for development
//! - `json`: JSON format, good for log aggregation systems
//!
//! # Environment Variables
//!
//! - `DBDESIGNER_LOG_LEVEL`: Set log level (trace|debug|info|warn|error|off)
//! - `DBDESIGNER_LOG_FORMAT`: Set log format (compact|pretty|json)
//! - `RUST_LOG`: Standard `tracing-subscriber` filter, e.g.
//!   `RUST_LOG="info,dbdesigner::grid=trace"`
//!
//! # WASM Compatibility
//!
//! WASM builds log to the browser console through `tracing-wasm`.

use std::fmt;
use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

/// Environment variable holding the log level
pub const LEVEL_ENV: &str = "DBDESIGNER_LOG_LEVEL";

/// Environment variable holding the log format
pub const FORMAT_ENV: &str = "DBDESIGNER_LOG_FORMAT";

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive such as `info` or `dbdesigner::grid=trace`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl LoggingConfig {
    /// Resolve settings: explicit values first, then environment, then defaults
    pub fn resolve(level: Option<&str>, format: Option<&str>) -> Result<Self, String> {
        Self::resolve_with(level, format, |key| std::env::var(key).ok())
    }

    /// Like [`LoggingConfig::resolve`], reading variables through `env`
    pub fn resolve_with(
        level: Option<&str>,
        format: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let level = level
            .map(str::to_string)
            .or_else(|| env(LEVEL_ENV))
            .or_else(|| env("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());

        let format = match format.map(str::to_string).or_else(|| env(FORMAT_ENV)) {
            Some(name) => name
                .parse()
                .map_err(|e| format!("Invalid log format: {}", e))?,
            None => LogFormat::default(),
        };

        Ok(Self { level, format })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn filter(&self) -> EnvFilter {
        if self.level == "off" {
            return EnvFilter::new("off");
        }
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize the global tracing subscriber
///
/// `level` and `format` override `DBDESIGNER_LOG_LEVEL` / `RUST_LOG` and
/// `DBDESIGNER_LOG_FORMAT`. Fails on an unknown format or when a global
/// subscriber is already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = LoggingConfig::resolve(level, format)?;

    #[cfg(target_arch = "wasm32")]
    {
        // The browser console decides presentation
        let _ = config;
        tracing_wasm::set_as_global_default();
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let layer = match config.format {
            LogFormat::Compact => tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_span_events(FmtSpan::NONE)
                .compact()
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .pretty()
                .boxed(),
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .json()
                .boxed(),
        };

        Registry::default()
            .with(config.filter())
            .with(layer)
            .try_init()?;
        Ok(())
    }
}

/// Initialize logging with default settings (info level, compact format)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
