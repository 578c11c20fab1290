//! Tracing and logging support.
//!
//! Logs go to stderr so stdout carries only the report. The level comes from
//! the command line when given, otherwise from `RUST_LOG`, otherwise `warn`.

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Human-readable multi-line format.
    Pretty,

    /// Single-line format (default).
    Compact,

    /// JSON lines.
    Json,
}

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level filter.
    ///
    /// If None, uses RUST_LOG environment variable or defaults to "warn".
    pub level: Option<Level>,

    /// Output format.
    pub format: TracingFormat,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: TracingFormat::Compact,
        }
    }
}

impl TracingConfig {
    /// Map `-q` / `-v` flags to a level; `None` defers to `RUST_LOG`
    pub fn from_verbosity(quiet: bool, verbose: u8, format: TracingFormat) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => Some(Level::ERROR),
            (false, 0) => None,
            (false, 1) => Some(Level::INFO),
            (false, 2) => Some(Level::DEBUG),
            (false, _) => Some(Level::TRACE),
        };
        Self { level, format }
    }

    fn filter(&self) -> EnvFilter {
        match self.level {
            Some(level) => EnvFilter::new(level.to_string()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// # Environment Variables
///
/// - `RUST_LOG=debug` - Enable debug logs
/// - `RUST_LOG=pluglens_host=trace` - Per-module filtering
pub fn init_subscriber(config: &TracingConfig) {
    let registry = tracing_subscriber::registry().with(config.filter());
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match config.format {
        TracingFormat::Pretty => registry.with(layer.pretty()).init(),
        TracingFormat::Compact => registry.with(layer.compact()).init(),
        TracingFormat::Json => registry.with(layer.json()).init(),
    }
}
