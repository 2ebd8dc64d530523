//! Logging infrastructure for vsts-wiql.
//!
//! Logging is off unless a level is requested. When on, events from this
//! crate go to stderr or to a file (appended), as text or JSON.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const ENV_LOG_LEVEL: &str = "VSTS_LOG_LEVEL";
const ENV_LOG_FILE: &str = "VSTS_LOG_FILE";
const ENV_LOG_FORMAT: &str = "VSTS_LOG_FORMAT";

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to a filter string for tracing-subscriber.
    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Configuration for the logging system.
#[derive(Debug, Default)]
pub struct LogConfig {
    /// Log level (None means logging is disabled).
    pub level: Option<LogLevel>,
    /// Output file path (None means stderr).
    pub file: Option<PathBuf>,
    /// Output format.
    pub format: LogFormat,
}

impl LogConfig {
    /// Filter directive limiting output to this crate, or None when disabled.
    pub fn filter_directive(&self) -> Option<String> {
        self.level
            .map(|level| format!("vsts_wiql={}", level.as_filter_str()))
    }
}

/// Guard that must be held to ensure logs are flushed.
///
/// When this guard is dropped, all pending log messages are flushed.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Initialize the logging system.
///
/// Returns `Ok(None)` when logging is disabled. The guard must be held until
/// application exit to ensure logs are flushed.
///
/// # Example
///
/// ```rust,no_run
/// use vsts_wiql::logging::{LogConfig, LogLevel, LogFormat, init_logging};
/// use std::path::PathBuf;
///
/// let config = LogConfig {
///     level: Some(LogLevel::Debug),
///     file: Some(PathBuf::from("/tmp/vsts-wiql.log")),
///     format: LogFormat::Text,
/// };
///
/// let _guard = init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<Option<LogGuard>> {
    let Some(directive) = config.filter_directive() else {
        return Ok(None);
    };
    let filter = EnvFilter::new(directive);

    let (writer, guard, to_file) = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            (writer, guard, true)
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            (writer, guard, false)
        }
    };

    install(writer, config.format, filter, to_file)?;
    Ok(Some(LogGuard { _guard: guard }))
}

fn install(writer: NonBlocking, format: LogFormat, filter: EnvFilter, to_file: bool) -> Result<()> {
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_file(to_file)
                    .with_line_number(to_file),
            )
            .try_init(),
        LogFormat::Text if to_file => registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_level(true)
                    .compact(),
            )
            .try_init(),
    };
    installed.context("Failed to install log subscriber")
}

/// Parse logging configuration from command-line arguments and environment.
///
/// This runs before clap so that argument parsing itself can be logged.
/// Precedence: CLI args > environment variables.
#[must_use]
pub fn parse_early_log_config(args: &[String]) -> LogConfig {
    let level_str = extract_arg_value(args, "--log-level").or(std::env::var(ENV_LOG_LEVEL).ok());
    let file_str = extract_arg_value(args, "--log-file").or(std::env::var(ENV_LOG_FILE).ok());
    let format_str =
        extract_arg_value(args, "--log-format").or(std::env::var(ENV_LOG_FORMAT).ok());

    LogConfig {
        level: level_str.and_then(|s| LogLevel::from_str(&s, true).ok()),
        file: file_str.map(PathBuf::from),
        format: format_str
            .and_then(|s| LogFormat::from_str(&s, true).ok())
            .unwrap_or_default(),
    }
}

/// Extract a value following a flag, accepting both `--flag value` and `--flag=value`.
fn extract_arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    args.iter()
        .find_map(|a| a.strip_prefix(&prefix).map(String::from))
        .or_else(|| args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone()))
}
