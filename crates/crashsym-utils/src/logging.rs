//! # Logging Utilities
//!
//! Logging infrastructure for crashsym using `tracing`.
//!
//! The symbolicated report is written to stdout, so console logs always go to
//! stderr. Supported:
//! - Pretty or JSON output
//! - Environment variable configuration, overridable from the command line
//! - An optional daily-rolling log file
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crashsym_utils::init_logging;
//!
//! // Reads RUST_LOG, CRASHSYM_LOG_FORMAT and CRASHSYM_LOG_FILE
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::warn!("bundle contains no identifiable slices");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=crashsym_core=trace`)
//! - `CRASHSYM_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `CRASHSYM_LOG_FILE`: Optional path to log file (if not set, logs only to stderr)
//!
//! ## Examples
//!
//! ```rust,no_run
//! use crashsym_utils::{LogFormat, LogLevel, init_logging_with};
//!
//! // Explicit level and format win over the environment
//! let _guard = init_logging_with(Some(LogLevel::Debug), Some(LogFormat::Json))
//!     .expect("Failed to initialize logging");
//! ```

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "CRASHSYM_LOG_FORMAT";
/// Environment variable naming an extra log file
pub const LOG_FILE_ENV: &str = "CRASHSYM_LOG_FILE";

/// Level used when neither the caller nor `RUST_LOG` picks one.
///
/// Quiet by default: the report on stdout is the product, logs are diagnostics.
pub const DEFAULT_LEVEL: Level = Level::WARN;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    Pretty,
    /// JSON format, one object per event
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "text" | "human" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level (default)
    Warn,
    /// Info level: per-run summary
    Info,
    /// Debug level: per-frame matching decisions
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Keeps the log file writer alive.
///
/// Dropping it flushes and stops the background writer, so hold it until the
/// process exits.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard
{
    _file_guard: Option<WorkerGuard>,
}

/// Initialize logging from the environment only
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - `CRASHSYM_LOG_FORMAT` holds an unknown format
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    init_logging_with(None, None)
}

/// Initialize logging with optional explicit level and format
///
/// Precedence for the filter:
/// 1. `level`, when given (from `--log-level`)
/// 2. `RUST_LOG`, which allows module-specific filters like `crashsym_core=debug`
/// 3. [`DEFAULT_LEVEL`]
///
/// `format` likewise wins over `CRASHSYM_LOG_FORMAT`, which wins over pretty.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the environment
/// names an unknown format.
pub fn init_logging_with(level: Option<LogLevel>, format: Option<LogFormat>) -> Result<LoggingGuard, LoggingError>
{
    let format = match format {
        Some(format) => format,
        None => match std::env::var(LOG_FORMAT_ENV) {
            Ok(value) => LogFormat::from_str(&value).map_err(LoggingError::InvalidFormat)?,
            Err(_) => LogFormat::Pretty,
        },
    };

    let log_file = std::env::var(LOG_FILE_ENV).ok().map(PathBuf::from);
    init_logging_internal(format, level, log_file.as_deref())
}

/// Build the filter for one layer
fn build_filter(level: Option<LogLevel>) -> EnvFilter
{
    match level {
        Some(level) => EnvFilter::new(Level::from(level).to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL.to_string())),
    }
}

/// Internal initialization function
fn init_logging_internal(
    format: LogFormat,
    level: Option<LogLevel>,
    log_file: Option<&Path>,
) -> Result<LoggingGuard, LoggingError>
{
    let (file_writer, file_guard) = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            std::fs::create_dir_all(&directory)?;
            let file_appender = tracing_appender::rolling::daily(directory, path.file_name().unwrap_or_default());
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (Some(non_blocking), Some(guard))
        }
        None => (None, None),
    };

    let ansi = io::stderr().is_terminal();

    let result = match format {
        LogFormat::Pretty => {
            let console_layer = fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(ansi)
                .with_writer(io::stderr)
                .with_filter(build_filter(level));

            let file_layer = file_writer.map(|writer| {
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false) // No ANSI in files
                    .with_filter(build_filter(level))
            });

            Registry::default().with(console_layer).with(file_layer).try_init()
        }
        LogFormat::Json => {
            let console_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(io::stderr)
                .with_filter(build_filter(level));

            let file_layer = file_writer.map(|writer| {
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_filter(build_filter(level))
            });

            Registry::default().with(console_layer).with(file_layer).try_init()
        }
    };

    result.map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;
    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
