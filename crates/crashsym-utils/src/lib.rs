//! # crashsym Utilities
//!
//! Shared utilities, logging and helpers for crashsym.
//!
//! Currently this is the logging infrastructure built on `tracing`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with, LogFormat, LogLevel, LoggingError, LoggingGuard};
pub use tracing::{debug, error, info, trace, warn};
