//! # Error Types
//!
//! General error handling for symbolication runs.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Only conditions that make the whole run unreliable are errors. A line that
//! does not parse, or a frame with no matching image or dSYM, is a normal
//! outcome and never surfaces here.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Main error type for symbolication
///
/// ## Error Categories
///
/// 1. **Configuration errors**: ReportNotFound, WorkDirNotFound
/// 2. **Enumeration errors**: MissingDwarfDirectory, ToolFailed, ToolLaunch
/// 3. **Native backend errors**: InvalidSymbolFile, InvalidAddress
/// 4. **I/O errors**: Io
#[derive(Error, Debug)]
pub enum SymbolicateError
{
    /// The crash report passed on the command line does not exist
    ///
    /// This is a user-input problem rather than a failure, so the binary
    /// exits with status 0 after printing a diagnostic.
    #[error("Crash report not found: {}", .0.display())]
    ReportNotFound(PathBuf),

    /// The directory that should contain the dSYM bundles does not exist
    #[error("Working directory not found: {}", .0.display())]
    WorkDirNotFound(PathBuf),

    /// A dSYM bundle has no DWARF directory to enumerate
    ///
    /// The index would be incomplete, and every later match against it
    /// unreliable, so this aborts the run instead of skipping the bundle.
    #[error("Bundle {} is missing its DWARF directory {}", .bundle.display(), .expected.display())]
    MissingDwarfDirectory
    {
        /// The bundle being enumerated
        bundle: PathBuf,
        /// The directory that was expected inside it
        expected: PathBuf,
    },

    /// An external tool (`dwarfdump`, `atos`) exited unsuccessfully
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed
    {
        /// Name of the tool that was run
        tool: &'static str,
        /// Exit status reported by the OS
        status: ExitStatus,
        /// Captured standard error, trimmed
        stderr: String,
    },

    /// An external tool could not be started at all
    ///
    /// Usually means the Xcode command line tools are not installed.
    #[error("Failed to launch {tool}: {source}")]
    ToolLaunch
    {
        /// Name of the tool that was run
        tool: &'static str,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// A symbol file could not be read as a Mach-O object
    #[error("Invalid symbol file: {0}")]
    InvalidSymbolFile(String),

    /// An address string is not valid hexadecimal
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// I/O error (reading the report, walking directories, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SymbolicateError
{
    /// Whether this error is a configuration problem the user should fix,
    /// as opposed to a failure while enumerating or resolving symbols.
    pub fn is_configuration(&self) -> bool
    {
        matches!(self, Self::ReportNotFound(_) | Self::WorkDirNotFound(_))
    }
}

/// Convenience type alias for `Result<T, SymbolicateError>`
///
/// ```rust
/// use crashsym_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, SymbolicateError>;
