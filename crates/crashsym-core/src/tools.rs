//! Running the Xcode command line tools.
//!
//! Arguments are passed as discrete argv elements, never through a shell, so
//! paths containing spaces need no escaping here.

use std::ffi::OsStr;
use std::process::Command;

use tracing::trace;

use crate::error::{Result, SymbolicateError};

/// Run `tool` with `args` and return its standard output.
///
/// ## Errors
///
/// - [`SymbolicateError::ToolLaunch`] if the tool cannot be spawned
/// - [`SymbolicateError::ToolFailed`] if it exits unsuccessfully
pub(crate) fn run<I, S>(tool: &'static str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(tool);
    command.args(args);
    trace!(?command, "running external tool");

    let output = command
        .output()
        .map_err(|source| SymbolicateError::ToolLaunch { tool, source })?;

    if !output.status.success() {
        return Err(SymbolicateError::ToolFailed {
            tool,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
