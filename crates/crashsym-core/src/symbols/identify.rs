//! Slice identification: the `UUID: <uuid> (<arch>) <path>` line format.

use std::path::Path;

use crate::error::Result;
use crate::types::{Parsed, SymbolFileInfo};

const UUID_PREFIX: &str = "UUID:";

/// Reports the UUID and architecture of every slice in a DWARF file.
///
/// Implementations return the raw identification output: one
/// `UUID: <uuid> (<arch>) <path>` line per architecture contained in the
/// file, exactly as `dwarfdump --uuid` prints it.
pub trait SliceIdentifier
{
    /// Identify the slices of the file at `slice`.
    ///
    /// ## Errors
    ///
    /// Any error here aborts the run; an index missing a slice would
    /// silently produce wrong or missing symbols.
    fn identify(&self, slice: &Path) -> Result<String>;
}

impl<T: SliceIdentifier + ?Sized> SliceIdentifier for &T
{
    fn identify(&self, slice: &Path) -> Result<String>
    {
        (**self).identify(slice)
    }
}

impl<T: SliceIdentifier + ?Sized> SliceIdentifier for Box<T>
{
    fn identify(&self, slice: &Path) -> Result<String>
    {
        (**self).identify(slice)
    }
}

/// Parse one line of identification output.
///
/// ```rust
/// use crashsym_core::symbols::parse_identification_line;
///
/// let line = "UUID: 4F8B3E0A-9C2D-4E1F-8A7B-6C5D4E3F2A1B (arm64) /tmp/My App.dSYM/Contents/Resources/DWARF/My App";
/// let info = parse_identification_line(line).ok().unwrap();
/// assert_eq!(info.uuid(), "4F8B3E0A-9C2D-4E1F-8A7B-6C5D4E3F2A1B");
/// assert_eq!(info.architecture(), "arm64");
/// assert_eq!(info.path(), "/tmp/My App.dSYM/Contents/Resources/DWARF/My App");
/// ```
///
/// Lines without a `)` are `Skipped`.
pub fn parse_identification_line(line: &str) -> Parsed<SymbolFileInfo>
{
    parse(line).into()
}

fn parse(line: &str) -> Option<SymbolFileInfo>
{
    let (head, tail) = line.split_once(')')?;
    let path = tail.trim();
    let (uuid, architecture) = head.split_once('(')?;
    let uuid = uuid.trim();
    let uuid = uuid.strip_prefix(UUID_PREFIX).unwrap_or(uuid).trim();
    let architecture = architecture.trim();
    if uuid.is_empty() || architecture.is_empty() || path.is_empty() {
        return None;
    }

    Some(SymbolFileInfo::new(path, uuid, architecture))
}

/// Parse every line of identification output, in order.
pub fn parse_identification_output(output: &str) -> Vec<SymbolFileInfo>
{
    output.lines().filter_map(|line| parse_identification_line(line).ok()).collect()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_dwarfdump_line()
    {
        let info = parse_identification_line(
            "UUID: C3E7A5C2-A0F1-3C3A-9B2E-0B4B3F2A1D0E (x86_64) /tmp/App.dSYM/Contents/Resources/DWARF/App",
        )
        .ok()
        .unwrap();
        assert_eq!(info.uuid(), "C3E7A5C2-A0F1-3C3A-9B2E-0B4B3F2A1D0E");
        assert_eq!(info.architecture(), "x86_64");
        assert_eq!(info.path(), "/tmp/App.dSYM/Contents/Resources/DWARF/App");
    }

    #[test]
    fn test_lines_without_closing_paren_are_skipped()
    {
        assert_eq!(parse_identification_line(""), Parsed::Skipped);
        assert_eq!(parse_identification_line("warning: no dSYM found"), Parsed::Skipped);
        assert_eq!(parse_identification_line("UUID: AAAA (arm64"), Parsed::Skipped);
    }

    #[test]
    fn test_universal_output_yields_one_entry_per_arch()
    {
        let output = "\
UUID: AAAAAAAA-AAAA-AAAA-AAAA-AAAAAAAAAAAA (x86_64) /tmp/App.dSYM/Contents/Resources/DWARF/App
UUID: BBBBBBBB-BBBB-BBBB-BBBB-BBBBBBBBBBBB (arm64) /tmp/App.dSYM/Contents/Resources/DWARF/App
";
        let entries = parse_identification_output(output);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].architecture(), "x86_64");
        assert_eq!(entries[1].architecture(), "arm64");
        assert_eq!(entries[0].path(), entries[1].path());
    }
}
