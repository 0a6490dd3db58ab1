//! Debug-symbol slice type and the UUID matching rule.

use std::fmt;
use std::path::Path;

use super::BinaryImage;

/// Normalize a UUID for comparison.
///
/// Reports print UUIDs as 32 lower-case hex digits while `dwarfdump` prints
/// them upper-case with dashes; both normalize to the same string.
///
/// ```rust
/// use crashsym_core::types::normalize_uuid;
///
/// assert_eq!(normalize_uuid("AAAA-BBBB"), normalize_uuid("aaaabbbb"));
/// ```
pub fn normalize_uuid(uuid: &str) -> String
{
    uuid.chars().filter(|c| *c != '-').flat_map(char::to_lowercase).collect()
}

/// One architecture slice of a dSYM bundle.
///
/// A universal dSYM produces one `SymbolFileInfo` per architecture, all
/// sharing the same `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolFileInfo
{
    path: String,
    uuid: String,
    architecture: String,
}

impl SymbolFileInfo
{
    pub fn new(path: impl Into<String>, uuid: impl Into<String>, architecture: impl Into<String>) -> Self
    {
        Self {
            path: path.into(),
            uuid: uuid.into(),
            architecture: architecture.into(),
        }
    }

    /// Path of the DWARF file, unescaped.
    pub fn path(&self) -> &str
    {
        &self.path
    }

    pub fn as_path(&self) -> &Path
    {
        Path::new(&self.path)
    }

    /// Path with spaces backslash-escaped, ready to paste into a shell.
    pub fn shell_escaped_path(&self) -> String
    {
        self.path.replace(' ', "\\ ")
    }

    pub fn uuid(&self) -> &str
    {
        &self.uuid
    }

    pub fn architecture(&self) -> &str
    {
        &self.architecture
    }

    /// Whether this slice holds the symbols for `image`.
    ///
    /// UUIDs compare after normalization; architectures compare exactly, so
    /// `arm64` never matches `arm64e`.
    pub fn matches(&self, image: &BinaryImage) -> bool
    {
        self.architecture == image.architecture() && normalize_uuid(&self.uuid) == normalize_uuid(image.uuid())
    }
}

impl fmt::Display for SymbolFileInfo
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "UUID: {} ({}) {}", self.uuid, self.architecture, self.path)
    }
}
