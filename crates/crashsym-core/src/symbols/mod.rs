//! # Symbol Index
//!
//! Discovers the dSYM bundles in a directory and indexes every slice they
//! contain by `(UUID, architecture)`.
//!
//! ## Layout
//!
//! ```text
//! <dir>/MyApp.app.dSYM/Contents/Resources/DWARF/MyApp
//! <dir>/MyFramework.framework.dSYM/Contents/Resources/DWARF/MyFramework
//! ```
//!
//! Each file in a bundle's DWARF directory is handed to a
//! [`SliceIdentifier`], which reports one `UUID: <uuid> (<arch>) <path>` line
//! per architecture slice. A universal file therefore yields several
//! [`SymbolFileInfo`] entries sharing one path.
//!
//! ## Ordering
//!
//! Bundles and slices are visited in sorted path order. When two entries
//! share a UUID and architecture, [`SymbolIndex::find`] returns the first one,
//! so which duplicate wins depends on file names, not on any notion of which
//! copy is "better".
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use crashsym_core::symbols::{DwarfdumpIdentifier, IndexOptions, SymbolIndex};
//!
//! fn main() -> crashsym_core::Result<()>
//! {
//!     let index = SymbolIndex::build(Path::new("."), &IndexOptions::default(), &DwarfdumpIdentifier)?;
//!     for entry in index.entries() {
//!         println!("{entry}");
//!     }
//!     Ok(())
//! }
//! ```

mod dwarfdump;
mod identify;
pub(crate) mod macho;

use std::fs;
use std::path::{Path, PathBuf};

pub use dwarfdump::DwarfdumpIdentifier;
pub use identify::{parse_identification_line, parse_identification_output, SliceIdentifier};
pub use macho::MachOIdentifier;
use tracing::{debug, info, warn};

use crate::error::{Result, SymbolicateError};
use crate::types::{BinaryImage, SymbolFileInfo};

/// Suffix that marks a directory as a debug-symbol bundle.
pub const DEFAULT_BUNDLE_SUFFIX: &str = ".dSYM";

/// Where slices live inside a bundle.
pub const DEFAULT_DWARF_SUBDIR: &str = "Contents/Resources/DWARF";

/// How bundles are recognised and enumerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions
{
    /// Directory-name suffix identifying a bundle.
    pub bundle_suffix: String,
    /// Path of the slice directory, relative to the bundle.
    pub dwarf_subdir: PathBuf,
}

impl Default for IndexOptions
{
    fn default() -> Self
    {
        Self {
            bundle_suffix: DEFAULT_BUNDLE_SUFFIX.to_string(),
            dwarf_subdir: PathBuf::from(DEFAULT_DWARF_SUBDIR),
        }
    }
}

/// Every symbol slice found on disk, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolIndex
{
    entries: Vec<SymbolFileInfo>,
}

impl SymbolIndex
{
    /// Build an index from already-known entries.
    pub fn from_entries(entries: Vec<SymbolFileInfo>) -> Self
    {
        Self { entries }
    }

    /// Scan `dir` for bundles and identify every slice inside them.
    ///
    /// ## Errors
    ///
    /// Returns an error, aborting the run, if:
    /// - `dir` does not exist ([`SymbolicateError::WorkDirNotFound`])
    /// - a bundle has no DWARF directory ([`SymbolicateError::MissingDwarfDirectory`])
    /// - a directory cannot be read
    /// - the identifier fails on any slice
    pub fn build(dir: &Path, options: &IndexOptions, identifier: &dyn SliceIdentifier) -> Result<Self>
    {
        if !dir.is_dir() {
            return Err(SymbolicateError::WorkDirNotFound(dir.to_path_buf()));
        }

        let bundles = find_bundles(dir, &options.bundle_suffix)?;
        let mut entries = Vec::new();

        for bundle in &bundles {
            let before = entries.len();
            for slice in bundle_slices(bundle, &options.dwarf_subdir)? {
                let output = identifier.identify(&slice)?;
                let found = identify::parse_identification_output(&output);
                debug!(slice = %slice.display(), entries = found.len(), "identified slice");
                entries.extend(found);
            }

            if entries.len() == before {
                warn!(bundle = %bundle.display(), "bundle contains no identifiable slices");
            }
        }

        info!(
            dir = %dir.display(),
            bundles = bundles.len(),
            entries = entries.len(),
            "built symbol index"
        );
        Ok(Self { entries })
    }

    /// First entry holding the symbols for `image`.
    pub fn find(&self, image: &BinaryImage) -> Option<&SymbolFileInfo>
    {
        self.entries.iter().find(|entry| entry.matches(image))
    }

    pub fn entries(&self) -> &[SymbolFileInfo]
    {
        &self.entries
    }

    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }
}

/// Bundles directly under `dir`, sorted by path.
///
/// ## Errors
///
/// Returns an error if `dir` cannot be read.
pub fn find_bundles(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>>
{
    let mut bundles = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_bundle = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(suffix));
        if is_bundle && path.is_dir() {
            bundles.push(path);
        }
    }

    bundles.sort();
    Ok(bundles)
}

/// Slice files inside one bundle, sorted by path.
///
/// ## Errors
///
/// Returns [`SymbolicateError::MissingDwarfDirectory`] if the bundle has no
/// `dwarf_subdir`, or an I/O error if it cannot be read.
pub fn bundle_slices(bundle: &Path, dwarf_subdir: &Path) -> Result<Vec<PathBuf>>
{
    let dwarf_dir = bundle.join(dwarf_subdir);
    if !dwarf_dir.is_dir() {
        return Err(SymbolicateError::MissingDwarfDirectory {
            bundle: bundle.to_path_buf(),
            expected: dwarf_dir,
        });
    }

    let mut slices = Vec::new();
    for entry in fs::read_dir(&dwarf_dir)? {
        let path = entry?.path();
        if path.is_file() {
            slices.push(path);
        }
    }

    slices.sort();
    Ok(slices)
}
