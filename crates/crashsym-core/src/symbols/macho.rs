//! In-process Mach-O slice identification.
//!
//! Reads thin and universal (fat) Mach-O files with the `object` crate and
//! reports each slice in the same line format `dwarfdump --uuid` uses, so the
//! index builder cannot tell the two identifiers apart.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use object::read::macho::{FatArch, MachOFatFile32, MachOFatFile64};
use object::{Architecture, FileKind, Object, SubArchitecture};
use tracing::warn;

use super::SliceIdentifier;
use crate::error::{Result, SymbolicateError};

/// Identifies slices without external tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct MachOIdentifier;

impl SliceIdentifier for MachOIdentifier
{
    fn identify(&self, slice: &Path) -> Result<String>
    {
        let data = fs::read(slice)?;
        let mut output = String::new();

        for file in slices(&data, slice)? {
            let Some(arch) = arch_name(file.architecture(), file.sub_architecture()) else {
                warn!(path = %slice.display(), arch = ?file.architecture(), "skipping slice with unsupported architecture");
                continue;
            };
            let uuid = file
                .mach_uuid()
                .map_err(|err| invalid(slice, &err))?;
            let Some(uuid) = uuid else {
                warn!(path = %slice.display(), arch, "skipping slice without LC_UUID");
                continue;
            };
            let _ = writeln!(output, "UUID: {} ({arch}) {}", format_uuid(uuid), slice.display());
        }

        Ok(output)
    }
}

/// Name an architecture the way crash reports and `dwarfdump` print it.
pub(crate) fn arch_name(arch: Architecture, sub: Option<SubArchitecture>) -> Option<&'static str>
{
    match (arch, sub) {
        (Architecture::Aarch64, Some(SubArchitecture::Arm64E)) => Some("arm64e"),
        (Architecture::Aarch64, _) => Some("arm64"),
        (Architecture::Aarch64_Ilp32, _) => Some("arm64_32"),
        (Architecture::Arm, _) => Some("armv7"),
        (Architecture::X86_64, _) => Some("x86_64"),
        (Architecture::I386, _) => Some("i386"),
        _ => None,
    }
}

/// Upper-case, dashed form: `4F8B3E0A-9C2D-4E1F-8A7B-6C5D4E3F2A1B`.
pub(crate) fn format_uuid(uuid: [u8; 16]) -> String
{
    let mut out = String::with_capacity(36);
    for (i, byte) in uuid.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        let _ = write!(out, "{byte:02X}");
    }
    out
}

/// Every Mach-O slice in `data`, whether the file is thin or universal.
///
/// ## Errors
///
/// Returns [`SymbolicateError::InvalidSymbolFile`] if `data` is not Mach-O.
pub(crate) fn slices<'data>(data: &'data [u8], path: &Path) -> Result<Vec<object::File<'data>>>
{
    let kind = FileKind::parse(data).map_err(|err| invalid(path, &err))?;
    let slice_data: Vec<&'data [u8]> = match kind {
        FileKind::MachOFat32 => {
            let fat = MachOFatFile32::parse(data).map_err(|err| invalid(path, &err))?;
            fat.arches()
                .iter()
                .map(|arch| arch.data(data))
                .collect::<object::Result<_>>()
                .map_err(|err| invalid(path, &err))?
        }
        FileKind::MachOFat64 => {
            let fat = MachOFatFile64::parse(data).map_err(|err| invalid(path, &err))?;
            fat.arches()
                .iter()
                .map(|arch| arch.data(data))
                .collect::<object::Result<_>>()
                .map_err(|err| invalid(path, &err))?
        }
        FileKind::MachO32 | FileKind::MachO64 => vec![data],
        other => {
            return Err(SymbolicateError::InvalidSymbolFile(format!(
                "{} is not a Mach-O file ({other:?})",
                path.display()
            )))
        }
    };

    slice_data
        .into_iter()
        .map(|bytes| object::File::parse(bytes).map_err(|err| invalid(path, &err)))
        .collect()
}

/// The slice of `data` built for `arch`, if there is one.
///
/// ## Errors
///
/// Returns [`SymbolicateError::InvalidSymbolFile`] if `data` is not Mach-O.
pub(crate) fn slice_for_arch<'data>(data: &'data [u8], path: &Path, arch: &str) -> Result<Option<object::File<'data>>>
{
    Ok(slices(data, path)?
        .into_iter()
        .find(|file| arch_name(file.architecture(), file.sub_architecture()) == Some(arch)))
}

fn invalid(path: &Path, err: &object::Error) -> SymbolicateError
{
    SymbolicateError::InvalidSymbolFile(format!("failed to parse {}: {err}", path.display()))
}
