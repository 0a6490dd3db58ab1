//! In-process address resolution from dSYM DWARF.
//!
//! Loads the slice matching the request's architecture, maps the runtime
//! address back to a file address through the `__TEXT` segment and asks
//! `addr2line` for the innermost function and line. When the DWARF has no
//! answer the slice's symbol table is used instead.
//!
//! Output mimics `atos`:
//!
//! ```text
//! main (in MyApp) (main.swift:12)
//! start (in libdyld.dylib) + 4
//! 0x0000000104c3f5a4
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use addr2line::Context;
use gimli::{Dwarf, EndianArcSlice, RunTimeEndian};
use object::{Object, ObjectSection, ObjectSegment};
use rustc_demangle::try_demangle;
use tracing::debug;

use super::{AddressResolver, ResolutionRequest};
use crate::error::{Result, SymbolicateError};
use crate::symbols::macho;

type OwnedReader = EndianArcSlice<RunTimeEndian>;

const DWARF_SECTIONS: &[(&str, &[&str])] = &[
    (".debug_abbrev", &[".debug_abbrev", "__debug_abbrev"]),
    (".debug_addr", &[".debug_addr", "__debug_addr"]),
    (".debug_aranges", &[".debug_aranges", "__debug_aranges"]),
    (".debug_info", &[".debug_info", "__debug_info"]),
    (".debug_line", &[".debug_line", "__debug_line"]),
    (".debug_line_str", &[".debug_line_str", "__debug_line_str"]),
    (".debug_ranges", &[".debug_ranges", "__debug_ranges"]),
    (".debug_rnglists", &[".debug_rnglists", "__debug_rnglists"]),
    (".debug_str", &[".debug_str", "__debug_str"]),
    (".debug_str_offsets", &[".debug_str_offsets", "__debug_str_offs"]),
];

fn load_section_bytes(file: &object::File<'_>, names: &[&str]) -> Result<Option<Arc<[u8]>>>
{
    for name in names {
        if let Some(section) = file.section_by_name(name) {
            let data = section
                .uncompressed_data()
                .map_err(|err| SymbolicateError::InvalidSymbolFile(format!("failed to read {name}: {err}")))?;
            return Ok(Some(match data {
                Cow::Borrowed(bytes) => Arc::<[u8]>::from(bytes),
                Cow::Owned(vec) => vec.into(),
            }));
        }
    }

    Ok(None)
}

/// One architecture slice of a DWARF file, ready for lookups.
struct SymbolImage
{
    name: String,
    text_vmaddr: u64,
    context: Context<OwnedReader>,
    /// Symbol table sorted by address.
    symbols: Vec<(u64, String)>,
}

impl SymbolImage
{
    fn load(path: &Path, arch: &str) -> Result<Self>
    {
        let data = fs::read(path)?;
        let file = macho::slice_for_arch(&data, path, arch)?.ok_or_else(|| {
            SymbolicateError::InvalidSymbolFile(format!("{} has no {arch} slice", path.display()))
        })?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };

        let text_vmaddr = file
            .segments()
            .find(|segment| matches!(segment.name(), Ok(Some("__TEXT"))))
            .map(|segment| segment.address())
            .ok_or_else(|| SymbolicateError::InvalidSymbolFile(format!("{} missing __TEXT segment", path.display())))?;

        let mut sections = HashMap::new();
        for (canonical, aliases) in DWARF_SECTIONS {
            if let Some(bytes) = load_section_bytes(&file, aliases)? {
                sections.insert(*canonical, bytes);
            }
        }

        let dwarf = Dwarf::load(|id| {
            let data = sections
                .get(id.name())
                .cloned()
                .unwrap_or_else(|| Arc::<[u8]>::from(Vec::new()));
            Ok::<_, gimli::Error>(EndianArcSlice::new(data, endian))
        })
        .map_err(|err| SymbolicateError::InvalidSymbolFile(format!("failed to load DWARF: {err}")))?;
        let context = Context::from_dwarf(dwarf)
            .map_err(|err| SymbolicateError::InvalidSymbolFile(format!("failed to build addr2line context: {err}")))?;

        let symbols = file
            .symbol_map()
            .symbols()
            .iter()
            .map(|symbol| (symbol.address(), symbol.name().to_string()))
            .collect();

        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());

        debug!(path = %path.display(), arch, text_vmaddr, "loaded symbol image");
        Ok(Self {
            name,
            text_vmaddr,
            context,
            symbols,
        })
    }

    /// Describe the file address `probe`, or `None` if nothing covers it.
    fn describe(&self, probe: u64) -> Option<String>
    {
        if let Some(text) = self.describe_from_dwarf(probe) {
            return Some(text);
        }

        let index = self.symbols.partition_point(|(address, _)| *address <= probe);
        let (address, raw) = self.symbols.get(index.checked_sub(1)?)?;
        Some(format!(
            "{} (in {}) + {}",
            display_name(raw),
            self.name,
            probe - address
        ))
    }

    fn describe_from_dwarf(&self, probe: u64) -> Option<String>
    {
        let mut frames = self.context.find_frames(probe).skip_all_loads().ok()?;

        // Innermost frame first; it holds the actual code location.
        while let Ok(Some(frame)) = frames.next() {
            let Some(function) = frame.function.as_ref().and_then(|func| func.raw_name().ok()) else {
                continue;
            };
            let function = display_name(&function);
            let location = frame.location.and_then(|loc| {
                let file = Path::new(loc.file?).file_name()?.to_string_lossy().into_owned();
                Some(format!("{file}:{}", loc.line?))
            });

            return Some(match location {
                Some(location) => format!("{function} (in {}) ({location})", self.name),
                None => format!("{function} (in {})", self.name),
            });
        }

        None
    }
}

/// Demangle a Rust name, or strip the Mach-O leading underscore.
fn display_name(raw: &str) -> String
{
    match try_demangle(raw) {
        Ok(demangled) => format!("{demangled:#}"),
        Err(_) => raw.strip_prefix('_').unwrap_or(raw).to_string(),
    }
}

/// Parse `0x`-prefixed (or bare) hexadecimal.
pub(crate) fn parse_hex(value: &str) -> Result<u64>
{
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u64::from_str_radix(digits, 16).map_err(|_| SymbolicateError::InvalidAddress(value.to_string()))
}

/// Resolves addresses in-process with `object` + `gimli` + `addr2line`.
///
/// Each `(path, architecture)` slice is parsed once and kept for the rest of
/// the run.
#[derive(Default)]
pub struct DwarfResolver
{
    images: HashMap<(PathBuf, String), SymbolImage>,
}

impl DwarfResolver
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    fn image(&mut self, path: &str, arch: &str) -> Result<&SymbolImage>
    {
        let key = (PathBuf::from(path), arch.to_string());
        if !self.images.contains_key(&key) {
            let image = SymbolImage::load(&key.0, arch)?;
            self.images.insert(key.clone(), image);
        }
        self.images
            .get(&key)
            .ok_or_else(|| SymbolicateError::InvalidSymbolFile(format!("{path} was not loaded")))
    }
}

impl AddressResolver for DwarfResolver
{
    fn resolve(&mut self, request: &ResolutionRequest<'_>) -> Result<String>
    {
        let address = parse_hex(request.address())?;
        let load_address = parse_hex(request.load_address())?;
        let offset = address.checked_sub(load_address).ok_or_else(|| {
            SymbolicateError::InvalidAddress(format!(
                "{} is below load address {}",
                request.address(),
                request.load_address()
            ))
        })?;

        let image = self.image(request.symbol_path(), request.architecture())?;
        let probe = image.text_vmaddr.wrapping_add(offset);
        Ok(image.describe(probe).unwrap_or_else(|| request.address().to_string()))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_hex()
    {
        assert_eq!(parse_hex("0x104c3c000").unwrap(), 0x1_04c3_c000);
        assert_eq!(parse_hex("0X10").unwrap(), 0x10);
        assert_eq!(parse_hex("ff").unwrap(), 0xff);
        assert!(matches!(parse_hex("0xzz"), Err(SymbolicateError::InvalidAddress(_))));
        assert!(parse_hex("").is_err());
    }

    #[test]
    fn test_display_name()
    {
        assert_eq!(display_name("_main"), "main");
        assert_eq!(display_name("__ZN4core9panicking5panic17h0123456789abcdefE"), "core::panicking::panic");
        assert_eq!(display_name("objc_msgSend"), "objc_msgSend");
    }

    #[test]
    fn test_address_below_load_address_is_rejected()
    {
        let mut resolver = DwarfResolver::new();
        let request = ResolutionRequest::new("arm64", "/nonexistent", "0x2000", "0x1000");
        assert!(matches!(
            resolver.resolve(&request),
            Err(SymbolicateError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_missing_symbol_file_is_an_io_error()
    {
        let mut resolver = DwarfResolver::new();
        let request = ResolutionRequest::new("arm64", "/nonexistent/App", "0x1000", "0x1010");
        assert!(matches!(resolver.resolve(&request), Err(SymbolicateError::Io(_))));
    }
}
