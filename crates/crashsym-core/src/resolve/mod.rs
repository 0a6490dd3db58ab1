//! # Frame Resolution
//!
//! Matches each backtrace frame to its binary image, the image to a dSYM
//! slice, and hands the pair to an [`AddressResolver`].
//!
//! ## Matching
//!
//! 1. Frame → image: exact equality of load address and image name.
//! 2. Image → slice: normalized UUID and exact architecture.
//!
//! Both lookups take the first match. A miss at either step leaves the frame
//! unresolved; it is never an error.
//!
//! ## Resolvers
//!
//! - [`AtosResolver`]: shells out to `atos`, one call per frame.
//! - [`DwarfResolver`]: reads the DWARF in-process with `addr2line`.
//! - [`CachingResolver`]: wraps either and remembers answers.

mod atos;
mod cache;
mod dwarf;

pub use atos::AtosResolver;
pub use cache::CachingResolver;
pub use dwarf::DwarfResolver;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::report::parse_backtrace_line;
use crate::symbols::SymbolIndex;
use crate::types::{BacktraceLine, BinaryImage, Parsed, SymbolFileInfo};

/// Everything a resolver needs to symbolicate one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolutionRequest<'a>
{
    architecture: &'a str,
    symbol_path: &'a str,
    load_address: &'a str,
    address: &'a str,
}

impl<'a> ResolutionRequest<'a>
{
    pub fn new(architecture: &'a str, symbol_path: &'a str, load_address: &'a str, address: &'a str) -> Self
    {
        Self {
            architecture,
            symbol_path,
            load_address,
            address,
        }
    }

    /// Build the request for `frame` matched to `symbol_file`.
    pub fn for_frame(frame: &'a BacktraceLine, symbol_file: &'a SymbolFileInfo) -> Self
    {
        Self::new(
            symbol_file.architecture(),
            symbol_file.path(),
            frame.load_address(),
            frame.address(),
        )
    }

    pub fn architecture(&self) -> &'a str
    {
        self.architecture
    }

    /// Path of the DWARF file holding the symbols.
    pub fn symbol_path(&self) -> &'a str
    {
        self.symbol_path
    }

    pub fn load_address(&self) -> &'a str
    {
        self.load_address
    }

    pub fn address(&self) -> &'a str
    {
        self.address
    }
}

/// Turns an address into a line of human-readable symbol text.
///
/// Implementations must be deterministic: identical requests give identical
/// answers. The text is expected on one line; anything after the first line
/// is ignored.
pub trait AddressResolver
{
    /// Symbolicate one address.
    ///
    /// ## Errors
    ///
    /// An error affects only the frame being resolved; it is logged and the
    /// line is left as it was.
    fn resolve(&mut self, request: &ResolutionRequest<'_>) -> Result<String>;
}

impl<T: AddressResolver + ?Sized> AddressResolver for &mut T
{
    fn resolve(&mut self, request: &ResolutionRequest<'_>) -> Result<String>
    {
        (**self).resolve(request)
    }
}

impl<T: AddressResolver + ?Sized> AddressResolver for Box<T>
{
    fn resolve(&mut self, request: &ResolutionRequest<'_>) -> Result<String>
    {
        (**self).resolve(request)
    }
}

/// What happened to one backtrace line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome
{
    /// The resolver produced this text.
    Resolved(String),
    /// Not an unsymbolicated frame (blank, header, already symbolicated).
    NotAFrame,
    /// No binary image with the frame's load address and name.
    NoImage,
    /// The image has no dSYM slice in the index.
    NoSymbolFile,
    /// The resolver returned an error, carried here as text.
    ResolverFailed(String),
}

impl FrameOutcome
{
    pub fn is_resolved(&self) -> bool
    {
        matches!(self, FrameOutcome::Resolved(_))
    }

    /// The resolved text, if any.
    pub fn text(&self) -> Option<&str>
    {
        match self {
            FrameOutcome::Resolved(text) => Some(text),
            _ => None,
        }
    }
}

/// Resolves backtrace lines against one report's images and a symbol index.
pub struct FrameResolver<'a>
{
    images: &'a [BinaryImage],
    index: &'a SymbolIndex,
    resolver: &'a mut dyn AddressResolver,
}

impl<'a> FrameResolver<'a>
{
    pub fn new(images: &'a [BinaryImage], index: &'a SymbolIndex, resolver: &'a mut dyn AddressResolver) -> Self
    {
        Self {
            images,
            index,
            resolver,
        }
    }

    /// First image owning `frame`, in table order.
    pub fn find_image(&self, frame: &BacktraceLine) -> Option<&'a BinaryImage>
    {
        self.images
            .iter()
            .find(|image| image.owns(frame.load_address(), frame.image_name()))
    }

    /// First index entry holding the symbols for `image`.
    pub fn find_symbol_file(&self, image: &BinaryImage) -> Option<&'a SymbolFileInfo>
    {
        self.index.find(image)
    }

    /// Match and resolve one parsed frame.
    pub fn resolve_frame(&mut self, frame: &BacktraceLine) -> FrameOutcome
    {
        let Some(image) = self.find_image(frame) else {
            debug!(%frame, "no binary image for frame");
            return FrameOutcome::NoImage;
        };
        let Some(symbol_file) = self.find_symbol_file(image) else {
            debug!(%frame, %image, "no symbol file for image");
            return FrameOutcome::NoSymbolFile;
        };

        let request = ResolutionRequest::for_frame(frame, symbol_file);
        trace!(?request, "resolving frame");
        match self.resolver.resolve(&request) {
            Ok(text) => FrameOutcome::Resolved(first_line(&text).to_string()),
            Err(err) => {
                warn!(%frame, error = %err, "address resolution failed");
                FrameOutcome::ResolverFailed(err.to_string())
            }
        }
    }

    /// Parse and resolve one raw backtrace line.
    pub fn resolve_line(&mut self, line: &str) -> FrameOutcome
    {
        match parse_backtrace_line(line) {
            Parsed::Parsed(frame) => self.resolve_frame(&frame),
            Parsed::Skipped => FrameOutcome::NotAFrame,
        }
    }

    /// Resolve every line of a backtrace section, in order.
    pub fn resolve_lines(&mut self, lines: &[&str]) -> Vec<FrameOutcome>
    {
        lines.iter().map(|line| self.resolve_line(line)).collect()
    }
}

fn first_line(text: &str) -> &str
{
    text.lines().map(str::trim).find(|line| !line.is_empty()).unwrap_or("")
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::error::SymbolicateError;

    struct Echo;

    impl AddressResolver for Echo
    {
        fn resolve(&mut self, request: &ResolutionRequest<'_>) -> Result<String>
        {
            Ok(format!("sym@{} in {}\nsecond line", request.address(), request.symbol_path()))
        }
    }

    struct Broken;

    impl AddressResolver for Broken
    {
        fn resolve(&mut self, request: &ResolutionRequest<'_>) -> Result<String>
        {
            Err(SymbolicateError::InvalidAddress(request.address().to_string()))
        }
    }

    fn images() -> Vec<BinaryImage>
    {
        vec![
            BinaryImage::new("0x1000", "MyApp", "arm64", "aaaa"),
            BinaryImage::new("0x1000", "MyApp", "arm64", "bbbb"),
            BinaryImage::new("0x9000", "Other", "arm64", "cccc"),
        ]
    }

    #[test]
    fn test_first_listed_image_wins()
    {
        let images = images();
        let index = SymbolIndex::from_entries(vec![
            SymbolFileInfo::new("/b", "BBBB", "arm64"),
            SymbolFileInfo::new("/a", "AAAA", "arm64"),
        ]);
        let mut echo = Echo;
        let mut resolver = FrameResolver::new(&images, &index, &mut echo);

        let outcome = resolver.resolve_line("0 MyApp 0x1010 0x1000 + 16");
        assert_eq!(outcome, FrameOutcome::Resolved("sym@0x1010 in /a".to_string()));
    }

    #[test]
    fn test_lookup_misses_are_outcomes()
    {
        let images = images();
        let index = SymbolIndex::from_entries(vec![SymbolFileInfo::new("/a", "aaaa", "arm64")]);
        let mut echo = Echo;
        let mut resolver = FrameResolver::new(&images, &index, &mut echo);

        assert_eq!(resolver.resolve_line("1 Other 0x9010 0x9000 + 16"), FrameOutcome::NoSymbolFile);
        assert_eq!(resolver.resolve_line("2 Missing 0x5010 0x5000 + 16"), FrameOutcome::NoImage);
        assert_eq!(resolver.resolve_line("3 MyApp 0x1010 0x2000 + 16"), FrameOutcome::NoImage);
        assert_eq!(resolver.resolve_line(""), FrameOutcome::NotAFrame);
    }

    #[test]
    fn test_resolver_errors_do_not_propagate()
    {
        let images = images();
        let index = SymbolIndex::from_entries(vec![SymbolFileInfo::new("/a", "aaaa", "arm64")]);
        let mut broken = Broken;
        let mut resolver = FrameResolver::new(&images, &index, &mut broken);

        let outcomes = resolver.resolve_lines(&["0 MyApp 0x1010 0x1000 + 16", ""]);
        assert!(matches!(outcomes[0], FrameOutcome::ResolverFailed(_)));
        assert_eq!(outcomes[1], FrameOutcome::NotAFrame);
    }

    #[test]
    fn test_first_line_skips_blank_lines()
    {
        assert_eq!(first_line("\n  main (in MyApp)  \nmore"), "main (in MyApp)");
        assert_eq!(first_line(""), "");
    }
}
