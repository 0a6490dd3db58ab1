//! Common module for library exports

pub use crate::error::{Result, SymbolicateError};
pub use crate::report::{parse_backtrace_line, parse_binary_image, ReportSections};
pub use crate::resolve::{AddressResolver, FrameOutcome, FrameResolver, ResolutionRequest};
pub use crate::symbols::{IndexOptions, SliceIdentifier, SymbolIndex};
pub use crate::types::{normalize_uuid, BacktraceLine, BinaryImage, Parsed, SymbolFileInfo};
