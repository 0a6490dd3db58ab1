//! # Types
//!
//! Records extracted from a crash report and from the dSYM bundles on disk.
//!
//! Addresses stay as the hexadecimal strings written in the report. Matching
//! compares them textually; only a resolver backend ever turns them into
//! integers.

pub mod frame;
pub mod image;
pub mod parsed;
pub mod symbol_file;

// Re-export all public types
pub use frame::BacktraceLine;
pub use image::BinaryImage;
pub use parsed::Parsed;
pub use symbol_file::{normalize_uuid, SymbolFileInfo};
