//! # crashsym-core
//!
//! Crash report parsing, dSYM indexing and frame matching for crashsym.
//!
//! This crate turns the unsymbolicated backtrace of a text crash report into
//! function names and source lines, using whatever dSYM bundles are at hand:
//! - Extracting the crashed thread and the binary image table from a report
//! - Indexing dSYM slices by UUID and architecture
//! - Matching each frame to its image and the image to its dSYM slice
//! - Resolving addresses through `atos` or in-process DWARF parsing
//! - Splicing the results back into the original report
//!
//! ## Pipeline
//!
//! ```text
//! dSYM dir ──► SymbolIndex ─────────┐
//!                                   ├──► FrameResolver ──► render_report
//! report ───► ReportSections ───────┘
//! ```
//!
//! ## External tools
//!
//! The `tools` backend needs `dwarfdump` and `atos` from the Xcode command
//! line tools. The `native` backend needs nothing but the files.

pub mod error;
pub mod prelude;
pub mod render;
pub mod report;
pub mod resolve;
pub mod symbolicator;
pub mod symbols;
mod tools;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SymbolicateError};
pub use symbolicator::{Backend, SymbolicateOptions, SymbolicationReport, Symbolicator};
pub use types::{BacktraceLine, BinaryImage, Parsed, SymbolFileInfo};
