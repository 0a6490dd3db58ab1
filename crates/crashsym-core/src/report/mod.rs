//! # Crash Report Parsing
//!
//! Pulls the two sections symbolication needs out of a text crash report:
//! the crashed thread's backtrace and the `Binary Images:` table.
//!
//! Each line kind has its own small tokenizer returning [`Parsed`], because
//! the report format mixes many line kinds and most lines are expected not to
//! match. Nothing in this module fails.
//!
//! ## Example
//!
//! ```rust
//! use crashsym_core::report::ReportSections;
//!
//! let report = "\
//! Thread 0 Crashed:
//! 0   MyApp   0x0000000104c3f5a4 0x104c3c000 + 13732
//!
//! Thread 0 crashed with ARM Thread State (64-bit):
//!     x0: 0x0000000000000000
//!
//! Binary Images:
//!        0x104c3c000 -        0x104c43fff MyApp arm64  <4f8b3e0a9c2d4e1f8a7b6c5d4e3f2a1b> /var/MyApp
//! ";
//!
//! let sections = ReportSections::extract(report);
//! assert_eq!(sections.backtrace.lines().len(), 2);
//! assert_eq!(sections.images.len(), 1);
//! assert_eq!(sections.images[0].name(), "MyApp");
//! ```
//!
//! [`Parsed`]: crate::types::Parsed

mod backtrace;
mod images;
mod sections;

pub use backtrace::parse_backtrace_line;
pub use images::parse_binary_image;
pub use sections::{binary_image_lines, binary_images, crashed_thread_backtrace, BacktraceSection};

use crate::types::BinaryImage;

/// Both sections of one report.
#[derive(Debug, Clone, Default)]
pub struct ReportSections<'a>
{
    /// Raw lines of the crashed thread, in report order.
    pub backtrace: BacktraceSection<'a>,
    /// Parsed rows of the binary image table, in table order.
    pub images: Vec<BinaryImage>,
}

impl<'a> ReportSections<'a>
{
    /// Run both extractions over `report`.
    ///
    /// The two scans are independent; either may come back empty.
    pub fn extract(report: &'a str) -> Self
    {
        Self {
            backtrace: crashed_thread_backtrace(report),
            images: binary_images(report),
        }
    }
}
