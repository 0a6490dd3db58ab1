//! Section extraction.
//!
//! Both sections are found with the same two-state scan: stay idle until the
//! section's header line, then record lines until the section ends. The two
//! scans share no state so either can run alone.

use tracing::{debug, trace};

use super::images::parse_binary_image;
use crate::types::{BinaryImage, Parsed};

const THREAD_MARKER: &str = "Thread";
const CRASHED_MARKER: &str = "Crashed:";
const BINARY_IMAGES_MARKER: &str = "Binary Images:";
const HEX_PREFIX: &str = "0x";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState
{
    Idle,
    Recording,
}

/// The crashed thread's raw lines and where they sit in the report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BacktraceSection<'a>
{
    start_line: usize,
    lines: Vec<&'a str>,
}

impl<'a> BacktraceSection<'a>
{
    /// Raw lines after the `Thread N Crashed:` header, up to the next thread.
    pub fn lines(&self) -> &[&'a str]
    {
        &self.lines
    }

    /// Zero-based report line number of the first recorded line.
    ///
    /// Meaningless when the section is empty.
    pub fn start_line(&self) -> usize
    {
        self.start_line
    }

    pub fn is_empty(&self) -> bool
    {
        self.lines.is_empty()
    }
}

/// Extract the crashed thread's backtrace.
///
/// Recording starts after the first line containing both `Thread` and
/// `Crashed:` and stops at the next line containing `Thread`. The header
/// itself is not part of the section. Returns an empty section when there is
/// no crashed-thread header.
pub fn crashed_thread_backtrace(report: &str) -> BacktraceSection<'_>
{
    let mut state = ScanState::Idle;
    let mut section = BacktraceSection::default();

    for (number, line) in report.lines().enumerate() {
        match state {
            ScanState::Idle => {
                if line.contains(THREAD_MARKER) && line.contains(CRASHED_MARKER) {
                    trace!(line = number, "found crashed thread header");
                    section.start_line = number + 1;
                    state = ScanState::Recording;
                }
            }
            ScanState::Recording => {
                if line.contains(THREAD_MARKER) {
                    break;
                }
                section.lines.push(line);
            }
        }
    }

    debug!(lines = section.lines.len(), "extracted crashed thread backtrace");
    section
}

/// Extract the raw rows of the `Binary Images:` table.
///
/// Rows are accepted while their trimmed form starts with `0x`; the first
/// other line ends the table.
pub fn binary_image_lines(report: &str) -> Vec<&str>
{
    let mut state = ScanState::Idle;
    let mut lines = Vec::new();

    for line in report.lines() {
        match state {
            ScanState::Idle => {
                if line.contains(BINARY_IMAGES_MARKER) {
                    state = ScanState::Recording;
                }
            }
            ScanState::Recording => {
                if !line.trim().starts_with(HEX_PREFIX) {
                    break;
                }
                lines.push(line);
            }
        }
    }

    lines
}

/// Extract and parse the `Binary Images:` table. Unparsable rows are dropped.
pub fn binary_images(report: &str) -> Vec<BinaryImage>
{
    let raw = binary_image_lines(report);
    let images: Vec<BinaryImage> = raw
        .iter()
        .filter_map(|line| match parse_binary_image(line) {
            Parsed::Parsed(image) => Some(image),
            Parsed::Skipped => {
                trace!(line, "skipping unparsable binary image row");
                None
            }
        })
        .collect();

    debug!(rows = raw.len(), images = images.len(), "parsed binary image table");
    images
}

#[cfg(test)]
mod tests
{
    use super::*;

    const REPORT: &str = "\
Incident Identifier: 1B5E1A4F
Crashed Thread:        0  Dispatch queue: com.apple.main-thread

Thread 0 name:  Dispatch queue: com.apple.main-thread
Thread 0 Crashed:
0   MyApp                         0x0000000104c3f5a4 0x104c3c000 + 13732
1   libdyld.dylib                 0x00000001a0c1e8f0 0x1a0c1d000 + 6384

Thread 1:
0   libsystem_kernel.dylib        0x00000001a0b7a198 0x1a0b55000 + 151960

Binary Images:
       0x104c3c000 -        0x104c43fff MyApp arm64  <4f8b3e0a9c2d4e1f8a7b6c5d4e3f2a1b> /var/containers/MyApp
       0x1a0c1d000 -        0x1a0c4ffff libdyld.dylib arm64e  <c3e7a5c2a0f13c3a9b2e0b4b3f2a1d0e> /usr/lib/system/libdyld.dylib

EOF
";

    #[test]
    fn test_backtrace_stops_at_next_thread()
    {
        let section = crashed_thread_backtrace(REPORT);
        assert_eq!(section.lines().len(), 3);
        assert!(section.lines()[0].starts_with("0   MyApp"));
        assert!(section.lines()[1].starts_with("1   libdyld.dylib"));
        assert_eq!(section.lines()[2], "");
        assert_eq!(section.start_line(), 5);
    }

    #[test]
    fn test_crashed_thread_summary_is_not_a_header()
    {
        // "Crashed Thread:" has no "Crashed:" marker.
        let report = "Crashed Thread: 0\n0 MyApp 0x1 0x0 + 1\n";
        assert!(crashed_thread_backtrace(report).is_empty());
    }

    #[test]
    fn test_backtrace_runs_to_end_of_report()
    {
        let report = "Thread 2 Crashed:\n0 a 0x2 0x1 + 1\n1 b 0x4 0x3 + 1";
        let section = crashed_thread_backtrace(report);
        assert_eq!(section.lines(), &["0 a 0x2 0x1 + 1", "1 b 0x4 0x3 + 1"]);
        assert_eq!(section.start_line(), 1);
    }

    #[test]
    fn test_missing_sections_are_empty()
    {
        assert!(crashed_thread_backtrace("no threads here").is_empty());
        assert!(binary_image_lines("no images here").is_empty());
        assert!(binary_images("").is_empty());
    }

    #[test]
    fn test_binary_image_table_ends_at_first_non_hex_line()
    {
        let lines = binary_image_lines(REPORT);
        assert_eq!(lines.len(), 2);

        let images = binary_images(REPORT);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].name(), "MyApp");
        assert_eq!(images[1].architecture(), "arm64e");
    }

    #[test]
    fn test_extraction_is_idempotent()
    {
        assert_eq!(crashed_thread_backtrace(REPORT), crashed_thread_backtrace(REPORT));
        assert_eq!(binary_images(REPORT), binary_images(REPORT));
    }
}
