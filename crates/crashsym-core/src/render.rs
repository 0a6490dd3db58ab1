//! # Report Rendering
//!
//! Splices resolved symbol text back into the report.
//!
//! A resolved line keeps everything before its first `0x` (frame index and
//! image name column) and the resolver's text replaces the rest:
//!
//! ```text
//! 0   MyApp                         0x0000000104c3f5a4 0x104c3c000 + 13732
//! 0   MyApp                         main (in MyApp) (main.swift:12)
//! ```
//!
//! Every other line is emitted byte-for-byte, and the number of lines never
//! changes.

use crate::report::BacktraceSection;
use crate::resolve::FrameOutcome;

const HEX_PREFIX: &str = "0x";

/// Render one backtrace line given its outcome.
pub fn render_line(line: &str, outcome: &FrameOutcome) -> String
{
    match (outcome.text(), line.find(HEX_PREFIX)) {
        (Some(text), Some(position)) => format!("{}{text}", &line[..position]),
        _ => line.to_string(),
    }
}

/// Render a backtrace section, one output line per input line.
///
/// Lines without a matching outcome are emitted unchanged.
pub fn render_backtrace(lines: &[&str], outcomes: &[FrameOutcome]) -> Vec<String>
{
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| match outcomes.get(i) {
            Some(outcome) => render_line(line, outcome),
            None => (*line).to_string(),
        })
        .collect()
}

/// Re-emit the whole report with the backtrace section replaced by `rendered`.
///
/// Line terminators (`\n` or `\r\n`) and a missing final newline are
/// preserved, so a report with nothing resolved comes back byte-identical.
pub fn render_report(report: &str, section: &BacktraceSection<'_>, rendered: &[String]) -> String
{
    let start = section.start_line();
    let end = start + rendered.len().min(section.lines().len());
    let mut output = String::with_capacity(report.len());

    for (number, chunk) in report.split_inclusive('\n').enumerate() {
        if (start..end).contains(&number) {
            let content_len = chunk.strip_suffix('\n').map_or(chunk.len(), |rest| {
                rest.strip_suffix('\r').map_or(rest.len(), str::len)
            });
            output.push_str(&rendered[number - start]);
            output.push_str(&chunk[content_len..]);
        } else {
            output.push_str(chunk);
        }
    }

    output
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::report::crashed_thread_backtrace;

    #[test]
    fn test_resolved_line_keeps_prefix()
    {
        let line = "0   MyApp                         0x0000000104c3f5a4 0x104c3c000 + 13732";
        let outcome = FrameOutcome::Resolved("main (in MyApp) (main.swift:12)".to_string());
        assert_eq!(
            render_line(line, &outcome),
            "0   MyApp                         main (in MyApp) (main.swift:12)"
        );
    }

    #[test]
    fn test_unresolved_lines_are_unchanged()
    {
        let lines = ["0   MyApp 0x10 0x0 + 16", "", "1   Other 0x20 0x0 + 32"];
        let outcomes = [FrameOutcome::NoSymbolFile, FrameOutcome::NotAFrame, FrameOutcome::NoImage];
        let rendered = render_backtrace(&lines, &outcomes);
        assert_eq!(rendered, lines);
    }

    #[test]
    fn test_missing_outcomes_pass_through()
    {
        let lines = ["0   MyApp 0x10 0x0 + 16", "1   MyApp 0x20 0x0 + 32"];
        let outcomes = [FrameOutcome::Resolved("f".to_string())];
        let rendered = render_backtrace(&lines, &outcomes);
        assert_eq!(rendered, ["0   MyApp f", "1   MyApp 0x20 0x0 + 32"]);
    }

    #[test]
    fn test_render_report_splices_section()
    {
        let report = "Header\r\nThread 0 Crashed:\r\n0 A 0x2 0x1 + 1\r\n1 B 0x4 0x3 + 1\r\nThread 1:\r\nTail";
        let section = crashed_thread_backtrace(report);
        let rendered = vec!["0 A resolved".to_string(), "1 B 0x4 0x3 + 1".to_string()];
        assert_eq!(
            render_report(report, &section, &rendered),
            "Header\r\nThread 0 Crashed:\r\n0 A resolved\r\n1 B 0x4 0x3 + 1\r\nThread 1:\r\nTail"
        );
    }

    #[test]
    fn test_render_report_without_changes_is_identity()
    {
        let report = "Thread 0 Crashed:\n0 A 0x2 0x1 + 1\n\nBinary Images:\n";
        let section = crashed_thread_backtrace(report);
        let rendered: Vec<String> = section.lines().iter().map(|line| (*line).to_string()).collect();
        assert_eq!(render_report(report, &section, &rendered), report);
    }
}
