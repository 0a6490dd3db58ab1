//! Backtrace frame tokenizer.

use crate::types::{BacktraceLine, Parsed};

const HEX_PREFIX: &str = "0x";

/// Parse one unsymbolicated frame of the crashed thread.
///
/// ```text
/// 0   MyApp                         0x0000000104c3f5a4 0x104c3c000 + 13732
/// ```
///
/// The `+ <offset>` suffix is dropped, then the last two tokens are the
/// address and the load address and everything between the frame index and
/// them is the image name.
///
/// Returns `Skipped` for blank lines, non-frame lines, and frames that are
/// already symbolicated (their last two tokens are not both `0x` values).
pub fn parse_backtrace_line(line: &str) -> Parsed<BacktraceLine>
{
    parse(line).into()
}

fn parse(line: &str) -> Option<BacktraceLine>
{
    let (frame_index, rest) = line.trim().split_once(char::is_whitespace)?;
    if !frame_index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let rest = strip_offset_suffix(rest);
    let mut tokens: Vec<&str> = rest.split_whitespace().collect();
    let load_address = tokens.pop()?;
    let address = tokens.pop()?;
    if tokens.is_empty() || !address.starts_with(HEX_PREFIX) || !load_address.starts_with(HEX_PREFIX) {
        return None;
    }

    Some(BacktraceLine::new(frame_index, tokens.join(" "), address, load_address))
}

/// Remove a trailing `+ 13732` (digits, then `+`, with surrounding whitespace).
///
/// Left untouched when there is no `+` before the digits, so the last hex
/// digits of a bare load address survive.
fn strip_offset_suffix(rest: &str) -> &str
{
    let rest = rest.trim_end();
    rest.trim_end_matches(|c: char| c.is_ascii_digit())
        .trim_end()
        .strip_suffix('+')
        .map_or(rest, str::trim_end)
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn triple(line: &str) -> (String, String, String)
    {
        let frame = parse_backtrace_line(line).ok().unwrap();
        (
            frame.image_name().to_string(),
            frame.address().to_string(),
            frame.load_address().to_string(),
        )
    }

    #[test]
    fn test_parse_unsymbolicated_frame()
    {
        let frame = parse_backtrace_line("0   MyApp                         0x0000000104c3f5a4 0x104c3c000 + 13732")
            .ok()
            .unwrap();
        assert_eq!(frame.frame_index(), "0");
        assert_eq!(frame.image_name(), "MyApp");
        assert_eq!(frame.address(), "0x0000000104c3f5a4");
        assert_eq!(frame.load_address(), "0x104c3c000");
    }

    #[test]
    fn test_frame_index_width_and_offset_do_not_matter()
    {
        let expected = ("UIKitCore".to_string(), "0x00000001a3b2c1d0".to_string(), "0x1a3000000".to_string());
        assert_eq!(triple("7 UIKitCore 0x00000001a3b2c1d0 0x1a3000000 + 11715024"), expected);
        assert_eq!(triple("117   UIKitCore 0x00000001a3b2c1d0 0x1a3000000 + 11715024"), expected);
        assert_eq!(triple("7 UIKitCore 0x00000001a3b2c1d0 0x1a3000000"), expected);
        assert_eq!(triple("7 UIKitCore 0x00000001a3b2c1d0 0x1a3000000+42  "), expected);
    }

    #[test]
    fn test_image_name_keeps_inner_spaces()
    {
        let (name, address, load) = triple("3   My Helper 0x0000000100003f10 0x100000000 + 16144");
        assert_eq!(name, "My Helper");
        assert_eq!(address, "0x0000000100003f10");
        assert_eq!(load, "0x100000000");
    }

    #[test]
    fn test_skips_symbolicated_and_non_frame_lines()
    {
        assert_eq!(parse_backtrace_line(""), Parsed::Skipped);
        assert_eq!(parse_backtrace_line("   "), Parsed::Skipped);
        assert_eq!(
            parse_backtrace_line("0   MyApp   0x0000000104c3f5a4 main + 40 (main.swift:12)"),
            Parsed::Skipped
        );
        assert_eq!(parse_backtrace_line("Thread 0 Crashed:"), Parsed::Skipped);
        assert_eq!(parse_backtrace_line("0   0x0000000104c3f5a4 0x104c3c000 + 13732"), Parsed::Skipped);
    }
}
