//! `Binary Images:` row tokenizer.

use crate::types::{BinaryImage, Parsed};

/// Parse one row of the binary image table.
///
/// ```text
/// 0x104c3c000 - 0x104c43fff MyApp arm64  <4f8b3e0a9c2d4e1f8a7b6c5d4e3f2a1b> /var/containers/MyApp
/// ```
///
/// The first column is the load address. The `-` and high address columns
/// are dropped; what remains splits on `<` into a name/arch block and the
/// `<uuid>` identity block. The path after `>` is ignored.
///
/// Returns `Skipped` when any of those delimiters is missing.
pub fn parse_binary_image(line: &str) -> Parsed<BinaryImage>
{
    parse(line).into()
}

fn parse(line: &str) -> Option<BinaryImage>
{
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (load_address, rest) = tokens.split_first()?;
    // "-" and the high address
    let rest = rest.get(2..)?.join(" ");

    let (name_arch, identity) = rest.split_once('<')?;
    let (uuid, _path) = identity.split_once('>')?;
    let uuid = uuid.trim();
    if uuid.is_empty() {
        return None;
    }

    let mut name_arch: Vec<&str> = name_arch.split_whitespace().collect();
    let architecture = name_arch.pop()?;
    let name = name_arch.join(" ");
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some(BinaryImage::new(*load_address, name, architecture, uuid))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_ios_row()
    {
        let line = "       0x104c3c000 -        0x104c43fff MyApp arm64  <4f8b3e0a9c2d4e1f8a7b6c5d4e3f2a1b> /private/var/containers/Bundle/Application/MyApp.app/MyApp";
        let image = parse_binary_image(line).ok().unwrap();
        assert_eq!(image.load_address(), "0x104c3c000");
        assert_eq!(image.name(), "MyApp");
        assert_eq!(image.architecture(), "arm64");
        assert_eq!(image.uuid(), "4f8b3e0a9c2d4e1f8a7b6c5d4e3f2a1b");
    }

    #[test]
    fn test_parse_name_with_spaces()
    {
        let line = "0x100000000 - 0x100ffffff My Helper App x86_64 <AAAABBBB-CCCC-DDDD-EEEE-FFFF00001111> /Applications/My Helper App";
        let image = parse_binary_image(line).ok().unwrap();
        assert_eq!(image.name(), "My Helper App");
        assert_eq!(image.architecture(), "x86_64");
        assert_eq!(image.uuid(), "AAAABBBB-CCCC-DDDD-EEEE-FFFF00001111");
    }

    #[test]
    fn test_render_round_trip()
    {
        let images = [
            BinaryImage::new("0x104c3c000", "MyApp", "arm64", "4f8b3e0a9c2d4e1f8a7b6c5d4e3f2a1b"),
            BinaryImage::new("0x1a0c1d000", "libdyld.dylib", "arm64e", "C3E7A5C2-A0F1-3C3A-9B2E-0B4B3F2A1D0E"),
            BinaryImage::new("0x100000000", "Some Framework", "x86_64", "00112233445566778899aabbccddeeff"),
        ];
        for image in images {
            assert_eq!(parse_binary_image(&image.to_report_line()), Parsed::Parsed(image));
        }
    }

    #[test]
    fn test_skips_rows_missing_delimiters()
    {
        assert_eq!(parse_binary_image(""), Parsed::Skipped);
        assert_eq!(parse_binary_image("0x1000 - 0x2000"), Parsed::Skipped);
        assert_eq!(parse_binary_image("0x1000 - 0x2000 MyApp arm64 /no/uuid"), Parsed::Skipped);
        assert_eq!(parse_binary_image("0x1000 - 0x2000 MyApp arm64 <unterminated"), Parsed::Skipped);
        assert_eq!(parse_binary_image("0x1000 - 0x2000 arm64 <aabb> /path"), Parsed::Skipped);
        assert_eq!(parse_binary_image("0x1000 - 0x2000 MyApp arm64 <> /path"), Parsed::Skipped);
    }
}
