//! Loaded binary image type.

use std::fmt;

/// One row of the report's `Binary Images:` table
///
/// ```text
/// 0x104c3c000 - 0x104c43fff MyApp arm64  <4f8b3e0a9c2d4e1f8a7b6c5d4e3f2a1b> /private/var/.../MyApp
/// ```
///
/// The UUID is kept exactly as printed; compare it through
/// [`normalize_uuid`](super::normalize_uuid).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage
{
    load_address: String,
    name: String,
    architecture: String,
    uuid: String,
}

impl BinaryImage
{
    pub fn new(
        load_address: impl Into<String>,
        name: impl Into<String>,
        architecture: impl Into<String>,
        uuid: impl Into<String>,
    ) -> Self
    {
        Self {
            load_address: load_address.into(),
            name: name.into(),
            architecture: architecture.into(),
            uuid: uuid.into(),
        }
    }

    /// Base address the image was mapped at (hex string).
    pub fn load_address(&self) -> &str
    {
        &self.load_address
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Architecture as printed in the report (`arm64`, `arm64e`, `x86_64`).
    pub fn architecture(&self) -> &str
    {
        &self.architecture
    }

    pub fn uuid(&self) -> &str
    {
        &self.uuid
    }

    /// Whether a backtrace frame with this load address and image name
    /// belongs to this image. Both must match exactly.
    pub fn owns(&self, load_address: &str, image_name: &str) -> bool
    {
        self.load_address == load_address && self.name == image_name
    }

    /// Render this image as a row of the `Binary Images:` table.
    ///
    /// The high address column is not tracked, so the load address is
    /// repeated there; the parser ignores that column.
    pub fn to_report_line(&self) -> String
    {
        format!(
            "{:>18} - {:>18} {} {}  <{}> /{}",
            self.load_address, self.load_address, self.name, self.architecture, self.uuid, self.name
        )
    }
}

impl fmt::Display for BinaryImage
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{} {} <{}> @ {}", self.name, self.architecture, self.uuid, self.load_address)
    }
}
