//! Backtrace frame type.

use std::fmt;

/// One frame of the crashed thread, as written in the report
///
/// ```text
/// 3   MyApp                         0x0000000104c3f5a4 0x104c3c000 + 13732
/// ^   ^                             ^                  ^
/// |   image_name                    address            load_address
/// frame_index
/// ```
///
/// Only unsymbolicated frames produce a `BacktraceLine`; lines that already
/// carry a symbol name are left to pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacktraceLine
{
    frame_index: String,
    image_name: String,
    address: String,
    load_address: String,
}

impl BacktraceLine
{
    pub fn new(
        frame_index: impl Into<String>,
        image_name: impl Into<String>,
        address: impl Into<String>,
        load_address: impl Into<String>,
    ) -> Self
    {
        Self {
            frame_index: frame_index.into(),
            image_name: image_name.into(),
            address: address.into(),
            load_address: load_address.into(),
        }
    }

    /// Frame number as printed (`"0"`, `"12"`).
    pub fn frame_index(&self) -> &str
    {
        &self.frame_index
    }

    /// Name of the binary image that owns the frame. May contain spaces.
    pub fn image_name(&self) -> &str
    {
        &self.image_name
    }

    /// Faulting instruction address (hex string).
    pub fn address(&self) -> &str
    {
        &self.address
    }

    /// Load address of the owning image (hex string).
    pub fn load_address(&self) -> &str
    {
        &self.load_address
    }
}

impl fmt::Display for BacktraceLine
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(
            f,
            "#{} {} {} (load {})",
            self.frame_index, self.image_name, self.address, self.load_address
        )
    }
}
