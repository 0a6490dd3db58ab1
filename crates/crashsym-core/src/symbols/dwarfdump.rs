//! Slice identification through `dwarfdump --uuid`.

use std::path::Path;

use super::SliceIdentifier;
use crate::error::Result;
use crate::tools;

const DWARFDUMP: &str = "dwarfdump";

/// Identifies slices by running `dwarfdump --uuid <slice>`.
///
/// Requires the Xcode command line tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct DwarfdumpIdentifier;

impl SliceIdentifier for DwarfdumpIdentifier
{
    fn identify(&self, slice: &Path) -> Result<String>
    {
        tools::run(DWARFDUMP, [Path::new("--uuid"), slice])
    }
}
