//! Address resolution through `atos`.

use tracing::debug;

use super::{AddressResolver, ResolutionRequest};
use crate::error::Result;
use crate::tools;

const ATOS: &str = "atos";

/// Resolves addresses by running
/// `atos -arch <arch> -o <dwarf file> -l <load address> <address>`.
///
/// One process per frame. Wrap in a
/// [`CachingResolver`](super::CachingResolver) to avoid repeating calls for
/// recursive frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtosResolver;

impl AtosResolver
{
    fn args<'r>(request: &ResolutionRequest<'r>) -> [&'r str; 7]
    {
        [
            "-arch",
            request.architecture(),
            "-o",
            request.symbol_path(),
            "-l",
            request.load_address(),
            request.address(),
        ]
    }
}

impl AddressResolver for AtosResolver
{
    fn resolve(&mut self, request: &ResolutionRequest<'_>) -> Result<String>
    {
        debug!(
            "{ATOS} -arch {} -o {} -l {} {}",
            request.architecture(),
            request.symbol_path().replace(' ', "\\ "),
            request.load_address(),
            request.address()
        );
        let output = tools::run(ATOS, Self::args(request))?;
        Ok(output.trim().to_string())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_atos_arguments()
    {
        let request = ResolutionRequest::new("arm64", "/tmp/My App", "0x104c3c000", "0x0000000104c3f5a4");
        assert_eq!(
            AtosResolver::args(&request),
            ["-arch", "arm64", "-o", "/tmp/My App", "-l", "0x104c3c000", "0x0000000104c3f5a4"]
        );
    }
}
