//! # Resolution Cache
//!
//! Remembers resolver answers by request.
//!
//! Resolvers are deterministic, so a repeated `(arch, path, load address,
//! address)` tuple (recursion, repeated frames) can reuse the first answer
//! instead of spawning `atos` again. Errors are not cached.

use std::collections::HashMap;

use tracing::trace;

use super::{AddressResolver, ResolutionRequest};
use crate::error::Result;

type RequestKey = (String, String, String, String);

/// Memoizing wrapper around another resolver.
///
/// ## Thread Safety
///
/// The cache is not thread-safe. Runs are sequential, so it never needs to be.
pub struct CachingResolver<R>
{
    inner: R,
    answers: HashMap<RequestKey, String>,
    hits: usize,
}

impl<R: AddressResolver> CachingResolver<R>
{
    pub fn new(inner: R) -> Self
    {
        Self {
            inner,
            answers: HashMap::new(),
            hits: 0,
        }
    }

    /// Number of requests answered from the cache.
    pub fn hits(&self) -> usize
    {
        self.hits
    }

    /// Number of distinct requests remembered.
    pub fn len(&self) -> usize
    {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.answers.is_empty()
    }

    pub fn into_inner(self) -> R
    {
        self.inner
    }
}

fn key(request: &ResolutionRequest<'_>) -> RequestKey
{
    (
        request.architecture().to_string(),
        request.symbol_path().to_string(),
        request.load_address().to_string(),
        request.address().to_string(),
    )
}

impl<R: AddressResolver> AddressResolver for CachingResolver<R>
{
    fn resolve(&mut self, request: &ResolutionRequest<'_>) -> Result<String>
    {
        let key = key(request);
        if let Some(answer) = self.answers.get(&key) {
            self.hits += 1;
            trace!(address = request.address(), "resolution cache hit");
            return Ok(answer.clone());
        }

        let answer = self.inner.resolve(request)?;
        self.answers.insert(key, answer.clone());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::error::SymbolicateError;

    #[derive(Default)]
    struct Counting
    {
        calls: usize,
    }

    impl AddressResolver for Counting
    {
        fn resolve(&mut self, request: &ResolutionRequest<'_>) -> Result<String>
        {
            self.calls += 1;
            if request.address() == "bad" {
                return Err(SymbolicateError::InvalidAddress("bad".to_string()));
            }
            Ok(format!("fn_{}", request.address()))
        }
    }

    #[test]
    fn test_repeated_requests_hit_cache()
    {
        let mut cache = CachingResolver::new(Counting::default());
        let request = ResolutionRequest::new("arm64", "/a", "0x1000", "0x1010");

        assert_eq!(cache.resolve(&request).unwrap(), "fn_0x1010");
        assert_eq!(cache.resolve(&request).unwrap(), "fn_0x1010");
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.into_inner().calls, 1);
    }

    #[test]
    fn test_architecture_is_part_of_the_key()
    {
        let mut cache = CachingResolver::new(Counting::default());
        cache.resolve(&ResolutionRequest::new("arm64", "/a", "0x1000", "0x1010")).unwrap();
        cache.resolve(&ResolutionRequest::new("x86_64", "/a", "0x1000", "0x1010")).unwrap();
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_errors_are_not_cached()
    {
        let mut cache = CachingResolver::new(Counting::default());
        let request = ResolutionRequest::new("arm64", "/a", "0x1000", "bad");
        assert!(cache.resolve(&request).is_err());
        assert!(cache.resolve(&request).is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.into_inner().calls, 2);
    }
}
