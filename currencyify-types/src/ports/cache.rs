//! Rate cache port.
//!
//! Adapters store encoded `RateRecord`s under a `CacheKey` with a fixed TTL.
//! Cache trouble never fails a request: it surfaces as `CacheLookup::Unavailable`
//! on reads and as a logged `CacheError` on writes.

use std::fmt;
use std::sync::Arc;

use crate::domain::{CurrencyCode, RateRecord};

/// Key under which a resolved rate is cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Exchange-rate lookups: `"{BASE}-{TARGET}"`.
    Pair {
        base: CurrencyCode,
        target: CurrencyCode,
    },
    /// Conversion lookups against the implicit USD base: `"{CODE}"`.
    Bare(CurrencyCode),
}

impl CacheKey {
    pub fn pair(base: &CurrencyCode, target: &CurrencyCode) -> Self {
        CacheKey::Pair {
            base: base.clone(),
            target: target.clone(),
        }
    }

    pub fn bare(code: &CurrencyCode) -> Self {
        CacheKey::Bare(code.clone())
    }

    /// The currency whose rate lives under this key.
    pub fn target(&self) -> &CurrencyCode {
        match self {
            CacheKey::Pair { target, .. } => target,
            CacheKey::Bare(code) => code,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Pair { base, target } => write!(f, "{base}-{target}"),
            CacheKey::Bare(code) => write!(f, "{code}"),
        }
    }
}

/// Outcome of a cache probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(RateRecord),
    Miss,
    /// The store could not be asked. Callers treat this as a miss.
    Unavailable(String),
}

/// Error type for cache writes.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to encode cache entry: {0}")]
    Encode(String),
}

/// Port trait for the rate cache.
#[async_trait::async_trait]
pub trait RateCache: Send + Sync + 'static {
    /// Reads the record stored under `key`. Expired or undecodable entries are misses.
    async fn get(&self, key: &CacheKey) -> CacheLookup;

    /// Stores `record` under `key`, overwriting any previous entry.
    async fn set(&self, key: &CacheKey, record: &RateRecord) -> Result<(), CacheError>;
}

#[async_trait::async_trait]
impl<T: RateCache + ?Sized> RateCache for Arc<T> {
    async fn get(&self, key: &CacheKey) -> CacheLookup {
        (**self).get(key).await
    }

    async fn set(&self, key: &CacheKey, record: &RateRecord) -> Result<(), CacheError> {
        (**self).set(key, record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn test_pair_key_format() {
        let key = CacheKey::pair(&code("usd"), &code("inr"));
        assert_eq!(key.to_string(), "USD-INR");
        assert_eq!(key.target().as_str(), "INR");
    }

    #[test]
    fn test_bare_key_format() {
        let key = CacheKey::bare(&code("JPY"));
        assert_eq!(key.to_string(), "JPY");
    }
}
