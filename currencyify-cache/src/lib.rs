//! # Currencyify Cache
//!
//! Concrete cache implementations (adapters) for the currencyify service.
//! This crate provides stores that implement the `RateCache` port.
//!
//! All adapters share the same envelope (JSON wrapped in base64) and apply
//! one TTL to every entry.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use currencyify_types::{CacheError, CacheKey, CacheLookup, RateCache, RateRecord};

pub mod envelope;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_cache;

pub use memory::InMemoryRateCache;
#[cfg(feature = "redis")]
pub use redis_cache::RedisRateCache;

/// Settings applied uniformly by every adapter.
#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    /// Lifetime of every entry.
    pub ttl: Duration,
    /// Upper bound on a single store operation.
    pub op_timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            op_timeout: Duration::from_millis(500),
        }
    }
}

/// Unified cache wrapper selected from a URL at startup.
pub enum CacheStore {
    Memory(InMemoryRateCache),
    #[cfg(feature = "redis")]
    Redis(RedisRateCache),
    /// No usable store: every read is `Unavailable`, so every lookup fetches.
    Disabled(String),
}

/// Build a cache from a URL.
///
/// - `memory://` - in-process store
/// - `redis://host:port` / `rediss://host:port` - Redis
///
/// An unreachable Redis is not fatal: the service starts with a disabled
/// cache and fetches every rate.
///
/// # Examples
///
/// ```ignore
/// let cache = build_cache("redis://localhost:6379", CacheSettings::default()).await?;
/// ```
pub async fn build_cache(url: &str, settings: CacheSettings) -> anyhow::Result<CacheStore> {
    let scheme = url.split("://").next().unwrap_or_default();
    match scheme {
        "memory" => {
            info!(ttl_secs = settings.ttl.as_secs(), "Using in-memory rate cache");
            Ok(CacheStore::Memory(InMemoryRateCache::new(settings.ttl)))
        }
        #[cfg(feature = "redis")]
        "redis" | "rediss" => {
            match RedisRateCache::connect(url, settings.ttl, settings.op_timeout).await {
                Ok(cache) => {
                    info!(ttl_secs = settings.ttl.as_secs(), "Using Redis rate cache");
                    Ok(CacheStore::Redis(cache))
                }
                Err(e) => {
                    warn!(error = %e, "Redis unavailable, rate cache disabled");
                    Ok(CacheStore::Disabled(format!("{e:#}")))
                }
            }
        }
        other => anyhow::bail!("Unsupported cache URL scheme: {other:?}"),
    }
}

impl CacheStore {
    pub fn kind(&self) -> &'static str {
        match self {
            CacheStore::Memory(_) => "memory",
            #[cfg(feature = "redis")]
            CacheStore::Redis(_) => "redis",
            CacheStore::Disabled(_) => "disabled",
        }
    }
}

#[async_trait]
impl RateCache for CacheStore {
    async fn get(&self, key: &CacheKey) -> CacheLookup {
        match self {
            CacheStore::Memory(cache) => cache.get(key).await,
            #[cfg(feature = "redis")]
            CacheStore::Redis(cache) => cache.get(key).await,
            CacheStore::Disabled(reason) => CacheLookup::Unavailable(reason.clone()),
        }
    }

    async fn set(&self, key: &CacheKey, record: &RateRecord) -> Result<(), CacheError> {
        match self {
            CacheStore::Memory(cache) => cache.set(key, record).await,
            #[cfg(feature = "redis")]
            CacheStore::Redis(cache) => cache.set(key, record).await,
            CacheStore::Disabled(reason) => Err(CacheError::Unavailable(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use currencyify_types::CurrencyCode;

    use super::*;

    #[tokio::test]
    async fn test_build_memory_cache() {
        let cache = build_cache("memory://", CacheSettings::default()).await.unwrap();
        assert_eq!(cache.kind(), "memory");

        let key = CacheKey::bare(&CurrencyCode::parse("INR").unwrap());
        let record = RateRecord::new(key.target().clone(), "82.771291", Utc::now());
        cache.set(&key, &record).await.unwrap();
        assert_eq!(cache.get(&key).await, CacheLookup::Hit(record));
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        assert!(build_cache("memcached://localhost", CacheSettings::default()).await.is_err());
    }

    #[cfg(feature = "redis")]
    #[tokio::test]
    async fn test_unreachable_redis_disables_cache() {
        let settings = CacheSettings {
            op_timeout: Duration::from_millis(300),
            ..CacheSettings::default()
        };
        let cache = build_cache("redis://127.0.0.1:1", settings).await.unwrap();
        assert_eq!(cache.kind(), "disabled");

        let key = CacheKey::bare(&CurrencyCode::usd());
        assert!(matches!(cache.get(&key).await, CacheLookup::Unavailable(_)));
        let record = RateRecord::new(CurrencyCode::usd(), "1", Utc::now());
        assert!(matches!(
            cache.set(&key, &record).await,
            Err(CacheError::Unavailable(_))
        ));
    }
}
