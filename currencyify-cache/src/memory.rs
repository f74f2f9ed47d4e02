//! In-process rate cache backed by a `DashMap`.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, warn};

use currencyify_types::{CacheError, CacheKey, CacheLookup, RateCache, RateRecord};

use crate::envelope;

#[derive(Debug, Clone)]
struct MemoryEntry {
    encoded: String,
    expires_at: Instant,
}

/// Stores encoded entries with a uniform TTL. Expired entries are dropped on
/// read, and swept from the whole map on every write.
#[derive(Debug)]
pub struct InMemoryRateCache {
    entries: DashMap<String, MemoryEntry>,
    ttl: Duration,
}

impl InMemoryRateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Stores an already-encoded value under a raw key.
    pub fn insert_encoded(&self, key: &str, encoded: impl Into<String>) {
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                encoded: encoded.into(),
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }
}

#[async_trait]
impl RateCache for InMemoryRateCache {
    async fn get(&self, key: &CacheKey) -> CacheLookup {
        let raw_key = key.to_string();
        let now = Instant::now();

        let entry = self.entries.get(&raw_key).map(|e| e.value().clone());
        let Some(entry) = entry else {
            debug!(key = %raw_key, "Cache miss");
            return CacheLookup::Miss;
        };

        if entry.expires_at <= now {
            debug!(key = %raw_key, "Cache entry expired");
            self.entries.remove_if(&raw_key, |_, e| e.expires_at <= now);
            return CacheLookup::Miss;
        }

        match envelope::decode(key, &entry.encoded) {
            Ok(record) => {
                debug!(key = %raw_key, "Cache hit");
                CacheLookup::Hit(record)
            }
            Err(e) => {
                warn!(key = %raw_key, error = %e, "Discarding undecodable cache entry");
                CacheLookup::Miss
            }
        }
    }

    async fn set(&self, key: &CacheKey, record: &RateRecord) -> Result<(), CacheError> {
        let encoded = envelope::encode(record)?;
        self.evict_expired();
        self.insert_encoded(&key.to_string(), encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use currencyify_types::CurrencyCode;

    use super::*;

    fn inr() -> RateRecord {
        RateRecord::new(CurrencyCode::parse("INR").unwrap(), "82.771291", Utc::now())
    }

    fn key() -> CacheKey {
        CacheKey::bare(&CurrencyCode::parse("INR").unwrap())
    }

    #[tokio::test]
    async fn test_set_then_get_hits() {
        let cache = InMemoryRateCache::new(Duration::from_secs(60));
        let record = inr();
        cache.set(&key(), &record).await.unwrap();
        assert_eq!(cache.get(&key()).await, CacheLookup::Hit(record));
    }

    #[tokio::test]
    async fn test_unknown_key_misses() {
        let cache = InMemoryRateCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(&key()).await, CacheLookup::Miss);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = InMemoryRateCache::new(Duration::from_secs(60));
        cache.set(&key(), &inr()).await.unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(matches!(cache.get(&key()).await, CacheLookup::Hit(_)));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get(&key()).await, CacheLookup::Miss);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let cache = InMemoryRateCache::new(Duration::from_secs(60));
        cache.insert_encoded("INR", "not-base64!");
        assert_eq!(cache.get(&key()).await, CacheLookup::Miss);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = InMemoryRateCache::new(Duration::from_secs(60));
        cache.set(&key(), &inr()).await.unwrap();
        let newer = RateRecord::new(CurrencyCode::parse("INR").unwrap(), "83.1", Utc::now());
        cache.set(&key(), &newer).await.unwrap();
        assert_eq!(cache.get(&key()).await, CacheLookup::Hit(newer));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_sweeps_expired_entries() {
        let cache = InMemoryRateCache::new(Duration::from_secs(1));
        cache.set(&key(), &inr()).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        let jpy = CurrencyCode::parse("JPY").unwrap();
        let record = RateRecord::new(jpy.clone(), "150.608807", Utc::now());
        cache.set(&CacheKey::bare(&jpy), &record).await.unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&CacheKey::bare(&jpy)).await, CacheLookup::Hit(record));
    }
}
