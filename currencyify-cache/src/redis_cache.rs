//! Redis rate cache.
//!
//! Values are envelope strings stored with `SET key value EX ttl`. Every
//! command is bounded by an operation timeout so that a stalled server turns
//! into a cache miss instead of a stalled request.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::time::timeout;
use tracing::{debug, warn};

use currencyify_types::{CacheError, CacheKey, CacheLookup, RateCache, RateRecord};

use crate::envelope;

/// Redis-backed cache sharing one auto-reconnecting connection.
#[derive(Clone)]
pub struct RedisRateCache {
    conn: ConnectionManager,
    ttl: Duration,
    op_timeout: Duration,
}

impl RedisRateCache {
    /// Connects to `redis_url`, waiting at most `op_timeout` for the first connection.
    pub async fn connect(redis_url: &str, ttl: Duration, op_timeout: Duration) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)
            .with_context(|| format!("Failed to create Redis client for {redis_url}"))?;

        let conn = timeout(op_timeout, ConnectionManager::new(client))
            .await
            .context("Timed out connecting to Redis")?
            .context("Failed to connect to Redis")?;

        debug!("Connected to Redis at: {}", redis_url);

        Ok(Self {
            conn,
            ttl,
            op_timeout,
        })
    }

    fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs().max(1)
    }
}

#[async_trait]
impl RateCache for RedisRateCache {
    async fn get(&self, key: &CacheKey) -> CacheLookup {
        let raw_key = key.to_string();
        let mut conn = self.conn.clone();

        let reply: Result<Option<String>, redis::RedisError> = match timeout(
            self.op_timeout,
            redis::cmd("GET").arg(&raw_key).query_async(&mut conn),
        )
        .await
        {
            Ok(reply) => reply,
            Err(_) => {
                warn!(key = %raw_key, "Redis GET timed out");
                return CacheLookup::Unavailable("Redis GET timed out".into());
            }
        };

        match reply {
            Ok(Some(text)) => match envelope::decode(key, &text) {
                Ok(record) => {
                    debug!(key = %raw_key, "Cache hit");
                    CacheLookup::Hit(record)
                }
                Err(e) => {
                    warn!(key = %raw_key, error = %e, "Discarding undecodable cache entry");
                    CacheLookup::Miss
                }
            },
            Ok(None) => {
                debug!(key = %raw_key, "Cache miss");
                CacheLookup::Miss
            }
            Err(e) => {
                warn!(key = %raw_key, error = %e, "Redis GET failed");
                CacheLookup::Unavailable(e.to_string())
            }
        }
    }

    async fn set(&self, key: &CacheKey, record: &RateRecord) -> Result<(), CacheError> {
        let raw_key = key.to_string();
        let encoded = envelope::encode(record)?;
        let mut conn = self.conn.clone();

        let reply: Result<(), redis::RedisError> = timeout(
            self.op_timeout,
            redis::cmd("SET")
                .arg(&raw_key)
                .arg(encoded)
                .arg("EX")
                .arg(self.ttl_secs())
                .query_async(&mut conn),
        )
        .await
        .map_err(|_| CacheError::Unavailable("Redis SET timed out".into()))?;

        reply.map_err(|e| CacheError::Unavailable(format!("Redis SET failed: {e}")))?;
        debug!(key = %raw_key, ttl_secs = self.ttl_secs(), "Stored rate in cache");
        Ok(())
    }
}

/// These run against a live server: `REDIS_URL=redis://127.0.0.1:6379 cargo test -- --ignored`.
#[cfg(test)]
mod tests {
    use chrono::Utc;
    use currencyify_types::CurrencyCode;

    use super::*;

    async fn connect() -> RedisRateCache {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        RedisRateCache::connect(&url, Duration::from_secs(120), Duration::from_secs(2))
            .await
            .unwrap()
    }

    async fn fresh_key(cache: &RedisRateCache, base: &str, target: &str) -> CacheKey {
        let key = CacheKey::pair(
            &CurrencyCode::parse(base).unwrap(),
            &CurrencyCode::parse(target).unwrap(),
        );
        let mut conn = cache.conn.clone();
        let _: () = redis::cmd("DEL")
            .arg(key.to_string())
            .query_async(&mut conn)
            .await
            .unwrap();
        key
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_set_stores_with_expiry_then_hits() {
        let cache = connect().await;
        let key = fresh_key(&cache, "XTS", "INR").await;

        assert_eq!(cache.get(&key).await, CacheLookup::Miss);

        let record = RateRecord::new(key.target().clone(), "82.771291", Utc::now());
        cache.set(&key, &record).await.unwrap();
        assert_eq!(cache.get(&key).await, CacheLookup::Hit(record));

        let mut conn = cache.conn.clone();
        let ttl: i64 = redis::cmd("TTL")
            .arg(key.to_string())
            .query_async(&mut conn)
            .await
            .unwrap();
        assert!(ttl > 0 && ttl <= 120, "unexpected ttl {ttl}");
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_undecodable_entry_is_a_miss() {
        let cache = connect().await;
        let key = fresh_key(&cache, "XTS", "JPY").await;

        let mut conn = cache.conn.clone();
        let _: () = redis::cmd("SET")
            .arg(key.to_string())
            .arg("not-base64!")
            .query_async(&mut conn)
            .await
            .unwrap();

        assert_eq!(cache.get(&key).await, CacheLookup::Miss);
    }
}
