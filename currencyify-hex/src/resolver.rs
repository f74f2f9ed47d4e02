//! Rate Resolver
//!
//! Cache-aside resolution of exchange rates. Every requested code is probed in
//! the cache; the misses are fetched from the provider in a single call and
//! written back. Concurrent resolvers share one provider call per key.

use std::collections::{HashMap, HashSet};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use currencyify_types::{
    CacheKey, CacheLookup, CurrencyCode, ProviderError, RateCache, RateProvider, RateRecord,
};

/// Published by the resolver that leads the fetch for a key.
type Outcome = Option<Result<RateRecord, ProviderError>>;

type InFlight = DashMap<CacheKey, watch::Receiver<Outcome>>;

enum Claim {
    Lead(watch::Sender<Outcome>),
    Follow(watch::Receiver<Outcome>),
}

/// Clears the leader's keys from the in-flight map, even when the leader is
/// dropped mid-fetch.
struct InFlightGuard<'a> {
    in_flight: &'a InFlight,
    keys: &'a [CacheKey],
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        for key in self.keys {
            self.in_flight.remove(key);
        }
    }
}

/// Resolves rates through the cache, falling back to the provider.
///
/// Generic over both ports so tests can count cache and provider calls.
pub struct RateResolver<C: RateCache, P: RateProvider> {
    cache: C,
    provider: P,
    in_flight: InFlight,
}

impl<C: RateCache, P: RateProvider> RateResolver<C, P> {
    pub fn new(cache: C, provider: P) -> Self {
        Self {
            cache,
            provider,
            in_flight: DashMap::new(),
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Rates of `targets` against `base`, cached under `"{BASE}-{TARGET}"` keys.
    ///
    /// Either every target resolves or the whole call fails; cache hits
    /// gathered before a provider failure are discarded.
    #[tracing::instrument(skip(self, targets), fields(base = %base, targets = targets.len()))]
    pub async fn resolve(
        &self,
        base: &CurrencyCode,
        targets: &[CurrencyCode],
    ) -> Result<HashMap<CurrencyCode, RateRecord>, ProviderError> {
        let keys = targets
            .iter()
            .map(|target| CacheKey::pair(base, target))
            .collect();
        self.resolve_keys(base, keys).await
    }

    /// Rate of `code` against USD, cached under the bare `"{CODE}"` key.
    #[tracing::instrument(skip(self), fields(code = %code))]
    pub async fn resolve_usd(&self, code: &CurrencyCode) -> Result<RateRecord, ProviderError> {
        let mut records = self
            .resolve_keys(&CurrencyCode::usd(), vec![CacheKey::bare(code)])
            .await?;
        records
            .remove(code)
            .ok_or_else(|| ProviderError::MissingCurrency(code.clone()))
    }

    async fn resolve_keys(
        &self,
        base: &CurrencyCode,
        mut keys: Vec<CacheKey>,
    ) -> Result<HashMap<CurrencyCode, RateRecord>, ProviderError> {
        // A key listed twice would wait on its own fetch.
        let mut seen = HashSet::with_capacity(keys.len());
        keys.retain(|key| seen.insert(key.clone()));

        let mut resolved = HashMap::with_capacity(keys.len());
        let mut pending = Vec::new();
        for key in keys {
            match self.cache.get(&key).await {
                CacheLookup::Hit(record) => {
                    resolved.insert(key.target().clone(), record);
                }
                CacheLookup::Miss => pending.push(key),
                CacheLookup::Unavailable(reason) => {
                    warn!(key = %key, reason = %reason, "Cache unavailable, treating as miss");
                    pending.push(key);
                }
            }
        }

        if pending.is_empty() {
            debug!(count = resolved.len(), "All rates served from cache");
            return Ok(resolved);
        }

        let mut leading = Vec::new();
        let mut senders = Vec::new();
        let mut following = Vec::new();
        for key in pending {
            match self.claim(&key) {
                Claim::Lead(tx) => {
                    leading.push(key);
                    senders.push(tx);
                }
                Claim::Follow(rx) => following.push((key, rx)),
            }
        }

        if !leading.is_empty() {
            let _guard = InFlightGuard {
                in_flight: &self.in_flight,
                keys: &leading,
            };
            match self.fetch_and_store(base, &leading).await {
                Ok(records) => {
                    for (key, tx) in leading.iter().zip(&senders) {
                        let outcome = records.get(key.target()).cloned().map(Ok);
                        tx.send_replace(outcome);
                    }
                    resolved.extend(records);
                }
                Err(e) => {
                    // Followers of keys the error does not cover see a closed
                    // channel and fetch those keys themselves.
                    for (key, tx) in leading.iter().zip(senders) {
                        if e.affects(key.target()) {
                            tx.send_replace(Some(Err(e.clone())));
                        }
                    }
                    return Err(e);
                }
            }
        }

        let mut orphaned = Vec::new();
        for (key, mut rx) in following {
            let outcome: Outcome = match rx.wait_for(Option::is_some).await {
                Ok(published) => published.clone(),
                Err(_) => None,
            };
            match outcome {
                Some(Ok(record)) => {
                    debug!(key = %key, "Shared in-flight fetch");
                    resolved.insert(key.target().clone(), record);
                }
                Some(Err(e)) => return Err(e),
                None => {
                    debug!(key = %key, "In-flight fetch abandoned, fetching directly");
                    orphaned.push(key);
                }
            }
        }

        if !orphaned.is_empty() {
            resolved.extend(self.fetch_and_store(base, &orphaned).await?);
        }

        Ok(resolved)
    }

    fn claim(&self, key: &CacheKey) -> Claim {
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => Claim::Follow(entry.get().clone()),
            Entry::Vacant(entry) => {
                let (tx, rx) = watch::channel(None);
                entry.insert(rx);
                Claim::Lead(tx)
            }
        }
    }

    /// One provider call for every key, then a best-effort write-back.
    async fn fetch_and_store(
        &self,
        base: &CurrencyCode,
        keys: &[CacheKey],
    ) -> Result<HashMap<CurrencyCode, RateRecord>, ProviderError> {
        let codes: Vec<CurrencyCode> = keys.iter().map(|key| key.target().clone()).collect();
        info!(base = %base, count = codes.len(), "Fetching rates from provider");

        let quotes = self.provider.fetch(base, &codes).await?;

        let records = keys
            .iter()
            .map(|key| {
                let quote = quotes
                    .get(key.target())
                    .ok_or_else(|| ProviderError::MissingCurrency(key.target().clone()))?;
                Ok((
                    key,
                    RateRecord::new(key.target().clone(), quote.rate.clone(), quote.as_of),
                ))
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        let mut resolved = HashMap::with_capacity(records.len());
        for (key, record) in records {
            if let Err(e) = self.cache.set(key, &record).await {
                warn!(key = %key, error = %e, "Failed to cache rate");
            }
            resolved.insert(record.code().clone(), record);
        }
        Ok(resolved)
    }
}
