//! Serialization envelope for cached rates: JSON, then standard base64.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use currencyify_types::{CacheError, CacheKey, CurrencyCode, RateRecord};

#[derive(Serialize, Deserialize)]
struct CachedRate {
    code: CurrencyCode,
    currency_exchange_rate: String,
    last_update_time: DateTime<Utc>,
}

/// Why a stored entry could not be turned back into a record.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("entry holds {found} but key {key} expects {expected}")]
    KeyMismatch {
        key: String,
        expected: CurrencyCode,
        found: CurrencyCode,
    },
}

pub fn encode(record: &RateRecord) -> Result<String, CacheError> {
    let cached = CachedRate {
        code: record.code().clone(),
        currency_exchange_rate: record.rate().to_string(),
        last_update_time: record.observed_at(),
    };
    let json = serde_json::to_vec(&cached).map_err(|e| CacheError::Encode(e.to_string()))?;
    Ok(STANDARD.encode(json))
}

/// Decodes an entry read from `key`. The stored code must match the key.
pub fn decode(key: &CacheKey, text: &str) -> Result<RateRecord, EnvelopeError> {
    let bytes = STANDARD.decode(text.trim())?;
    let cached: CachedRate = serde_json::from_slice(&bytes)?;
    if &cached.code != key.target() {
        return Err(EnvelopeError::KeyMismatch {
            key: key.to_string(),
            expected: key.target().clone(),
            found: cached.code,
        });
    }
    Ok(RateRecord::new(
        cached.code,
        cached.currency_exchange_rate,
        cached.last_update_time,
    ))
}
