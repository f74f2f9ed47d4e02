//! Exchange rate provider port.
//!
//! This trait defines the interface for remote FX rate sources.
//! Implementations can be HTTP clients, static tables, mock providers, etc.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::CurrencyCode;

/// One rate reported by a provider, relative to the requested base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuote {
    /// Canonical decimal string, e.g. `"82.771291"`.
    pub rate: String,
    pub as_of: DateTime<Utc>,
}

/// Error type for provider calls. A failed call yields no rates at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("No target currencies requested")]
    EmptyRequest,

    #[error("Exchange rate service unreachable: {0}")]
    Transport(String),

    #[error("Exchange rate service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("error while processing exchange rates of vendor API data: {0}")]
    Malformed(String),

    #[error("error while processing exchange rates of vendor API data: missing `rates`")]
    MissingRates,

    #[error("received empty rates data from vendor API for {0}. Please check input params")]
    MissingCurrency(CurrencyCode),

    #[error("Invalid rate {rate:?} reported for {code}")]
    InvalidRate { code: CurrencyCode, rate: String },
}

impl ProviderError {
    /// The single currency this error is about, if it is scoped to one.
    ///
    /// `None` means the whole call failed and every requested code is affected.
    pub fn currency(&self) -> Option<&CurrencyCode> {
        match self {
            Self::MissingCurrency(code) | Self::InvalidRate { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether this error applies to `code`.
    pub fn affects(&self, code: &CurrencyCode) -> bool {
        self.currency().is_none_or(|scoped| scoped == code)
    }
}

/// Port trait for exchange rate providers.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync + 'static {
    /// Fetches the rate of every code in `targets` against `base` in one call.
    ///
    /// Either every requested code is present in the result or the call fails.
    async fn fetch(
        &self,
        base: &CurrencyCode,
        targets: &[CurrencyCode],
    ) -> Result<HashMap<CurrencyCode, RateQuote>, ProviderError>;
}

#[async_trait::async_trait]
impl<T: RateProvider + ?Sized> RateProvider for Arc<T> {
    async fn fetch(
        &self,
        base: &CurrencyCode,
        targets: &[CurrencyCode],
    ) -> Result<HashMap<CurrencyCode, RateQuote>, ProviderError> {
        (**self).fetch(base, targets).await
    }
}
