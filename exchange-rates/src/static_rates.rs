//! Hardcoded exchange rates for development and testing.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use currencyify_types::domain::rate::parse_decimal;
use currencyify_types::{CurrencyCode, ProviderError, RateProvider, RateQuote};

/// Units of each currency per one USD.
const DEV_RATES: &[(&str, &str)] = &[
    ("USD", "1"),
    ("EUR", "0.924214"),
    ("GBP", "0.789321"),
    ("INR", "82.771291"),
    ("JPY", "150.608807"),
    ("CAD", "1.352011"),
    ("AUD", "1.527630"),
    ("CHF", "0.881220"),
    ("CNY", "7.197505"),
    ("SGD", "1.345010"),
];

/// Decimal places of derived cross rates, matching the HTTP provider's `places`.
const PLACES: u32 = 6;

/// Serves rates from a fixed USD-relative table. Never touches the network.
///
/// Cross rates for a non-USD base are derived as `rate(target) / rate(base)`.
#[derive(Debug, Clone)]
pub struct StaticRateProvider {
    usd_rates: HashMap<CurrencyCode, Decimal>,
    as_of: DateTime<Utc>,
}

impl StaticRateProvider {
    /// The built-in development table, stamped with the current time.
    pub fn new() -> Self {
        let usd_rates = DEV_RATES
            .iter()
            .filter_map(|(code, rate)| Some((CurrencyCode::parse(code).ok()?, parse_decimal(rate)?)))
            .collect();
        Self {
            usd_rates,
            as_of: Utc::now(),
        }
    }

    /// A custom table of USD-relative rates.
    pub fn with_rates(
        usd_rates: impl IntoIterator<Item = (CurrencyCode, Decimal)>,
        as_of: DateTime<Utc>,
    ) -> Self {
        Self {
            usd_rates: usd_rates.into_iter().collect(),
            as_of,
        }
    }

    fn usd_rate(&self, code: &CurrencyCode) -> Result<Decimal, ProviderError> {
        self.usd_rates
            .get(code)
            .copied()
            .filter(|rate| !rate.is_zero())
            .ok_or_else(|| ProviderError::MissingCurrency(code.clone()))
    }
}

impl Default for StaticRateProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    async fn fetch(
        &self,
        base: &CurrencyCode,
        targets: &[CurrencyCode],
    ) -> Result<HashMap<CurrencyCode, RateQuote>, ProviderError> {
        if targets.is_empty() {
            return Err(ProviderError::EmptyRequest);
        }
        let base_rate = self.usd_rate(base)?;

        let quotes = targets
            .iter()
            .map(|code| {
                let rate = self
                    .usd_rate(code)?
                    .checked_div(base_rate)
                    .ok_or_else(|| ProviderError::InvalidRate {
                        code: code.clone(),
                        rate: "overflow".into(),
                    })?
                    .round_dp(PLACES)
                    .normalize();
                Ok((
                    code.clone(),
                    RateQuote {
                        rate: rate.to_string(),
                        as_of: self.as_of,
                    },
                ))
            })
            .collect::<Result<HashMap<_, _>, ProviderError>>()?;

        debug!(base = %base, count = quotes.len(), "Served static exchange rates");
        Ok(quotes)
    }
}
