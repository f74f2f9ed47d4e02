//! Rate records as they flow between the provider, the cache and the engine.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::currency::CurrencyCode;
use crate::error::ArithmeticError;

/// A resolved exchange rate for one currency against a base currency.
///
/// The rate is kept as the decimal string the provider reported so that it
/// survives cache round-trips without float drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRecord {
    code: CurrencyCode,
    rate: String,
    observed_at: DateTime<Utc>,
}

impl RateRecord {
    pub fn new(code: CurrencyCode, rate: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            code,
            rate: rate.into(),
            observed_at,
        }
    }

    pub fn code(&self) -> &CurrencyCode {
        &self.code
    }

    /// The rate as a decimal string, e.g. `"82.771291"`.
    pub fn rate(&self) -> &str {
        &self.rate
    }

    /// When the provider observed this rate.
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Parses the rate for arithmetic. Zero, negative and unparseable rates
    /// are errors, never coerced.
    pub fn rate_value(&self) -> Result<Decimal, ArithmeticError> {
        parse_decimal(&self.rate)
            .filter(|value| value.is_sign_positive() && !value.is_zero())
            .ok_or_else(|| ArithmeticError::RateParse {
                code: self.code.clone(),
                rate: self.rate.clone(),
            })
    }
}

/// Parses a decimal in plain (`"82.77"`) or scientific (`"1.5e-7"`) notation.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
