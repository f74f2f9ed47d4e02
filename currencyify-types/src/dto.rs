//! Data Transfer Objects (DTOs) for requests and responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CurrencyCode, RateRecord};

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to convert an amount between two currencies.
///
/// Fields are kept raw so that validation can report every problem at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ConversionRequest {
    /// ISO code of the currency the amount is in
    #[serde(default)]
    #[schema(example = "USD")]
    pub source_currency: String,
    /// ISO code of the currency to convert into
    #[serde(default)]
    #[schema(example = "INR")]
    pub target_currency: String,
    /// Amount to convert, must be positive
    #[serde(default, serialize_with = "rust_decimal::serde::float_option::serialize")]
    #[schema(value_type = Option<f64>, example = 100)]
    pub amount: Option<Decimal>,
}

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversionResponse {
    pub source_currency: CurrencyCode,
    pub target_currency: CurrencyCode,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 100)]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 8277.1291)]
    pub converted_amount: Decimal,
}

// ─────────────────────────────────────────────────────────────────────────────
// Exchange Rate DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request for the rates of several currencies against one base.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRateRequest {
    /// ISO code of the base currency
    #[serde(default)]
    #[schema(example = "USD")]
    pub base_currency: String,
    /// ISO codes to look up against the base
    #[serde(default)]
    #[schema(example = json!(["INR", "JPY"]))]
    pub target_currencies: Vec<String>,
}

/// One rate in an exchange-rate response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRateEntry {
    /// Units of the target currency per one unit of the base currency
    #[schema(example = "82.771291")]
    pub currency_exchange_rate: String,
    /// When the provider observed the rate
    #[schema(value_type = String, example = "2024-02-26T12:04:00Z")]
    pub last_update_time: DateTime<Utc>,
}

impl From<&RateRecord> for ExchangeRateEntry {
    fn from(record: &RateRecord) -> Self {
        Self {
            currency_exchange_rate: record.rate().to_string(),
            last_update_time: record.observed_at(),
        }
    }
}

/// Rates for every requested target currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRateResponse {
    pub base_currency: CurrencyCode,
    pub exchange_rates: BTreeMap<CurrencyCode, ExchangeRateEntry>,
}
