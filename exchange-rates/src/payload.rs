//! Typed decoding of the provider's `latest` payload.
//!
//! Expected shape: `{"date": "<RFC 3339>", "rates": {"INR": 82.771291, ...}}`.
//! Anything else fails the whole call.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use currencyify_types::domain::rate::parse_decimal;
use currencyify_types::{CurrencyCode, ProviderError, RateQuote};

#[derive(Debug, Deserialize)]
struct LatestRates {
    date: DateTime<Utc>,
    #[serde(default)]
    rates: Option<HashMap<String, RawRate>>,
}

/// A rate as sent on the wire: the provider uses both forms.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRate {
    Number(serde_json::Number),
    Text(String),
}

impl RawRate {
    fn as_text(&self) -> String {
        match self {
            RawRate::Number(n) => n.to_string(),
            RawRate::Text(s) => s.clone(),
        }
    }
}

/// Normalizes a reported rate to a canonical decimal string.
///
/// `82.771291`, `"82.771291"` and `"82.7712910"` all become `"82.771291"`.
/// Returns `None` for non-numeric, zero or negative rates.
pub fn canonical_rate(raw: &str) -> Option<String> {
    parse_decimal(raw)
        .filter(|value| value.is_sign_positive() && !value.is_zero())
        .map(|value| value.normalize().to_string())
}

/// Decodes `body` and extracts a quote for every code in `targets`.
///
/// Codes present in the payload but not requested are ignored.
pub fn decode_quotes(
    body: &str,
    targets: &[CurrencyCode],
) -> Result<HashMap<CurrencyCode, RateQuote>, ProviderError> {
    let payload: LatestRates =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    let rates = payload.rates.ok_or(ProviderError::MissingRates)?;

    targets
        .iter()
        .map(|code| {
            let raw = rates
                .get(code.as_str())
                .ok_or_else(|| ProviderError::MissingCurrency(code.clone()))?
                .as_text();
            let rate = canonical_rate(&raw).ok_or_else(|| ProviderError::InvalidRate {
                code: code.clone(),
                rate: raw,
            })?;
            Ok((
                code.clone(),
                RateQuote {
                    rate,
                    as_of: payload.date,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"success":true,"timestamp":1708949040,"date":"2024-02-26T12:04:00.000Z","base":"USD","rates":{"INR":82.771291,"JPY":"150.608807","USD":1}}"#;

    fn codes(raw: &[&str]) -> Vec<CurrencyCode> {
        raw.iter().map(|c| CurrencyCode::parse(c).unwrap()).collect()
    }

    #[test]
    fn test_canonical_rate() {
        assert_eq!(canonical_rate("82.771291").as_deref(), Some("82.771291"));
        assert_eq!(canonical_rate("82.7712910").as_deref(), Some("82.771291"));
        assert_eq!(canonical_rate("1.0").as_deref(), Some("1"));
        assert_eq!(canonical_rate("2.5e-4").as_deref(), Some("0.00025"));
        assert_eq!(canonical_rate("0"), None);
        assert_eq!(canonical_rate("abc"), None);
    }

    #[test]
    fn test_decode_number_and_string_rates() {
        let quotes = decode_quotes(BODY, &codes(&["INR", "JPY", "USD"])).unwrap();
        let inr = &quotes[&CurrencyCode::parse("INR").unwrap()];
        assert_eq!(inr.rate, "82.771291");
        assert_eq!(inr.as_of.to_rfc3339(), "2024-02-26T12:04:00+00:00");
        assert_eq!(quotes[&CurrencyCode::parse("JPY").unwrap()].rate, "150.608807");
        assert_eq!(quotes[&CurrencyCode::usd()].rate, "1");
    }

    #[test]
    fn test_decode_ignores_unrequested_codes() {
        let quotes = decode_quotes(BODY, &codes(&["JPY"])).unwrap();
        assert_eq!(quotes.len(), 1);
    }

    #[test]
    fn test_decode_missing_rates() {
        let body = r#"{"date":"2024-02-26T12:04:00.000Z"}"#;
        assert_eq!(
            decode_quotes(body, &codes(&["INR"])).unwrap_err(),
            ProviderError::MissingRates
        );
    }

    #[test]
    fn test_decode_missing_requested_code() {
        let err = decode_quotes(BODY, &codes(&["INR", "GBP"])).unwrap_err();
        assert!(matches!(err, ProviderError::MissingCurrency(ref c) if c.as_str() == "GBP"));
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            decode_quotes("not json", &codes(&["INR"])),
            Err(ProviderError::Malformed(_))
        ));
        let bad_rate_type = r#"{"date":"2024-02-26T12:04:00.000Z","rates":{"INR":true}}"#;
        assert!(matches!(
            decode_quotes(bad_rate_type, &codes(&["INR"])),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_invalid_rate_string() {
        let body = r#"{"date":"2024-02-26T12:04:00.000Z","rates":{"INR":"n/a"}}"#;
        assert!(matches!(
            decode_quotes(body, &codes(&["INR"])),
            Err(ProviderError::InvalidRate { .. })
        ));
    }
}
