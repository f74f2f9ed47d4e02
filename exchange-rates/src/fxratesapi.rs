//! HTTP adapter for the fxratesapi.com `latest` endpoint.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{error, info};

use currencyify_types::{CurrencyCode, ProviderError, RateProvider, RateQuote};

use crate::payload::decode_quotes;

const RESOLUTION: &str = "1m";
const PLACES: &str = "6";
/// Upper bound on how much of an error body ends up in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Fetches rates for any number of currencies in a single GET.
#[derive(Debug, Clone)]
pub struct FxRatesApiProvider {
    client: Client,
    endpoint: String,
}

impl FxRatesApiProvider {
    /// Creates a provider whose requests give up after `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RateProvider for FxRatesApiProvider {
    #[tracing::instrument(skip(self, targets), fields(base = %base, targets = targets.len()))]
    async fn fetch(
        &self,
        base: &CurrencyCode,
        targets: &[CurrencyCode],
    ) -> Result<HashMap<CurrencyCode, RateQuote>, ProviderError> {
        if targets.is_empty() {
            return Err(ProviderError::EmptyRequest);
        }

        let currencies = targets
            .iter()
            .map(CurrencyCode::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .client
            .get(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .query(&[
                ("base", base.as_str()),
                ("currencies", currencies.as_str()),
                ("resolution", RESOLUTION),
                ("amount", "1"),
                ("format", "json"),
                ("places", PLACES),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Exchange rate request failed");
                ProviderError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "Exchange rate service returned an error");
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let quotes = decode_quotes(&body, targets).inspect_err(|e| {
            error!(error = %e, response = %body, "Failed to process exchange rate response");
        })?;

        info!(currencies = %currencies, "Fetched latest exchange rates");
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MOCK_JSON: &str = r#"{"success":true,"terms":"https://fxratesapi.com/legal/terms-conditions","privacy":"https://fxratesapi.com/legal/privacy-policy","timestamp":1708949040,"date":"2024-02-26T12:04:00.000Z","base":"USD","rates":{"INR":82.771291,"JPY":150.608807}}"#;

    fn codes(raw: &[&str]) -> Vec<CurrencyCode> {
        raw.iter().map(|c| CurrencyCode::parse(c).unwrap()).collect()
    }

    async fn provider_for(server: &MockServer) -> FxRatesApiProvider {
        FxRatesApiProvider::new(format!("{}/latest", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_one_batched_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "USD"))
            .and(query_param("currencies", "INR,JPY"))
            .and(query_param("resolution", "1m"))
            .and(query_param("amount", "1"))
            .and(query_param("format", "json"))
            .and(query_param("places", "6"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_JSON))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let quotes = provider
            .fetch(&CurrencyCode::usd(), &codes(&["INR", "JPY"]))
            .await
            .unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[&CurrencyCode::parse("INR").unwrap()].rate, "82.771291");
        assert_eq!(quotes[&CurrencyCode::parse("JPY").unwrap()].rate, "150.608807");
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"errors":"some error"}"#))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider
            .fetch(&CurrencyCode::usd(), &codes(&["INR"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_fetch_missing_rates_fails_whole_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"success":true,"date":"2024-02-26T12:04:00.000Z"}"#),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider
            .fetch(&CurrencyCode::usd(), &codes(&["INR", "JPY"]))
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::MissingRates);
    }

    #[tokio::test]
    async fn test_fetch_empty_targets_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_JSON))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider.fetch(&CurrencyCode::usd(), &[]).await.unwrap_err();

        assert_eq!(err, ProviderError::EmptyRequest);
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        // Nothing listens on port 9 locally.
        let provider =
            FxRatesApiProvider::new("http://127.0.0.1:9/latest", Duration::from_secs(2)).unwrap();
        let err = provider
            .fetch(&CurrencyCode::usd(), &codes(&["INR"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
