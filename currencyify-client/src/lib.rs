//! # Currencyify Client SDK
//!
//! A typed Rust client for the Currencyify API.

use currencyify_types::{
    ConversionRequest, ConversionResponse, ExchangeRateRequest, ExchangeRateResponse,
};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

const HEALTHCHECK_PATH: &str = "/api/v1/currencyify/healthcheck";
const CONVERT_PATH: &str = "/api/v1/currencyify/convert/currency-convert/";
const EXCHANGE_RATE_PATH: &str = "/api/v1/currencyify/exchange-rate/currency-exchange-rate/";

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Currencyify API client.
pub struct CurrencyifyClient {
    base_url: String,
    http: Client,
}

impl CurrencyifyClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, Client::new())
    }

    /// Creates a client that sends requests through `http`.
    pub fn with_http_client(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Checks if the API is alive.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, HEALTHCHECK_PATH))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Converts `amount` from `source` into `target`.
    pub async fn convert(
        &self,
        source: &str,
        target: &str,
        amount: Decimal,
    ) -> Result<ConversionResponse, ClientError> {
        let req = ConversionRequest {
            source_currency: source.to_string(),
            target_currency: target.to_string(),
            amount: Some(amount),
        };
        self.post(CONVERT_PATH, &req).await
    }

    /// Looks up the rates of `targets` against `base`.
    pub async fn exchange_rates(
        &self,
        base: &str,
        targets: &[&str],
    ) -> Result<ExchangeRateResponse, ClientError> {
        let req = ExchangeRateRequest {
            base_currency: base.to_string(),
            target_currencies: targets.iter().map(|t| t.to_string()).collect(),
        };
        self.post(EXCHANGE_RATE_PATH, &req).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_with_trailing_slash() {
        let client = CurrencyifyClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_convert_posts_request_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CONVERT_PATH))
            .and(body_json(serde_json::json!({
                "source_currency": "USD",
                "target_currency": "INR",
                "amount": 100.0,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "source_currency": "USD",
                "target_currency": "INR",
                "amount": 100.0,
                "converted_amount": 8277.1291,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CurrencyifyClient::new(server.uri());
        let resp = client
            .convert("USD", "INR", Decimal::from(100))
            .await
            .unwrap();

        assert_eq!(resp.converted_amount.to_string(), "8277.1291");
    }

    #[tokio::test]
    async fn test_api_error_message_is_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(EXCHANGE_RATE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "`base_currency` parameter is required",
                "code": 400,
            })))
            .mount(&server)
            .await;

        let client = CurrencyifyClient::new(server.uri());
        let err = client.exchange_rates("", &["INR"]).await.unwrap_err();

        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "`base_currency` parameter is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(HEALTHCHECK_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("i am alive"))
            .mount(&server)
            .await;

        let client = CurrencyifyClient::new(server.uri());
        assert!(client.health().await.unwrap());
    }
}
