//! OpenAPI document for the HTTP API.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use currencyify_types::dto::{
    ConversionRequest, ConversionResponse, ExchangeRateEntry, ExchangeRateRequest,
    ExchangeRateResponse,
};
use utoipa::OpenApi;

use crate::inbound::ErrorBody;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/v1/currencyify/healthcheck",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = String, content_type = "text/plain", example = json!("i am alive"))
    )
)]
async fn healthcheck() {}

/// Convert an amount between two currencies
#[utoipa::path(
    post,
    path = "/api/v1/currencyify/convert/currency-convert/",
    tag = "conversion",
    request_body = ConversionRequest,
    responses(
        (status = 200, description = "Converted amount", body = ConversionResponse),
        (status = 400, description = "Invalid currency codes or amount", body = ErrorBody),
        (status = 500, description = "Exchange rates could not be obtained", body = ErrorBody)
    )
)]
async fn currency_convert() {}

/// Look up the rates of several currencies against one base
#[utoipa::path(
    post,
    path = "/api/v1/currencyify/exchange-rate/currency-exchange-rate/",
    tag = "exchange-rate",
    request_body = ExchangeRateRequest,
    responses(
        (status = 200, description = "Rate of every requested currency", body = ExchangeRateResponse),
        (status = 400, description = "Invalid currency codes", body = ErrorBody),
        (status = 500, description = "Exchange rates could not be obtained", body = ErrorBody)
    )
)]
async fn currency_exchange_rate() {}

/// OpenAPI documentation for the Currencyify API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currencyify API",
        version = "1.0.0",
        description = "Currency conversion and exchange-rate lookup.\n\nRates are quoted by an upstream foreign-exchange provider and cached for a fixed TTL, so a returned rate may be up to one TTL old. `last_update_time` carries the provider's observation time.",
        license(name = "MIT"),
    ),
    paths(healthcheck, currency_convert, currency_exchange_rate),
    components(schemas(
        ConversionRequest,
        ConversionResponse,
        ExchangeRateRequest,
        ExchangeRateResponse,
        ExchangeRateEntry,
        ErrorBody,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "conversion", description = "Single amount conversion"),
        (name = "exchange-rate", description = "Multi-currency rate lookup"),
    )
)]
pub struct ApiDoc;
