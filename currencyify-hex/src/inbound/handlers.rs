//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use currencyify_types::{
    AppError, ConversionRequest, ExchangeRateRequest, RateCache, RateProvider,
};

use crate::CurrencyService;

/// Application state shared across handlers.
pub struct AppState<C: RateCache, P: RateProvider> {
    pub service: CurrencyService<C, P>,
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message; validation problems are separated by newlines
    #[schema(example = "`source_currency` parameter is required")]
    pub error: String,
    /// HTTP status code
    #[schema(example = 400)]
    pub code: u16,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::BadRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = ErrorBody {
            error: message,
            code: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

/// Liveness probe.
pub async fn healthcheck() -> &'static str {
    "i am alive"
}

/// Convert an amount between two currencies.
#[tracing::instrument(skip(state, payload))]
pub async fn currency_convert<C: RateCache, P: RateProvider>(
    State(state): State<Arc<AppState<C, P>>>,
    payload: Result<Json<ConversionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    tracing::debug!(
        source = %req.source_currency,
        target = %req.target_currency,
        "Handling conversion request"
    );
    let response = state.service.convert(req).await?;
    Ok(Json(response))
}

/// Look up rates for several currencies against one base.
#[tracing::instrument(skip(state, payload))]
pub async fn currency_exchange_rate<C: RateCache, P: RateProvider>(
    State(state): State<Arc<AppState<C, P>>>,
    payload: Result<Json<ExchangeRateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    tracing::debug!(
        base = %req.base_currency,
        targets = ?req.target_currencies,
        "Handling exchange rate request"
    );
    let response = state.service.exchange_rates(req).await?;
    Ok(Json(response))
}
