//! HTTP Server configuration and startup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use currencyify_types::{RateCache, RateProvider};

use super::handlers::{self, AppState};
use crate::CurrencyService;
use crate::openapi::ApiDoc;

pub const HEALTHCHECK_PATH: &str = "/api/v1/currencyify/healthcheck";
pub const CONVERT_PATH: &str = "/api/v1/currencyify/convert/currency-convert/";
pub const EXCHANGE_RATE_PATH: &str = "/api/v1/currencyify/exchange-rate/currency-exchange-rate/";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP Server for the Currencyify API.
pub struct HttpServer<C: RateCache, P: RateProvider> {
    state: Arc<AppState<C, P>>,
    request_timeout: Duration,
}

impl<C: RateCache, P: RateProvider> HttpServer<C, P> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: CurrencyService<C, P>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bounds every request; an expired request drops its in-flight work.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let convert = post(handlers::currency_convert::<C, P>);
        let exchange_rate = post(handlers::currency_exchange_rate::<C, P>);

        Router::new()
            .route(HEALTHCHECK_PATH, get(handlers::healthcheck))
            .route(CONVERT_PATH, convert.clone())
            .route(CONVERT_PATH.trim_end_matches('/'), convert)
            .route(EXCHANGE_RATE_PATH, exchange_rate.clone())
            .route(EXCHANGE_RATE_PATH.trim_end_matches('/'), exchange_rate)
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(metrics)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
