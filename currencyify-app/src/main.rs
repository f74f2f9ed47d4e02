//! # Currencyify Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Load the currency reference set
//! - Initialize the cache and rate provider adapters
//! - Create the currency service
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use currencyify_cache::{CacheSettings, build_cache};
use currencyify_hex::{CurrencyService, inbound::HttpServer};
use currencyify_types::{CurrencyCodes, RateProvider};
use exchange_rates::{FxRatesApiProvider, StaticRateProvider};

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("currencyify-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing
    let (otel_tracer, otel_provider) = init_tracer()?;
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,currencyify_app=debug,currencyify_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting currencyify server on port {}", config.port);

    let codes = match &config.currency_codes_file {
        Some(path) => CurrencyCodes::from_json_file(path)?,
        None => CurrencyCodes::bundled()?,
    };
    tracing::info!(count = codes.len(), "Loaded currency reference set");

    let cache = build_cache(
        &config.cache_url,
        CacheSettings {
            ttl: config.cache_ttl,
            op_timeout: config.cache_timeout,
        },
    )
    .await?;
    tracing::info!(kind = cache.kind(), "Rate cache ready");

    let provider: Arc<dyn RateProvider> = match &config.fx_rates_api_url {
        Some(url) => {
            tracing::info!(endpoint = %url, "Using exchange rate API");
            Arc::new(FxRatesApiProvider::new(url.clone(), config.fx_rates_api_timeout)?)
        }
        None => {
            tracing::warn!("FX_RATES_API_URL not set, serving static development rates");
            Arc::new(StaticRateProvider::new())
        }
    };

    // Create the currency service
    let service = CurrencyService::new(Arc::new(codes), cache, provider);

    // Create and run the HTTP server
    let server = HttpServer::new(service).with_request_timeout(config.request_timeout);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    let _ = otel_provider.shutdown();
    Ok(())
}
