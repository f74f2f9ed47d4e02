//! Exchange Rate Provider Adapters
//!
//! Implementations of the `RateProvider` port:
//!
//! - [`FxRatesApiProvider`] asks fxratesapi.com (or any endpoint speaking the
//!   same `latest` protocol) for every requested currency in one GET.
//! - [`StaticRateProvider`] serves a hardcoded USD-relative table, for local
//!   development and tests where no network is wanted.
//!
//! Both return rates as canonical decimal strings; the provider quirk of
//! sending a rate either as a JSON number or as a string is resolved in
//! [`payload`].
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//! use currencyify_types::{CurrencyCode, RateProvider};
//! use exchange_rates::FxRatesApiProvider;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = FxRatesApiProvider::new("https://api.fxratesapi.com/latest", Duration::from_secs(10))?;
//! let targets = vec![CurrencyCode::parse("INR")?, CurrencyCode::parse("JPY")?];
//! let quotes = provider.fetch(&CurrencyCode::usd(), &targets).await?;
//! println!("{:?}", quotes);
//! # Ok(())
//! # }
//! ```

mod fxratesapi;
pub mod payload;
mod static_rates;

pub use fxratesapi::FxRatesApiProvider;
pub use static_rates::StaticRateProvider;
