//! # Currencyify Hex
//!
//! Application service layer and HTTP adapter for the currencyify service.
//!
//! ## Architecture
//!
//! - `resolver` - Cache-aside rate resolution with request coalescing
//! - `service` - Conversion and exchange-rate services
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! Everything is generic over `C: RateCache` and `P: RateProvider`, allowing
//! different adapters to be injected.

pub mod inbound;
pub mod openapi;
pub mod resolver;
pub mod service;


pub use resolver::RateResolver;
pub use service::{ConvertService, CurrencyService, ExchangeRateService};
