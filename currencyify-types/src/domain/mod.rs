//! Domain models for the currency service.

pub mod conversion;
pub mod currency;
pub mod rate;

pub use conversion::ConversionEngine;
pub use currency::{CodeValidator, CurrencyCode, CurrencyCodes, USD};
pub use rate::RateRecord;
