//! # Currencyify Types
//!
//! Domain types and port traits for the currency conversion service.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, rate arithmetic, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, RateRecord, ConversionEngine)
//! - `ports/` - Trait definitions that cache and provider adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CodeValidator, ConversionEngine, CurrencyCode, CurrencyCodes, RateRecord, USD,
};
pub use dto::*;
pub use error::{AppError, ArithmeticError, DomainError, ValidationError, Violation};
pub use ports::{
    CacheError, CacheKey, CacheLookup, ProviderError, RateCache, RateProvider, RateQuote,
};
