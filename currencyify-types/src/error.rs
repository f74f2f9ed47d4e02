//! Error types for the currency service.

use std::fmt;

use crate::domain::CurrencyCode;
use crate::ports::ProviderError;

/// Domain-level errors (malformed codes, unusable reference data).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    #[error("Currency reference set error: {0}")]
    ReferenceSet(String),
}

/// A single problem found while validating a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("`{field}` parameter is required")]
    MissingField { field: &'static str },

    #[error(
        "`{field}` not found in our database. Please check the `{field}` input param, it should be a valid international-standard 3-letter ISO currency code"
    )]
    UnknownCurrencyCode { field: &'static str },

    #[error(
        "`target_currency` ({code}) not found in our database. Please check the `target_currencies` input param, it should be a valid international-standard 3-letter ISO currency code"
    )]
    UnknownTargetCurrency { code: String },

    #[error("`{field}` must be a positive number")]
    NotPositive { field: &'static str },
}

/// Every violation found in one request. Displayed one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// `Ok(())` when nothing was collected.
    pub fn check(violations: Vec<Violation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self::new(violations))
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Rate arithmetic failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArithmeticError {
    #[error("Unusable exchange rate {rate:?} for {code}")]
    RateParse { code: CurrencyCode, rate: String },

    #[error("Arithmetic overflow while converting amount")]
    Overflow,
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ArithmeticError> for AppError {
    fn from(err: ArithmeticError) -> Self {
        AppError::Internal(err.to_string())
    }
}
