//! Currency Application Services
//!
//! Orchestrates validation, rate resolution and conversion through the ports.
//! Contains NO infrastructure logic - pure business orchestration.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use currencyify_types::{
    AppError, CodeValidator, ConversionEngine, ConversionRequest, ConversionResponse,
    CurrencyCodes, ExchangeRateEntry, ExchangeRateRequest, ExchangeRateResponse, RateCache,
    RateProvider, ValidationError, Violation,
};

use crate::resolver::RateResolver;

/// Converts a single amount between two currencies.
///
/// Both currencies are resolved against USD independently, so each lands in
/// the cache under its bare code.
pub struct ConvertService<C: RateCache, P: RateProvider> {
    validator: CodeValidator,
    resolver: Arc<RateResolver<C, P>>,
    engine: ConversionEngine,
}

impl<C: RateCache, P: RateProvider> ConvertService<C, P> {
    pub fn new(validator: CodeValidator, resolver: Arc<RateResolver<C, P>>) -> Self {
        Self {
            validator,
            resolver,
            engine: ConversionEngine::new(),
        }
    }

    pub async fn convert(&self, req: ConversionRequest) -> Result<ConversionResponse, AppError> {
        let mut violations = Vec::new();
        let source = self
            .validator
            .check("source_currency", &req.source_currency, &mut violations);
        let target = self
            .validator
            .check("target_currency", &req.target_currency, &mut violations);
        let amount = check_amount(req.amount, &mut violations);

        let (Some(source), Some(target), Some(amount)) = (source, target, amount) else {
            return Err(ValidationError::new(violations).into());
        };

        let source_rate = self.resolver.resolve_usd(&source).await?;
        let target_rate = self.resolver.resolve_usd(&target).await?;
        let converted_amount = self.engine.convert(amount, &source_rate, &target_rate)?;

        info!(
            source = %source,
            target = %target,
            amount = %amount,
            converted = %converted_amount,
            "Converted amount"
        );

        Ok(ConversionResponse {
            source_currency: source,
            target_currency: target,
            amount,
            converted_amount,
        })
    }
}

/// Missing and zero amounts are reported as missing, negatives as non-positive.
fn check_amount(amount: Option<Decimal>, violations: &mut Vec<Violation>) -> Option<Decimal> {
    match amount {
        Some(amount) if amount.is_sign_positive() && !amount.is_zero() => Some(amount),
        Some(amount) if !amount.is_zero() => {
            violations.push(Violation::NotPositive { field: "amount" });
            None
        }
        _ => {
            violations.push(Violation::MissingField { field: "amount" });
            None
        }
    }
}

/// Looks up the rates of several currencies against one base.
pub struct ExchangeRateService<C: RateCache, P: RateProvider> {
    validator: CodeValidator,
    resolver: Arc<RateResolver<C, P>>,
}

impl<C: RateCache, P: RateProvider> ExchangeRateService<C, P> {
    pub fn new(validator: CodeValidator, resolver: Arc<RateResolver<C, P>>) -> Self {
        Self {
            validator,
            resolver,
        }
    }

    pub async fn exchange_rates(
        &self,
        req: ExchangeRateRequest,
    ) -> Result<ExchangeRateResponse, AppError> {
        let mut violations = Vec::new();
        let base = self
            .validator
            .check("base_currency", &req.base_currency, &mut violations);
        let targets = self
            .validator
            .check_targets(&req.target_currencies, &mut violations);

        let Some(base) = base else {
            return Err(ValidationError::new(violations).into());
        };
        ValidationError::check(violations)?;

        let records = self.resolver.resolve(&base, &targets).await?;
        let exchange_rates: BTreeMap<_, _> = records
            .iter()
            .map(|(code, record)| (code.clone(), ExchangeRateEntry::from(record)))
            .collect();

        info!(base = %base, count = exchange_rates.len(), "Resolved exchange rates");

        Ok(ExchangeRateResponse {
            base_currency: base,
            exchange_rates,
        })
    }
}

/// Application service held by the HTTP adapter.
///
/// Both operations share one resolver, so they share the in-flight map and
/// the cache connection.
pub struct CurrencyService<C: RateCache, P: RateProvider> {
    converter: ConvertService<C, P>,
    rates: ExchangeRateService<C, P>,
}

impl<C: RateCache, P: RateProvider> CurrencyService<C, P> {
    /// Creates a new currency service over the given reference set and ports.
    pub fn new(codes: Arc<CurrencyCodes>, cache: C, provider: P) -> Self {
        let validator = CodeValidator::new(codes);
        let resolver = Arc::new(RateResolver::new(cache, provider));
        Self {
            converter: ConvertService::new(validator.clone(), resolver.clone()),
            rates: ExchangeRateService::new(validator, resolver),
        }
    }

    /// Converts an amount between two currencies.
    pub async fn convert(&self, req: ConversionRequest) -> Result<ConversionResponse, AppError> {
        self.converter.convert(req).await
    }

    /// Looks up rates for several target currencies against one base.
    pub async fn exchange_rates(
        &self,
        req: ExchangeRateRequest,
    ) -> Result<ExchangeRateResponse, AppError> {
        self.rates.exchange_rates(req).await
    }
}
