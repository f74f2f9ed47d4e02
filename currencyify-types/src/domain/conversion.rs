//! Cross-rate conversion through the USD reference base.

use rust_decimal::Decimal;

use super::rate::RateRecord;
use crate::error::ArithmeticError;

/// Converts amounts between two currencies whose rates are both quoted
/// against the same reference base.
///
/// `converted = amount / source_rate * target_rate`. No rounding is applied;
/// trailing zeros are stripped from the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionEngine;

impl ConversionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn convert(
        &self,
        amount: Decimal,
        source: &RateRecord,
        target: &RateRecord,
    ) -> Result<Decimal, ArithmeticError> {
        let source_rate = source.rate_value()?;
        let target_rate = target.rate_value()?;
        Self::cross(amount, source_rate, target_rate)
    }

    fn cross(
        amount: Decimal,
        source_rate: Decimal,
        target_rate: Decimal,
    ) -> Result<Decimal, ArithmeticError> {
        amount
            .checked_div(source_rate)
            .and_then(|in_base| in_base.checked_mul(target_rate))
            .map(|converted| converted.normalize())
            .ok_or(ArithmeticError::Overflow)
    }
}
