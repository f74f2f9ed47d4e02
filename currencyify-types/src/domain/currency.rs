//! Currency codes, the reference set of known codes, and code validation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{DomainError, ValidationError, Violation};

/// ISO code of the reference base currency every cached rate is expressed against.
pub const USD: &str = "USD";

const BUNDLED_CODES: &str = include_str!("../../data/currency_codes.json");

/// A three-letter, uppercase ISO 4217 currency code.
///
/// Parsing only checks the shape of the code. Membership in the reference set
/// is enforced by [`CodeValidator`].
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "USD")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and uppercases a currency code.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrencyCode(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The reference base currency.
    pub fn usd() -> Self {
        Self(USD.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_usd(&self) -> bool {
        self.0 == USD
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference Set
// ─────────────────────────────────────────────────────────────────────────────

/// Accepted layouts of a currency-codes file: a plain list, or an object keyed
/// by (usually lowercase) code.
#[derive(Deserialize)]
#[serde(untagged)]
enum CodesFile {
    List(Vec<String>),
    Keyed(BTreeMap<String, serde_json::Value>),
}

/// Immutable set of currency codes the service accepts.
///
/// Built once at startup and shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct CurrencyCodes {
    codes: BTreeSet<CurrencyCode>,
}

impl CurrencyCodes {
    /// Builds a reference set from raw codes, rejecting malformed entries.
    pub fn from_codes<I, S>(codes: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes = codes
            .into_iter()
            .map(|c| CurrencyCode::parse(c.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { codes })
    }

    /// The ISO 4217 list compiled into the binary.
    pub fn bundled() -> Result<Self, DomainError> {
        Self::from_json_str(BUNDLED_CODES)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DomainError> {
        let file: CodesFile = serde_json::from_str(json)
            .map_err(|e| DomainError::ReferenceSet(format!("invalid currency codes JSON: {e}")))?;
        match file {
            CodesFile::List(codes) => Self::from_codes(codes),
            CodesFile::Keyed(map) => Self::from_codes(map.keys()),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DomainError::ReferenceSet(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Looks up a code case-insensitively, returning its normalized form.
    pub fn lookup(&self, raw: &str) -> Option<CurrencyCode> {
        CurrencyCode::parse(raw)
            .ok()
            .filter(|code| self.codes.contains(code))
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.lookup(raw).is_some()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.codes.iter()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Checks raw currency codes against the reference set.
///
/// The `check*` methods push violations into a caller-owned list so that a
/// request can report every problem at once; `validate*` are the standalone
/// forms.
#[derive(Debug, Clone)]
pub struct CodeValidator {
    codes: Arc<CurrencyCodes>,
}

impl CodeValidator {
    pub fn new(codes: Arc<CurrencyCodes>) -> Self {
        Self { codes }
    }

    pub fn codes(&self) -> &CurrencyCodes {
        &self.codes
    }

    /// Validates a single code for the named request field.
    pub fn validate(&self, field: &'static str, raw: &str) -> Result<CurrencyCode, ValidationError> {
        let mut violations = Vec::new();
        self.check(field, raw, &mut violations)
            .ok_or_else(|| ValidationError::new(violations))
    }

    /// Validates a list of target codes, collecting every invalid entry.
    pub fn validate_targets(&self, raws: &[String]) -> Result<Vec<CurrencyCode>, ValidationError> {
        let mut violations = Vec::new();
        let codes = self.check_targets(raws, &mut violations);
        ValidationError::check(violations)?;
        Ok(codes)
    }

    pub fn check(
        &self,
        field: &'static str,
        raw: &str,
        violations: &mut Vec<Violation>,
    ) -> Option<CurrencyCode> {
        if raw.trim().is_empty() {
            violations.push(Violation::MissingField { field });
            return None;
        }
        let code = self.codes.lookup(raw);
        if code.is_none() {
            violations.push(Violation::UnknownCurrencyCode { field });
        }
        code
    }

    /// Normalizes target codes, dropping duplicates while keeping request order.
    pub fn check_targets(&self, raws: &[String], violations: &mut Vec<Violation>) -> Vec<CurrencyCode> {
        if raws.is_empty() {
            violations.push(Violation::MissingField {
                field: "target_currencies",
            });
            return Vec::new();
        }

        let mut seen = BTreeSet::new();
        let mut codes = Vec::with_capacity(raws.len());
        for raw in raws {
            match self.codes.lookup(raw) {
                Some(code) => {
                    if seen.insert(code.clone()) {
                        codes.push(code);
                    }
                }
                None => violations.push(Violation::UnknownTargetCurrency { code: raw.clone() }),
            }
        }
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> CodeValidator {
        CodeValidator::new(Arc::new(
            CurrencyCodes::from_codes(["USD", "INR", "JPY", "EUR"]).unwrap(),
        ))
    }

    #[test]
    fn test_currency_code_parse_uppercases() {
        assert_eq!(CurrencyCode::parse("inr").unwrap().as_str(), "INR");
        assert_eq!(CurrencyCode::parse(" Jpy ").unwrap().to_string(), "JPY");
    }

    #[test]
    fn test_currency_code_parse_rejects_bad_shape() {
        assert!(CurrencyCode::parse("India").is_err());
        assert!(CurrencyCode::parse("U5D").is_err());
        assert!(CurrencyCode::parse("").is_err());
    }

    #[test]
    fn test_currency_code_serde_is_plain_string() {
        let code: CurrencyCode = serde_json::from_str("\"eur\"").unwrap();
        assert_eq!(code.as_str(), "EUR");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"EUR\"");
        assert!(serde_json::from_str::<CurrencyCode>("\"euro\"").is_err());
    }

    #[test]
    fn test_bundled_codes_load() {
        let codes = CurrencyCodes::bundled().unwrap();
        assert!(codes.len() > 100);
        assert!(codes.contains("usd"));
        assert!(codes.contains("INR"));
        assert!(!codes.contains("XYZ"));
    }

    #[test]
    fn test_codes_from_keyed_json() {
        let codes = CurrencyCodes::from_json_str(r#"{"usd": 1, "inr": 2}"#).unwrap();
        assert_eq!(codes.len(), 2);
        assert!(codes.contains("INR"));
    }

    #[test]
    fn test_codes_from_bad_json() {
        assert!(matches!(
            CurrencyCodes::from_json_str("42"),
            Err(DomainError::ReferenceSet(_))
        ));
        assert!(matches!(
            CurrencyCodes::from_json_str(r#"["USD", "dollars"]"#),
            Err(DomainError::InvalidCurrencyCode(_))
        ));
    }

    #[test]
    fn test_validate_normalizes_case() {
        let code = validator().validate("base_currency", "jpy").unwrap();
        assert_eq!(code.as_str(), "JPY");
    }

    #[test]
    fn test_validate_missing_field() {
        let err = validator().validate("source_currency", "").unwrap_err();
        assert_eq!(err.to_string(), "`source_currency` parameter is required");
    }

    #[test]
    fn test_validate_unknown_code() {
        let err = validator().validate("base_currency", "England").unwrap_err();
        assert!(err
            .to_string()
            .starts_with("`base_currency` not found in our database"));
    }

    #[test]
    fn test_validate_targets_collects_every_violation() {
        let raws = vec!["India".to_string(), "JPY".to_string(), "xx".to_string()];
        let err = validator().validate_targets(&raws).unwrap_err();
        assert_eq!(err.violations().len(), 2);
        let message = err.to_string();
        assert!(message.contains("`target_currency` (India) not found"));
        assert!(message.contains("`target_currency` (xx) not found"));
        assert!(!message.contains("(JPY)"));
    }

    #[test]
    fn test_validate_targets_dedupes() {
        let raws = vec!["inr".to_string(), "INR".to_string(), "jpy".to_string()];
        let codes = validator().validate_targets(&raws).unwrap();
        let codes: Vec<&str> = codes.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes, vec!["INR", "JPY"]);
    }

    #[test]
    fn test_validate_targets_empty() {
        let err = validator().validate_targets(&[]).unwrap_err();
        assert_eq!(err.to_string(), "`target_currencies` parameter is required");
    }
}
