//! ISO-4217 currency codes accepted for orders.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Alphabetic codes the gateway settles in.
const SUPPORTED: &[&str] = &[
    "INR", "USD", "EUR", "GBP", "AED", "AUD", "CAD", "CHF", "HKD", "JPY", "MYR", "NZD", "QAR",
    "SAR", "SEK", "SGD", "THB", "ZAR",
];

/// Upper-case ISO currency code from the supported list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct CurrencyCode(&'static str);

impl CurrencyCode {
    pub const INR: CurrencyCode = CurrencyCode("INR");

    /// Parses a code case-insensitively.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let upper = code.trim().to_ascii_uppercase();
        SUPPORTED
            .iter()
            .copied()
            .find(|supported| *supported == upper)
            .map(CurrencyCode)
            .ok_or_else(|| {
                ValidationError::invalid_format("currency", format!("unsupported code '{}'", code))
            })
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::INR
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl<'de> Deserialize<'de> for CurrencyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::parse(&code).map_err(serde::de::Error::custom)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(CurrencyCode::parse("inr").unwrap(), CurrencyCode::INR);
        assert_eq!(CurrencyCode::parse(" Usd ").unwrap().as_str(), "USD");
    }

    #[test]
    fn unknown_and_malformed_codes_are_rejected() {
        assert!(CurrencyCode::parse("XYZ").is_err());
        assert!(CurrencyCode::parse("RUPEES").is_err());
        assert!(CurrencyCode::parse("").is_err());
    }

    #[test]
    fn serde_uses_plain_code() {
        let json = serde_json::to_string(&CurrencyCode::INR).unwrap();
        assert_eq!(json, "\"INR\"");

        let parsed: CurrencyCode = serde_json::from_str("\"eur\"").unwrap();
        assert_eq!(parsed.as_str(), "EUR");
        assert!(serde_json::from_str::<CurrencyCode>("\"ABC\"").is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Priced {
        amount: i64,
        currency: CurrencyCode,
    }

    #[test]
    fn deserializes_inside_owning_structs() {
        let priced: Priced = serde_json::from_str(r#"{"amount": 49900, "currency": "inr"}"#).unwrap();
        assert_eq!(priced.amount, 49_900);
        assert_eq!(priced.currency, CurrencyCode::INR);
    }
}
