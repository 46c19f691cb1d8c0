//! Quote provider trait and vendor implementations.

pub mod alpha_vantage;
pub mod finnhub;
pub mod yahoo;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::MarketDataError;
use crate::models::Quote;

/// A single external quote vendor.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Stable provider identifier (YAHOO, ALPHA_VANTAGE, FINNHUB).
    fn name(&self) -> &'static str;

    /// Whether the provider can be used right now. Re-evaluated on every
    /// resolution pass; never an error.
    async fn is_available(&self) -> bool;

    /// Fetch the current quote for `symbol`.
    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;
}

/// Lenient numeric parsing for vendor string fields.
///
/// Trailing non-numeric suffixes (`%`, currency markers) are stripped and
/// thousands separators removed. Empty, `N/A` or otherwise unparsable input
/// maps to zero rather than an error; a field-level glitch must not sink a
/// whole quote.
pub(crate) fn parse_lenient(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return Decimal::ZERO;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-' || *c == '+')
        .collect();
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Convert an optional vendor float into `Decimal`, defaulting to zero.
pub(crate) fn decimal_or_zero(value: Option<f64>) -> Decimal {
    value
        .and_then(|v| Decimal::try_from(v).ok())
        .unwrap_or(Decimal::ZERO)
}

/// Reject quotes whose normalized price is not strictly positive.
pub(crate) fn ensure_valid_price(quote: Quote, provider: &str) -> Result<Quote, MarketDataError> {
    if quote.has_valid_price() {
        Ok(quote)
    } else {
        Err(MarketDataError::ProviderParseError {
            provider: provider.to_string(),
            message: format!("non-positive price for symbol {}", quote.symbol),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_lenient_plain_numbers() {
        assert_eq!(parse_lenient("150.25"), dec!(150.25));
        assert_eq!(parse_lenient("-2.5"), dec!(-2.5));
    }

    #[test]
    fn test_parse_lenient_strips_suffixes() {
        assert_eq!(parse_lenient("1.25%"), dec!(1.25));
        assert_eq!(parse_lenient("-0.4312%"), dec!(-0.4312));
        assert_eq!(parse_lenient("1,234.56"), dec!(1234.56));
    }

    #[test]
    fn test_parse_lenient_garbage_maps_to_zero() {
        assert_eq!(parse_lenient(""), Decimal::ZERO);
        assert_eq!(parse_lenient("  "), Decimal::ZERO);
        assert_eq!(parse_lenient("N/A"), Decimal::ZERO);
        assert_eq!(parse_lenient("n/a"), Decimal::ZERO);
        assert_eq!(parse_lenient("not a number"), Decimal::ZERO);
    }

    #[test]
    fn test_decimal_or_zero() {
        assert_eq!(decimal_or_zero(Some(12.5)), dec!(12.5));
        assert_eq!(decimal_or_zero(None), Decimal::ZERO);
        assert_eq!(decimal_or_zero(Some(f64::NAN)), Decimal::ZERO);
    }
}
