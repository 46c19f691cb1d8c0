//! Finnhub quote provider.
//!
//! Uses the /quote endpoint, which answers with single-letter keys
//! (c = current, o = open, h = high, l = low, pc = previous close,
//! t = Unix timestamp). Change figures are not taken from the vendor but
//! derived from `c - pc`. Free tier is limited to 60 calls per minute.
//!
//! API documentation: https://finnhub.io/docs/api

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::{decimal_or_zero, ensure_valid_price, QuoteProvider};
use crate::settings::ApiProviderSettings;

const PROVIDER_ID: &str = "FINNHUB";

/// Response from /quote
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Open price of the day
    o: Option<f64>,
    /// High price of the day
    h: Option<f64>,
    /// Low price of the day
    l: Option<f64>,
    /// Previous close
    pc: Option<f64>,
    /// Timestamp (Unix)
    t: Option<i64>,
}

pub struct FinnhubProvider {
    client: Client,
    settings: ApiProviderSettings,
}

impl FinnhubProvider {
    pub fn new(settings: ApiProviderSettings) -> Self {
        let client = Client::builder()
            .connect_timeout(settings.timeouts.connect())
            .timeout(settings.timeouts.read())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, settings }
    }

    async fn fetch(&self, symbol: &str) -> Result<String, MarketDataError> {
        let url = format!("{}/quote", self.settings.base_url);
        let api_key = self.settings.api_key.as_deref().unwrap_or_default();

        debug!("Finnhub request: /quote {}", symbol);

        let response = self
            .client
            .get(&url)
            // Header keeps the key out of request logs
            .header("X-Finnhub-Token", api_key)
            .query(&[("symbol", symbol)])
            .send()
            .await
            .map_err(|e| MarketDataError::ProviderCallFailed {
                provider: PROVIDER_ID.to_string(),
                message: format!("request failed: {}", e),
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(MarketDataError::ProviderCallFailed {
                provider: PROVIDER_ID.to_string(),
                message: "rate limited".to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketDataError::ProviderCallFailed {
                provider: PROVIDER_ID.to_string(),
                message: "invalid or missing API key".to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderCallFailed {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderCallFailed {
                provider: PROVIDER_ID.to_string(),
                message: format!("failed to read body: {}", e),
            })
    }
}

/// Map a /quote payload onto a [`Quote`].
///
/// Finnhub answers `{"c":0,...}` for unknown symbols, which the positive
/// price check rejects; a missing `c` field is rejected outright.
fn parse_quote(body: &str, symbol: &str) -> Result<Quote, MarketDataError> {
    let response: QuoteResponse =
        serde_json::from_str(body).map_err(|e| MarketDataError::ProviderParseError {
            provider: PROVIDER_ID.to_string(),
            message: format!("invalid JSON: {}", e),
        })?;

    if response.c.is_none() {
        return Err(MarketDataError::ProviderParseError {
            provider: PROVIDER_ID.to_string(),
            message: format!("no current price for symbol {}", symbol),
        });
    }

    let price = decimal_or_zero(response.c);
    let previous_close = decimal_or_zero(response.pc);
    let change = price - previous_close;
    let change_percent = if previous_close.is_zero() {
        Decimal::ZERO
    } else {
        ((change / previous_close) * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
    };

    let timestamp = response
        .t
        .and_then(|t| DateTime::<Utc>::from_timestamp(t, 0))
        .unwrap_or_else(Utc::now);

    ensure_valid_price(
        Quote {
            symbol: symbol.to_string(),
            price,
            open: decimal_or_zero(response.o),
            high: decimal_or_zero(response.h),
            low: decimal_or_zero(response.l),
            previous_close,
            change,
            change_percent,
            last_trading_day: Some(timestamp.date_naive()),
            timestamp,
            source: PROVIDER_ID.to_string(),
        },
        PROVIDER_ID,
    )
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn name(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn is_available(&self) -> bool {
        self.settings.is_configured()
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let body = self.fetch(symbol).await?;
        parse_quote(&body, symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_quote() {
        let body = r#"{"c":150.25,"o":148.0,"h":152.0,"l":147.5,"pc":149.0,"t":1710511200}"#;
        let quote = parse_quote(body, "AAPL").unwrap();
        assert_eq!(quote.price, dec!(150.25));
        assert_eq!(quote.open, dec!(148.0));
        assert_eq!(quote.previous_close, dec!(149.0));
        assert_eq!(quote.change, dec!(1.25));
        assert_eq!(quote.change_percent, dec!(0.8389));
        assert_eq!(quote.source, "FINNHUB");
        assert_eq!(
            quote.timestamp,
            DateTime::<Utc>::from_timestamp(1710511200, 0).unwrap()
        );
    }

    #[test]
    fn test_zero_previous_close_guards_percent() {
        let body = r#"{"c":150.25,"pc":0,"t":1710511200}"#;
        let quote = parse_quote(body, "AAPL").unwrap();
        assert_eq!(quote.change, dec!(150.25));
        assert_eq!(quote.change_percent, dec!(0));
    }

    #[test]
    fn test_missing_current_price_is_parse_error() {
        let err = parse_quote(r#"{"pc":149.0}"#, "AAPL").unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderParseError { .. }));
    }

    #[test]
    fn test_unknown_symbol_zero_price_rejected() {
        let body = r#"{"c":0,"o":0,"h":0,"l":0,"pc":0,"t":0}"#;
        let err = parse_quote(body, "NOSUCH").unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderParseError { .. }));
    }
}
