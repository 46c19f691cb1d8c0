//! Yahoo Finance chart quote provider.
//!
//! Keyless access through the v8 chart API. Price and previous close come
//! from the result meta object; OHLC comes from the indicator arrays at the
//! last timestamp index. Availability is a live probe because there is no
//! credential to check.
//!
//! Bare numeric symbols are rewritten for the vendor: 6 digits become a
//! Korean listing (`.KS`), 4 digits a Tokyo listing (`.T`). Callers always
//! get their original symbol back on the quote.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::{decimal_or_zero, ensure_valid_price, QuoteProvider};
use crate::settings::YahooSettings;

const PROVIDER_ID: &str = "YAHOO";
const PROBE_SYMBOL: &str = "AAPL";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Option<Chart>,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<IndicatorQuote>,
}

#[derive(Debug, Deserialize)]
struct IndicatorQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
}

pub struct YahooProvider {
    client: Client,
    settings: YahooSettings,
}

impl YahooProvider {
    pub fn new(settings: YahooSettings) -> Self {
        let client = Client::builder()
            .connect_timeout(settings.timeouts.connect())
            .timeout(settings.timeouts.read())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, settings }
    }

    async fn fetch(&self, vendor_symbol: &str) -> Result<String, MarketDataError> {
        let url = format!("{}/{}", self.settings.base_url, vendor_symbol);

        debug!("Yahoo chart request: {}", vendor_symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("interval", "1d"), ("range", "1d")])
            .send()
            .await
            .map_err(|e| MarketDataError::ProviderCallFailed {
                provider: PROVIDER_ID.to_string(),
                message: format!("request failed: {}", e),
            })?;

        let status = response.status();
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

/// Rewrite bare numeric symbols into the vendor's exchange-suffixed form.
fn to_vendor_symbol(symbol: &str) -> String {
    let all_digits = !symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_digit());
    match (all_digits, symbol.len()) {
        (true, 6) => format!("{}.KS", symbol),
        (true, 4) => format!("{}.T", symbol),
        _ => symbol.to_string(),
    }
}

/// Map a chart payload onto a [`Quote`].
fn parse_chart(body: &str, symbol: &str) -> Result<Quote, MarketDataError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| MarketDataError::ProviderParseError {
            provider: PROVIDER_ID.to_string(),
            message: format!("invalid JSON: {}", e),
        })?;

    let result = response
        .chart
        .and_then(|c| c.result)
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MarketDataError::ProviderParseError {
            provider: PROVIDER_ID.to_string(),
            message: format!("no chart result for symbol {}", symbol),
        })?;

    let price = decimal_or_zero(result.meta.regular_market_price);
    let previous_close = decimal_or_zero(
        result
            .meta
            .previous_close
            .or(result.meta.chart_previous_close),
    );

    // OHLC lives in parallel arrays; the last timestamp slot is today.
    let last_index = result.timestamp.len().checked_sub(1);
    let bar = result
        .indicators
        .as_ref()
        .and_then(|i| i.quote.first());
    let at = |values: &[Option<f64>]| {
        last_index
            .and_then(|i| values.get(i).copied())
            .flatten()
    };

    let timestamp = result
        .timestamp
        .last()
        .and_then(|t| DateTime::<Utc>::from_timestamp(*t, 0))
        .unwrap_or_else(Utc::now);

    let change = price - previous_close;
    let change_percent = if previous_close.is_zero() {
        rust_decimal::Decimal::ZERO
    } else {
        ((change / previous_close) * rust_decimal::Decimal::ONE_HUNDRED).round_dp_with_strategy(
            4,
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        )
    };

    ensure_valid_price(
        Quote {
            symbol: symbol.to_string(),
            price,
            open: decimal_or_zero(bar.and_then(|b| at(&b.open))),
            high: decimal_or_zero(bar.and_then(|b| at(&b.high))),
            low: decimal_or_zero(bar.and_then(|b| at(&b.low))),
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
impl QuoteProvider for YahooProvider {
    fn name(&self) -> &'static str {
        PROVIDER_ID
    }

    /// Probe the chart endpoint with a benchmark symbol. Any failure is
    /// plain unavailability, never an error.
    async fn is_available(&self) -> bool {
        if !self.settings.enabled {
            return false;
        }
        match self.fetch(PROBE_SYMBOL).await {
            Ok(body) => body.contains("\"chart\"") && body.contains("\"result\""),
            Err(_) => false,
        }
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let body = self.fetch(&to_vendor_symbol(symbol)).await?;
        parse_chart(&body, symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "regularMarketPrice": 150.25,
                    "previousClose": 149.0
                },
                "timestamp": [1710424800, 1710511200],
                "indicators": {
                    "quote": [{
                        "open": [147.0, 148.0],
                        "high": [149.5, 152.0],
                        "low": [146.0, 147.5],
                        "close": [149.0, 150.25]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_vendor_symbol_suffixing() {
        assert_eq!(to_vendor_symbol("005930"), "005930.KS");
        assert_eq!(to_vendor_symbol("7203"), "7203.T");
        assert_eq!(to_vendor_symbol("AAPL"), "AAPL");
        assert_eq!(to_vendor_symbol("BRK.B"), "BRK.B");
        assert_eq!(to_vendor_symbol("12345"), "12345");
        assert_eq!(to_vendor_symbol(""), "");
    }

    #[test]
    fn test_parse_chart() {
        let quote = parse_chart(SAMPLE, "AAPL").unwrap();
        assert_eq!(quote.price, dec!(150.25));
        assert_eq!(quote.previous_close, dec!(149.0));
        assert_eq!(quote.open, dec!(148.0));
        assert_eq!(quote.high, dec!(152.0));
        assert_eq!(quote.low, dec!(147.5));
        assert_eq!(quote.change, dec!(1.25));
        assert_eq!(quote.change_percent, dec!(0.8389));
        assert_eq!(quote.source, "YAHOO");
    }

    #[test]
    fn test_parse_keeps_caller_symbol() {
        // The vendor was asked for 005930.KS but the caller said 005930.
        let quote = parse_chart(SAMPLE, "005930").unwrap();
        assert_eq!(quote.symbol, "005930");
    }

    #[test]
    fn test_missing_chart_node_is_parse_error() {
        let err = parse_chart(r#"{"chart":{"result":null}}"#, "AAPL").unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderParseError { .. }));

        let err = parse_chart(r#"{"finance":{}}"#, "AAPL").unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderParseError { .. }));
    }

    #[test]
    fn test_missing_market_price_rejected() {
        let body = r#"{"chart":{"result":[{"meta":{"previousClose":149.0},"timestamp":[]}]}}"#;
        let err = parse_chart(body, "AAPL").unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderParseError { .. }));
    }
}
