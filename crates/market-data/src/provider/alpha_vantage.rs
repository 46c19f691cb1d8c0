//! Alpha Vantage quote provider.
//!
//! Uses the GLOBAL_QUOTE function. Alpha Vantage returns every field as a
//! string under numbered labels ("05. price", "10. change percent", ...);
//! all of them go through the lenient parser so locale suffixes and `N/A`
//! placeholders never fail a quote.
//!
//! API documentation: https://www.alphavantage.co/documentation/

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::{ensure_valid_price, parse_lenient, QuoteProvider};
use crate::settings::ApiProviderSettings;

const PROVIDER_ID: &str = "ALPHA_VANTAGE";

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<HashMap<String, String>>,
}

pub struct AlphaVantageProvider {
    client: Client,
    settings: ApiProviderSettings,
}

impl AlphaVantageProvider {
    pub fn new(settings: ApiProviderSettings) -> Self {
        let client = Client::builder()
            .connect_timeout(settings.timeouts.connect())
            .timeout(settings.timeouts.read())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, settings }
    }

    async fn fetch(&self, symbol: &str) -> Result<String, MarketDataError> {
        let api_key = self.settings.api_key.as_deref().unwrap_or_default();

        debug!("Alpha Vantage request: GLOBAL_QUOTE {}", symbol);

        let response = self
            .client
            .get(&self.settings.base_url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", api_key),
            ])
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

/// Map a GLOBAL_QUOTE payload onto a [`Quote`].
///
/// A missing or empty `Global Quote` object (Alpha Vantage's way of saying
/// "unknown symbol" or "rate limited") is a parse error; individual bad
/// fields inside it are not.
fn parse_global_quote(body: &str, symbol: &str) -> Result<Quote, MarketDataError> {
    let response: GlobalQuoteResponse =
        serde_json::from_str(body).map_err(|e| MarketDataError::ProviderParseError {
            provider: PROVIDER_ID.to_string(),
            message: format!("invalid JSON: {}", e),
        })?;

    let fields = response
        .global_quote
        .filter(|f| !f.is_empty())
        .ok_or_else(|| MarketDataError::ProviderParseError {
            provider: PROVIDER_ID.to_string(),
            message: format!("empty Global Quote for symbol {}", symbol),
        })?;

    let field = |key: &str| fields.get(key).map(String::as_str).unwrap_or_default();

    let last_trading_day =
        NaiveDate::parse_from_str(field("07. latest trading day"), "%Y-%m-%d").ok();

    ensure_valid_price(
        Quote {
            symbol: symbol.to_string(),
            price: parse_lenient(field("05. price")),
            open: parse_lenient(field("02. open")),
            high: parse_lenient(field("03. high")),
            low: parse_lenient(field("04. low")),
            previous_close: parse_lenient(field("08. previous close")),
            change: parse_lenient(field("09. change")),
            change_percent: parse_lenient(field("10. change percent")),
            last_trading_day,
            timestamp: Utc::now(),
            source: PROVIDER_ID.to_string(),
        },
        PROVIDER_ID,
    )
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn name(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn is_available(&self) -> bool {
        self.settings.is_configured()
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let body = self.fetch(symbol).await?;
        parse_global_quote(&body, symbol)
    }
}
