//! Quote and provider status models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A normalized end-of-day/intraday quote.
///
/// Every provider maps its own payload into this shape; prices are `Decimal`
/// throughout. `symbol` is always the caller's symbol, even when the provider
/// was queried with a vendor-specific variant of it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Symbol as the caller asked for it
    pub symbol: String,

    /// Current/closing price
    pub price: Decimal,

    /// Opening price
    pub open: Decimal,

    /// High of the day
    pub high: Decimal,

    /// Low of the day
    pub low: Decimal,

    /// Previous session close
    pub previous_close: Decimal,

    /// Absolute change versus previous close
    pub change: Decimal,

    /// Percentage change versus previous close
    pub change_percent: Decimal,

    /// Last trading day, when the vendor reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_trading_day: Option<NaiveDate>,

    /// When the quote was produced
    pub timestamp: DateTime<Utc>,

    /// Which provider produced it (YAHOO, ALPHA_VANTAGE, FINNHUB)
    pub source: String,
}

impl Quote {
    /// A quote is usable only with a strictly positive price.
    pub fn has_valid_price(&self) -> bool {
        self.price > Decimal::ZERO
    }
}

/// Point-in-time availability of a single provider.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub name: String,
    pub available: bool,
}
