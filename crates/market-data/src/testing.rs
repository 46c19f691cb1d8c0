//! Scripted providers for registry and resolver tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

enum Behavior {
    Quote(Decimal),
    Fail(&'static str),
}

/// A provider with a scripted response that counts its invocations.
pub(crate) struct StaticProvider {
    name: &'static str,
    available: bool,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl StaticProvider {
    pub fn quoting(name: &'static str, price: Decimal) -> Self {
        Self {
            name,
            available: true,
            behavior: Behavior::Quote(price),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &'static str, message: &'static str) -> Self {
        Self {
            name,
            available: true,
            behavior: Behavior::Fail(message),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable(name: &'static str) -> Self {
        Self {
            name,
            available: false,
            behavior: Behavior::Fail("unavailable"),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for StaticProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Quote(price) => Ok(Quote {
                symbol: symbol.to_string(),
                price: *price,
                open: *price,
                high: *price,
                low: *price,
                previous_close: *price,
                change: Decimal::ZERO,
                change_percent: Decimal::ZERO,
                last_trading_day: None,
                timestamp: Utc::now(),
                source: self.name.to_string(),
            }),
            Behavior::Fail(message) => Err(MarketDataError::ProviderCallFailed {
                provider: self.name.to_string(),
                message: (*message).to_string(),
            }),
        }
    }
}
