//! Market data retrieval with provider fallback.
//!
//! Quotes come from three external vendors (Yahoo chart API, Alpha Vantage,
//! Finnhub), each wrapped behind the [`QuoteProvider`] trait. The
//! [`ProviderRegistry`] keeps them in a fixed priority order and the
//! [`QuoteResolver`] walks that order sequentially until one of them returns a
//! usable quote.

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::MarketDataError;
pub use models::{ProviderStatus, Quote};
pub use provider::QuoteProvider;
pub use registry::ProviderRegistry;
pub use resolver::QuoteResolver;
pub use settings::MarketDataSettings;
