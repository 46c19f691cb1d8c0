//! Sequential quote resolution with provider fallback.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{ProviderStatus, Quote};
use crate::registry::ProviderRegistry;

/// Resolves quotes by walking the registry's providers in order.
///
/// One attempt per provider, no retries, no parallelism. The first provider
/// that returns a quote with a positive price wins; a quote without one
/// counts as that provider's failure, same as an error.
pub struct QuoteResolver {
    registry: Arc<ProviderRegistry>,
}

impl QuoteResolver {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve a single symbol through the fallback chain.
    pub async fn resolve_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let providers = self.registry.available_providers().await;
        if providers.is_empty() {
            return Err(MarketDataError::NoProviderAvailable);
        }

        let mut last_error: Option<MarketDataError> = None;
        for provider in providers {
            match provider.get_quote(symbol).await {
                Ok(quote) if quote.has_valid_price() => {
                    debug!(
                        "resolved quote for {} via {} at {}",
                        symbol,
                        provider.name(),
                        quote.price
                    );
                    return Ok(quote);
                }
                Ok(quote) => {
                    warn!(
                        "provider {} returned invalid price {} for {}",
                        provider.name(),
                        quote.price,
                        symbol
                    );
                    last_error = Some(MarketDataError::ProviderParseError {
                        provider: provider.name().to_string(),
                        message: format!("non-positive price for symbol {}", symbol),
                    });
                }
                Err(error) => {
                    warn!(
                        "provider {} failed for {}: {}",
                        provider.name(),
                        symbol,
                        error
                    );
                    last_error = Some(error);
                }
            }
        }

        Err(MarketDataError::AllProvidersExhausted {
            symbol: symbol.to_string(),
            // last_error is always set: the provider list was non-empty
            source: Box::new(last_error.unwrap_or(MarketDataError::NoProviderAvailable)),
        })
    }

    /// Resolve a symbol through one named provider, no fallback.
    pub async fn resolve_quote_via(
        &self,
        provider_name: &str,
        symbol: &str,
    ) -> Result<Quote, MarketDataError> {
        let provider = self.registry.get_provider(provider_name).await.ok_or_else(
            || MarketDataError::ProviderUnavailable {
                provider: provider_name.to_string(),
            },
        )?;
        let quote = provider.get_quote(symbol).await?;
        if quote.has_valid_price() {
            Ok(quote)
        } else {
            Err(MarketDataError::ProviderParseError {
                provider: provider.name().to_string(),
                message: format!("non-positive price for symbol {}", symbol),
            })
        }
    }

    /// Resolve several symbols, one after the other. Each symbol stands on
    /// its own; a failure is recorded in the map and the rest continue.
    pub async fn resolve_quotes(
        &self,
        symbols: &[String],
    ) -> HashMap<String, Result<Quote, MarketDataError>> {
        let mut results = HashMap::with_capacity(symbols.len());
        for symbol in symbols {
            let result = self.resolve_quote(symbol).await;
            results.insert(symbol.clone(), result);
        }
        results
    }

    /// Whether at least one provider can serve quotes right now.
    pub async fn is_service_available(&self) -> bool {
        !self.registry.available_providers().await.is_empty()
    }

    /// Availability of every registered provider.
    pub async fn provider_status(&self) -> Vec<ProviderStatus> {
        self.registry.provider_status().await
    }
}
